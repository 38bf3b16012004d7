use axum::{
    Json, Router,
    extract::{Path, Query},
    routing::get,
};

use crate::{
    dto::recipes::{RecipeList, RecipeQuery},
    error::AppResult,
    models::Recipe,
    response::ApiResponse,
    services::recipe_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_recipes))
        .route("/{id}", get(get_recipe))
}

#[utoipa::path(
    get,
    path = "/api/recipes",
    params(RecipeQuery),
    responses(
        (status = 200, description = "List brewing recipes", body = ApiResponse<RecipeList>)
    ),
    tag = "Recipes"
)]
pub async fn list_recipes(Query(query): Query<RecipeQuery>) -> Json<ApiResponse<RecipeList>> {
    Json(recipe_service::list_recipes(&query))
}

#[utoipa::path(
    get,
    path = "/api/recipes/{id}",
    params(
        ("id" = String, Path, description = "Recipe slug")
    ),
    responses(
        (status = 200, description = "Get recipe", body = ApiResponse<Recipe>),
        (status = 404, description = "Recipe not found")
    ),
    tag = "Recipes"
)]
pub async fn get_recipe(Path(id): Path<String>) -> AppResult<Json<ApiResponse<Recipe>>> {
    let resp = recipe_service::get_recipe(&id)?;
    Ok(Json(resp))
}
