use axum::{
    Json, Router,
    extract::{Query, State},
    routing::get,
};
use serde::Deserialize;
use utoipa::IntoParams;

use crate::{
    domain::search::{SearchFilter, SearchOutcome},
    error::AppResult,
    response::ApiResponse,
    services::search_service,
    state::AppState,
};

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct SearchQuery {
    #[serde(default)]
    pub q: String,
    #[serde(default, rename = "type")]
    #[param(inline)]
    pub filter: SearchFilter,
}

pub fn router() -> Router<AppState> {
    Router::new().route("/", get(search))
}

#[utoipa::path(
    get,
    path = "/api/search",
    params(SearchQuery),
    responses(
        (status = 200, description = "Merged results with per-type counts", body = ApiResponse<SearchOutcome>)
    ),
    tag = "Search"
)]
pub async fn search(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> AppResult<Json<ApiResponse<SearchOutcome>>> {
    let resp = search_service::search(&state, &query.q, query.filter).await?;
    Ok(Json(resp))
}
