use std::sync::Arc;

use anyhow::Context;
use baristaflow_api::{
    config::AppConfig,
    db::{create_pool, orm_from_pool, run_migrations},
    dto::auth::RegisterRequest,
    error::AppError,
    mail::LogMailer,
    models::{BlogPost, Course, Role},
    services::auth_service::{register_user, user_path},
    state::AppState,
    store::{DocumentStore, PgStore, StorePath, get_as, set_as},
};
use serde_json::{Map, Value};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = AppConfig::from_env()?;
    let database_url = config
        .database_url
        .clone()
        .context("DATABASE_URL is not set")?;

    let pool = create_pool(&database_url).await?;
    run_migrations(&pool).await?;
    let store = Arc::new(PgStore::new(orm_from_pool(pool)));
    let state = AppState::new(store.clone(), Arc::new(LogMailer), config);

    let educator = ensure_educator(&state, "educator@baristaflow.cl", "educator123").await?;
    let courses = seed_courses(store.as_ref()).await?;
    let blogs = seed_blogs(store.as_ref()).await?;

    println!(
        "Seed completed. Educator: {}, new courses: {courses}, new blogs: {blogs}",
        educator.as_deref().unwrap_or("already registered")
    );
    Ok(())
}

/// Registers an approved educator account unless the email is taken.
async fn ensure_educator(
    state: &AppState,
    email: &str,
    password: &str,
) -> anyhow::Result<Option<String>> {
    let registered = register_user(
        state,
        RegisterRequest {
            email: email.to_string(),
            password: password.to_string(),
            username: "BaristaFlow Team".to_string(),
        },
    )
    .await;
    let user = match registered {
        Ok(resp) => resp.data.context("register returned no user")?,
        Err(AppError::BadRequest(_)) => return Ok(None),
        Err(err) => return Err(err.into()),
    };

    let mut patch = Map::new();
    patch.insert("role".into(), Value::from(Role::EducatorApproved.as_str()));
    state.store.update(&user_path(&user.uid)?, patch).await?;
    Ok(Some(user.uid))
}

async fn seed_courses(store: &dyn DocumentStore) -> anyhow::Result<usize> {
    let courses = [
        (
            "1",
            "Maestría en Prensa Francesa",
            "https://images.unsplash.com/photo-1639906512494-dd4a536abc4e?q=80&w=1170&auto=format&fit=crop",
            "Aprende a controlar el tiempo y la molienda para obtener un café con cuerpo y aceites naturales perfectos.",
            "19.99",
            "2 semanas",
            "Básico",
        ),
        (
            "2",
            "El Arte de la Moka Italiana",
            "https://images.unsplash.com/photo-1613410034014-18cc91dc1e1e?q=80&w=687&auto=format&fit=crop",
            "Saca el máximo provecho a tu cafetera italiana. Trucos para evitar el sabor quemado y lograr un café intenso.",
            "24.99",
            "1 semana",
            "Básico",
        ),
        (
            "3",
            "Texturización de Leche en Casa",
            "https://images.unsplash.com/photo-1570968915860-54d5c301fa9f?q=80&w=2070&auto=format&fit=crop",
            "Crea espuma de leche sedosa para capuchinos usando solo una prensa francesa o batidor, sin máquina de espresso.",
            "29.99",
            "3 semanas",
            "Intermedio",
        ),
        (
            "4",
            "Introducción al Filtrado V60",
            "https://images.unsplash.com/photo-1641962710781-3df076f49e26?q=80&w=688&auto=format&fit=crop",
            "Iníciate en el mundo del café de especialidad con el método de vertido. Técnica, control de temperatura y vertido.",
            "34.99",
            "4 semanas",
            "Intermedio",
        ),
    ];

    let mut created = 0;
    for (id, title, image, description, price, duration, level) in courses {
        let path = StorePath::root("courses")?.child(id)?;
        if get_as::<Course>(store, &path).await?.is_some() {
            continue;
        }
        let course = Course {
            id: id.to_string(),
            title: title.to_string(),
            description: description.to_string(),
            price: price.to_string(),
            duration: duration.to_string(),
            level: level.to_string(),
            image: image.to_string(),
            author_id: None,
            author_name: Some("BaristaFlow Team".to_string()),
            created_at: None,
            html_content: None,
            blocks: Vec::new(),
            is_archived: false,
        };
        set_as(store, &path, &course).await?;
        created += 1;
    }
    Ok(created)
}

async fn seed_blogs(store: &dyn DocumentStore) -> anyhow::Result<usize> {
    let blogs = [
        BlogPost {
            id: 201,
            title: "Los 5 Errores Más Comunes al Preparar Espresso en Casa".to_string(),
            content: "El espresso es un arte y una ciencia. Aquí detallamos los errores más comunes...".to_string(),
            excerpt: "Aprende a evitar la canalización, el sub-extracción y la sobre-extracción para un shot perfecto. Consejos de experto.".to_string(),
            image_url: "https://images.unsplash.com/photo-1558980182-d45084962c5b?q=80&w=2940&auto=format&fit=crop".to_string(),
            author: "BaristaFlow Team".to_string(),
            author_id: None,
            date: "2025-10-25".to_string(),
            likes: 124,
            comments: 28,
            html_content: None,
            blocks: Vec::new(),
        },
        BlogPost {
            id: 202,
            title: "La Magia del Tueste: ¿Qué le hace a tu grano?".to_string(),
            content: "El tueste transforma el grano verde en el café aromático que amamos...".to_string(),
            excerpt: "Una inmersión profunda en el proceso de tueste y cómo afecta el cuerpo, la acidez y el sabor final de tu café.".to_string(),
            image_url: "https://images.unsplash.com/photo-1534062569502-30df2b792348?q=80&w=2940&auto=format&fit=crop".to_string(),
            author: "Andrea T.".to_string(),
            author_id: None,
            date: "2025-10-18".to_string(),
            likes: 89,
            comments: 15,
            html_content: None,
            blocks: Vec::new(),
        },
    ];

    let mut created = 0;
    for blog in blogs {
        let path = StorePath::root("blogs")?.child(&blog.id.to_string())?;
        if get_as::<BlogPost>(store, &path).await?.is_some() {
            continue;
        }
        set_as(store, &path, &blog).await?;
        created += 1;
    }
    Ok(created)
}
