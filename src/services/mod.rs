pub mod auth_service;
pub mod blog_service;
pub mod contact_service;
pub mod content_service;
pub mod course_service;
pub mod educator_service;
pub mod notification_service;
pub mod order_service;
pub mod product_service;
pub mod recipe_service;
pub mod search_service;
pub mod upload_service;
pub mod user_service;
