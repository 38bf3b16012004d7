pub mod auth;
pub mod blogs;
pub mod content;
pub mod courses;
pub mod forms;
pub mod orders;
pub mod products;
pub mod recipes;
pub mod users;
