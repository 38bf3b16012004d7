use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::{domain::blocks::ContentBlock, models::BlogPost};

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateBlogRequest {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub content: String,
    pub image_url: Option<String>,
    /// `YYYY-MM-DD`; today when absent.
    pub date: Option<String>,
    pub excerpt: Option<String>,
    pub html_content: Option<String>,
    #[serde(default)]
    #[schema(value_type = Vec<crate::domain::blocks::BlockWire>)]
    pub blocks: Vec<ContentBlock>,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateBlogRequest {
    pub title: Option<String>,
    pub content: Option<String>,
    pub image_url: Option<String>,
    pub excerpt: Option<String>,
    pub date: Option<String>,
    pub html_content: Option<String>,
    #[schema(value_type = Option<Vec<crate::domain::blocks::BlockWire>>)]
    pub blocks: Option<Vec<ContentBlock>>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreatedBlog {
    pub blog: BlogPost,
    /// Followers whose notification write succeeded.
    pub notified_followers: usize,
}

#[derive(Serialize, ToSchema)]
#[serde(transparent)]
pub struct BlogList {
    #[schema(value_type = Vec<BlogPost>)]
    pub items: Vec<BlogPost>,
}
