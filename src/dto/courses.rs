use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::{domain::blocks::ContentBlock, models::Course};

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateCourseRequest {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub price: String,
    #[serde(default)]
    pub duration: String,
    #[serde(default)]
    pub level: String,
    #[serde(default)]
    pub image: String,
    pub html_content: Option<String>,
    #[serde(default)]
    #[schema(value_type = Vec<crate::domain::blocks::BlockWire>)]
    pub blocks: Vec<ContentBlock>,
}

/// Absent fields are left as stored.
#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCourseRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub price: Option<String>,
    pub duration: Option<String>,
    pub level: Option<String>,
    pub image: Option<String>,
    pub html_content: Option<String>,
    #[schema(value_type = Option<Vec<crate::domain::blocks::BlockWire>>)]
    pub blocks: Option<Vec<ContentBlock>>,
}

#[derive(Debug, Default, Deserialize, IntoParams, ToSchema)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct CourseQuery {
    /// Restrict to one author; archived courses are then included.
    pub author_id: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EnrolledCoursesRequest {
    #[serde(default)]
    pub course_ids: Vec<serde_json::Value>,
}

#[derive(Serialize, ToSchema)]
#[serde(transparent)]
pub struct CourseList {
    #[schema(value_type = Vec<Course>)]
    pub items: Vec<Course>,
}
