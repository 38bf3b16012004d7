use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::blocks::{BlockEdit, ContentBlock};

#[derive(Debug, Deserialize, ToSchema)]
pub struct BlockEditsRequest {
    pub edits: Vec<BlockEdit>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EditedBlocks {
    #[schema(value_type = Vec<crate::domain::blocks::BlockWire>)]
    pub blocks: Vec<ContentBlock>,
    /// Edits that matched nothing and were ignored.
    pub ignored: usize,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct RenderedDocument {
    pub html: String,
}
