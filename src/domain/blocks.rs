//! Typed content blocks and the block-document editor.
//!
//! On the wire a block is `{ id, type, content, metadata }` with a metadata
//! shape that depends on `type`. In memory each kind carries only its own
//! fields. Decoding is lenient: bad metadata falls back to the kind's
//! defaults and unrecognised types survive as [`BlockKind::Unknown`] so a
//! single odd block never makes a whole document unreadable.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum BlockType {
    Text,
    Heading,
    Image,
    Video,
    File,
    Link,
    List,
    Quote,
    Callout,
    Embed,
    Separator,
}

impl BlockType {
    pub fn as_str(&self) -> &'static str {
        match self {
            BlockType::Text => "text",
            BlockType::Heading => "heading",
            BlockType::Image => "image",
            BlockType::Video => "video",
            BlockType::File => "file",
            BlockType::Link => "link",
            BlockType::List => "list",
            BlockType::Quote => "quote",
            BlockType::Callout => "callout",
            BlockType::Embed => "embed",
            BlockType::Separator => "separator",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        Some(match raw {
            "text" => BlockType::Text,
            "heading" => BlockType::Heading,
            "image" => BlockType::Image,
            "video" => BlockType::Video,
            "file" => BlockType::File,
            "link" => BlockType::Link,
            "list" => BlockType::List,
            "quote" => BlockType::Quote,
            "callout" => BlockType::Callout,
            "embed" => BlockType::Embed,
            "separator" => BlockType::Separator,
            _ => return None,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HeadingLevel {
    H1,
    #[default]
    H2,
    H3,
}

impl HeadingLevel {
    pub fn number(&self) -> u8 {
        match self {
            HeadingLevel::H1 => 1,
            HeadingLevel::H2 => 2,
            HeadingLevel::H3 => 3,
        }
    }

    fn from_value(value: Option<&Value>) -> Self {
        match value.and_then(Value::as_u64) {
            Some(1) => HeadingLevel::H1,
            Some(3) => HeadingLevel::H3,
            _ => HeadingLevel::H2,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ListType {
    #[default]
    Bullet,
    Ordered,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CalloutType {
    #[default]
    Info,
    Warning,
    Tip,
    Success,
}

impl CalloutType {
    pub fn as_str(&self) -> &'static str {
        match self {
            CalloutType::Info => "info",
            CalloutType::Warning => "warning",
            CalloutType::Tip => "tip",
            CalloutType::Success => "success",
        }
    }

    fn parse(raw: Option<&str>) -> Self {
        match raw {
            Some("warning") => CalloutType::Warning,
            Some("tip") => CalloutType::Tip,
            Some("success") => CalloutType::Success,
            _ => CalloutType::Info,
        }
    }
}

/// Block kind together with the metadata that kind accepts.
#[derive(Debug, Clone, PartialEq)]
pub enum BlockKind {
    Text,
    Heading { level: HeadingLevel },
    Image { caption: Option<String> },
    Video,
    File { filename: Option<String>, mime_type: Option<String> },
    Link { caption: Option<String> },
    List { list_type: ListType, items: Vec<String> },
    Quote { author: Option<String> },
    Callout { callout_type: CalloutType },
    Embed,
    Separator,
    /// A `type` this build does not know; kept verbatim.
    Unknown { type_name: String, metadata: Value },
}

impl BlockKind {
    /// Fresh kind with type-default metadata.
    pub fn default_for(block_type: BlockType) -> Self {
        Self::from_parts(block_type.as_str(), &Map::new())
    }

    pub fn type_name(&self) -> &str {
        match self {
            BlockKind::Text => "text",
            BlockKind::Heading { .. } => "heading",
            BlockKind::Image { .. } => "image",
            BlockKind::Video => "video",
            BlockKind::File { .. } => "file",
            BlockKind::Link { .. } => "link",
            BlockKind::List { .. } => "list",
            BlockKind::Quote { .. } => "quote",
            BlockKind::Callout { .. } => "callout",
            BlockKind::Embed => "embed",
            BlockKind::Separator => "separator",
            BlockKind::Unknown { type_name, .. } => type_name,
        }
    }

    fn from_parts(type_name: &str, meta: &Map<String, Value>) -> Self {
        let text = |key: &str| meta.get(key).and_then(Value::as_str).map(str::to_string);
        match BlockType::parse(type_name) {
            Some(BlockType::Text) => BlockKind::Text,
            Some(BlockType::Heading) => BlockKind::Heading {
                level: HeadingLevel::from_value(meta.get("level")),
            },
            Some(BlockType::Image) => BlockKind::Image {
                caption: text("caption"),
            },
            Some(BlockType::Video) => BlockKind::Video,
            Some(BlockType::File) => BlockKind::File {
                filename: text("filename"),
                mime_type: text("mimeType"),
            },
            Some(BlockType::Link) => BlockKind::Link {
                caption: text("caption"),
            },
            Some(BlockType::List) => BlockKind::List {
                list_type: match meta.get("listType").and_then(Value::as_str) {
                    Some("ordered") => ListType::Ordered,
                    _ => ListType::Bullet,
                },
                items: meta
                    .get("items")
                    .and_then(Value::as_array)
                    .map(|items| {
                        items
                            .iter()
                            .map(|item| match item {
                                Value::String(s) => s.clone(),
                                other => other.to_string(),
                            })
                            .collect()
                    })
                    .unwrap_or_default(),
            },
            Some(BlockType::Quote) => BlockKind::Quote {
                author: text("author"),
            },
            Some(BlockType::Callout) => BlockKind::Callout {
                callout_type: CalloutType::parse(meta.get("calloutType").and_then(Value::as_str)),
            },
            Some(BlockType::Embed) => BlockKind::Embed,
            Some(BlockType::Separator) => BlockKind::Separator,
            None => BlockKind::Unknown {
                type_name: type_name.to_string(),
                metadata: Value::Object(meta.clone()),
            },
        }
    }

    /// Wire-format metadata for this kind.
    pub fn metadata(&self) -> Map<String, Value> {
        let mut meta = Map::new();
        match self {
            BlockKind::Heading { level } => {
                meta.insert("level".into(), Value::from(level.number()));
            }
            BlockKind::Image { caption } | BlockKind::Link { caption } => {
                put_text(&mut meta, "caption", caption);
            }
            BlockKind::File {
                filename,
                mime_type,
            } => {
                put_text(&mut meta, "filename", filename);
                put_text(&mut meta, "mimeType", mime_type);
            }
            BlockKind::Quote { author } => put_text(&mut meta, "author", author),
            BlockKind::List { list_type, items } => {
                let list_type = match list_type {
                    ListType::Bullet => "bullet",
                    ListType::Ordered => "ordered",
                };
                meta.insert("listType".into(), Value::from(list_type));
                meta.insert(
                    "items".into(),
                    Value::Array(items.iter().cloned().map(Value::String).collect()),
                );
            }
            BlockKind::Callout { callout_type } => {
                meta.insert("calloutType".into(), Value::from(callout_type.as_str()));
            }
            BlockKind::Unknown { metadata, .. } => {
                if let Value::Object(raw) = metadata {
                    meta = raw.clone();
                }
            }
            BlockKind::Text | BlockKind::Video | BlockKind::Embed | BlockKind::Separator => {}
        }
        meta
    }
}

fn put_text(meta: &mut Map<String, Value>, key: &str, value: &Option<String>) {
    if let Some(value) = value {
        meta.insert(key.to_string(), Value::String(value.clone()));
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "BlockWire", into = "BlockWire")]
pub struct ContentBlock {
    pub id: String,
    pub content: String,
    pub kind: BlockKind,
}

impl ContentBlock {
    pub fn new(block_type: BlockType) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            content: String::new(),
            kind: BlockKind::default_for(block_type),
        }
    }
}

/// Serialized shape of a [`ContentBlock`].
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct BlockWire {
    #[serde(default)]
    pub id: String,
    #[serde(rename = "type", default)]
    pub block_type: String,
    #[serde(default, deserialize_with = "content_text")]
    pub content: String,
    #[serde(default)]
    #[schema(value_type = Object)]
    pub metadata: Value,
}

fn content_text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Null => String::new(),
        Value::String(s) => s,
        other => other.to_string(),
    })
}

impl From<BlockWire> for ContentBlock {
    fn from(wire: BlockWire) -> Self {
        let meta = match wire.metadata {
            Value::Object(map) => map,
            _ => Map::new(),
        };
        Self {
            id: wire.id,
            content: wire.content,
            kind: BlockKind::from_parts(&wire.block_type, &meta),
        }
    }
}

impl From<ContentBlock> for BlockWire {
    fn from(block: ContentBlock) -> Self {
        Self {
            block_type: block.kind.type_name().to_string(),
            metadata: Value::Object(block.kind.metadata()),
            id: block.id,
            content: block.content,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum MoveDirection {
    Up,
    Down,
}

/// One editor action, as sent by the authoring UI.
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(tag = "op", rename_all = "camelCase")]
pub enum BlockEdit {
    Add {
        #[serde(rename = "type")]
        block_type: BlockType,
    },
    UpdateContent {
        id: String,
        content: String,
    },
    UpdateMetadata {
        id: String,
        #[schema(value_type = Object)]
        metadata: Map<String, Value>,
    },
    Move {
        index: usize,
        direction: MoveDirection,
    },
    Remove {
        id: String,
    },
}

/// Ordered block sequence of one blog post or course. Order is render order
/// and ids are unique within the document.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BlockDocument {
    blocks: Vec<ContentBlock>,
}

impl BlockDocument {
    /// Load stored blocks. Missing or repeated ids are replaced with fresh
    /// ones.
    pub fn from_blocks(blocks: Vec<ContentBlock>) -> Self {
        let mut seen = HashSet::new();
        let blocks = blocks
            .into_iter()
            .map(|mut block| {
                if block.id.is_empty() || !seen.insert(block.id.clone()) {
                    let fresh = Uuid::new_v4().to_string();
                    tracing::debug!(old = %block.id, new = %fresh, "reassigned block id");
                    seen.insert(fresh.clone());
                    block.id = fresh;
                }
                block
            })
            .collect();
        Self { blocks }
    }

    pub fn blocks(&self) -> &[ContentBlock] {
        &self.blocks
    }

    pub fn into_blocks(self) -> Vec<ContentBlock> {
        self.blocks
    }

    /// Append a block of `block_type` with default metadata; returns its id.
    pub fn add_block(&mut self, block_type: BlockType) -> String {
        let block = ContentBlock::new(block_type);
        let id = block.id.clone();
        self.blocks.push(block);
        id
    }

    /// Replace the content of block `id`. Unknown ids are ignored.
    pub fn update_content(&mut self, id: &str, content: impl Into<String>) -> bool {
        match self.find_mut(id) {
            Some(block) => {
                block.content = content.into();
                true
            }
            None => false,
        }
    }

    /// Merge `patch` into the metadata of block `id`; `null` clears a field.
    /// Unknown ids are ignored.
    pub fn update_metadata(&mut self, id: &str, patch: &Map<String, Value>) -> bool {
        let Some(block) = self.find_mut(id) else {
            return false;
        };
        let mut meta = block.kind.metadata();
        for (key, value) in patch {
            if value.is_null() {
                meta.remove(key);
            } else {
                meta.insert(key.clone(), value.clone());
            }
        }
        let type_name = block.kind.type_name().to_string();
        block.kind = BlockKind::from_parts(&type_name, &meta);
        true
    }

    /// Swap the block at `index` with its neighbour. Moving past either end
    /// does nothing.
    pub fn move_block(&mut self, index: usize, direction: MoveDirection) -> bool {
        let target = match direction {
            MoveDirection::Up => index.checked_sub(1),
            MoveDirection::Down => index.checked_add(1),
        };
        match target {
            Some(target) if index < self.blocks.len() && target < self.blocks.len() => {
                self.blocks.swap(index, target);
                true
            }
            _ => false,
        }
    }

    /// Delete block `id`. Callers confirm with the author beforehand; there
    /// is no undo.
    pub fn remove_block(&mut self, id: &str) -> bool {
        let before = self.blocks.len();
        self.blocks.retain(|block| block.id != id);
        self.blocks.len() != before
    }

    pub fn apply(&mut self, edit: BlockEdit) -> bool {
        match edit {
            BlockEdit::Add { block_type } => {
                self.add_block(block_type);
                true
            }
            BlockEdit::UpdateContent { id, content } => self.update_content(&id, content),
            BlockEdit::UpdateMetadata { id, metadata } => self.update_metadata(&id, &metadata),
            BlockEdit::Move { index, direction } => self.move_block(index, direction),
            BlockEdit::Remove { id } => self.remove_block(&id),
        }
    }

    fn find_mut(&mut self, id: &str) -> Option<&mut ContentBlock> {
        self.blocks.iter_mut().find(|block| block.id == id)
    }
}
