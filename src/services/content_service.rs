use crate::{
    domain::blocks::{BlockDocument, BlockEdit, ContentBlock},
    dto::content::{EditedBlocks, RenderedDocument},
    render::render_document,
};

/// Run editor commands in order over a stored block sequence.
pub fn apply_edits(blocks: Vec<ContentBlock>, edits: Vec<BlockEdit>) -> EditedBlocks {
    let mut document = BlockDocument::from_blocks(blocks);
    let ignored = edits
        .into_iter()
        .filter(|edit| !document.apply(edit.clone()))
        .count();
    EditedBlocks {
        blocks: document.into_blocks(),
        ignored,
    }
}

/// Prefer blocks; fall back to the legacy free-form HTML body, sanitized.
pub fn render(blocks: &[ContentBlock], html_content: Option<&str>) -> RenderedDocument {
    let html = match html_content {
        Some(html) if blocks.is_empty() => ammonia::clean(html),
        _ => render_document(blocks),
    };
    RenderedDocument { html }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn ignored_edits_are_counted() {
        let edits: Vec<BlockEdit> = serde_json::from_value(json!([
            { "op": "add", "type": "text" },
            { "op": "remove", "id": "missing" },
            { "op": "move", "index": 0, "direction": "up" }
        ]))
        .unwrap();
        let edited = apply_edits(Vec::new(), edits);
        assert_eq!(edited.blocks.len(), 1);
        assert_eq!(edited.ignored, 2);
    }

    #[test]
    fn legacy_html_is_sanitized() {
        let rendered = render(&[], Some("<p>ok</p><script>x()</script>"));
        assert_eq!(rendered.html, "<p>ok</p>");
    }
}
