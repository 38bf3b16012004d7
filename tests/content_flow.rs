mod common;

use baristaflow_api::{
    domain::blocks::{BlockEdit, BlockKind},
    dto::blogs::CreateBlogRequest,
    error::AppError,
    services::blog_service,
};
use common::{app, register};
use serde_json::json;

fn edits(value: serde_json::Value) -> Vec<BlockEdit> {
    serde_json::from_value(value).expect("edits")
}

#[tokio::test]
async fn block_edits_persist_and_render_sanitized() -> anyhow::Result<()> {
    let app = app();
    let state = &app.state;
    let author = register(state, "Andrea").await?;
    let other = register(state, "Benja").await?;
    let payload: CreateBlogRequest =
        serde_json::from_value(json!({ "title": "Espresso", "content": "notas" }))?;
    let blog = blog_service::create_blog(state, &author, payload)
        .await?
        .data
        .expect("blog")
        .blog;

    let added = blog_service::edit_blocks(
        state,
        &author,
        blog.id,
        edits(json!([
            { "op": "add", "type": "text" },
            { "op": "add", "type": "heading" },
            { "op": "remove", "id": "does-not-exist" }
        ])),
    )
    .await?
    .data
    .expect("edited");
    assert_eq!(added.blocks.len(), 2);
    assert_eq!(added.ignored, 1);
    let text_id = added.blocks[0].id.clone();

    blog_service::edit_blocks(
        state,
        &author,
        blog.id,
        edits(json!([
            {
                "op": "updateContent",
                "id": text_id,
                "content": "<p>Molienda fina</p><script>alert(1)</script>"
            },
            { "op": "move", "index": 1, "direction": "up" }
        ])),
    )
    .await?;

    let stored = blog_service::get_blog(state, blog.id)
        .await?
        .data
        .expect("blog");
    assert!(matches!(stored.blocks[0].kind, BlockKind::Heading { .. }));
    assert_eq!(stored.blocks[1].id, text_id);

    let html = blog_service::render_blog(state, blog.id)
        .await?
        .data
        .expect("render")
        .html;
    assert!(html.contains("Molienda fina"));
    assert!(!html.contains("<script"));
    assert!(html.contains(&format!("data-block-id=\"{text_id}\"")));

    let denied =
        blog_service::edit_blocks(state, &other, blog.id, edits(json!([{ "op": "add", "type": "text" }])))
            .await;
    assert!(matches!(denied, Err(AppError::Forbidden)));
    Ok(())
}

#[tokio::test]
async fn legacy_html_is_sanitized_when_there_are_no_blocks() -> anyhow::Result<()> {
    let app = app();
    let state = &app.state;
    let author = register(state, "Andrea").await?;
    let payload: CreateBlogRequest = serde_json::from_value(json!({
        "title": "Legacy",
        "content": "texto",
        "htmlContent": "<h2>Hola</h2><img src=x onerror=alert(1)>"
    }))?;
    let blog = blog_service::create_blog(state, &author, payload)
        .await?
        .data
        .expect("blog")
        .blog;

    let html = blog_service::render_blog(state, blog.id)
        .await?
        .data
        .expect("render")
        .html;
    assert!(html.contains("<h2>Hola</h2>"));
    assert!(!html.contains("onerror"));
    Ok(())
}
