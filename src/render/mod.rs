//! HTML rendering of block documents.
//!
//! Every value that reaches the output is either passed through `ammonia`'s
//! allowlist (rich text) or escaped as plain text. URLs are only emitted when
//! their scheme is on the allowlist for the slot they fill.

use std::fmt::Write;

use ammonia::{clean, clean_text};
use url::Url;

use crate::domain::blocks::{BlockKind, CalloutType, ContentBlock, HeadingLevel, ListType};

const VIDEO_ALLOW: &str =
    "accelerometer; autoplay; clipboard-write; encrypted-media; gyroscope; picture-in-picture";
const EMBED_SANDBOX: &str = "allow-scripts allow-same-origin";
const VIDEO_SANDBOX: &str = "allow-scripts allow-same-origin allow-presentation";
const BLANK_FRAME: &str = "about:blank";

/// Where a URL is going to be used; data URIs are only acceptable for
/// content the browser will not execute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum UrlSlot {
    Media,
    Link,
    Frame,
}

/// Render an ordered block sequence. One block never prevents the others
/// from rendering.
pub fn render_document(blocks: &[ContentBlock]) -> String {
    let mut html = String::from("<div class=\"content-blocks\">");
    for block in blocks {
        let _ = write!(
            html,
            "<div class=\"content-block\" data-block-id=\"{}\">{}</div>",
            attr(&block.id),
            render_block(block)
        );
    }
    html.push_str("</div>");
    html
}

pub fn render_block(block: &ContentBlock) -> String {
    let content = block.content.as_str();
    match &block.kind {
        BlockKind::Text => format!("<div class=\"block-text\">{}</div>", clean(content)),
        BlockKind::Heading { level } => {
            let n = level.number();
            let size = match level {
                HeadingLevel::H1 => "text-3xl",
                HeadingLevel::H2 => "text-2xl",
                HeadingLevel::H3 => "text-xl",
            };
            format!(
                "<h{n} class=\"block-heading {size}\">{}</h{n}>",
                clean_text(content)
            )
        }
        BlockKind::Image { caption } => {
            let src = safe_url(content, UrlSlot::Media).unwrap_or_default();
            let alt = caption.as_deref().unwrap_or("Blog image");
            let mut html = format!(
                "<figure class=\"block-image\"><img src=\"{}\" alt=\"{}\">",
                attr(&src),
                attr(alt)
            );
            if let Some(caption) = caption {
                let _ = write!(html, "<figcaption>{}</figcaption>", clean_text(caption));
            }
            html.push_str("</figure>");
            html
        }
        BlockKind::Video => {
            let src = safe_url(&video_embed_url(content), UrlSlot::Frame)
                .unwrap_or_else(|| BLANK_FRAME.to_string());
            format!(
                "<div class=\"block-video\"><iframe src=\"{}\" title=\"Video Player\" allow=\"{VIDEO_ALLOW}\" sandbox=\"{VIDEO_SANDBOX}\" allowfullscreen></iframe></div>",
                attr(&src)
            )
        }
        BlockKind::File {
            filename,
            mime_type,
        } => {
            let href = safe_url(content, UrlSlot::Media).unwrap_or_else(|| "#".to_string());
            format!(
                "<div class=\"block-file\"><h4>{}</h4><p>{}</p><a href=\"{}\" target=\"_blank\" rel=\"noopener noreferrer\" download>Download</a></div>",
                clean_text(filename.as_deref().unwrap_or("Attached document")),
                clean_text(mime_type.as_deref().unwrap_or("File")),
                attr(&href)
            )
        }
        BlockKind::Link { caption } => {
            let href = safe_url(content, UrlSlot::Link).unwrap_or_else(|| "#".to_string());
            let label = caption.as_deref().unwrap_or(content);
            format!(
                "<a class=\"block-link\" href=\"{}\" target=\"_blank\" rel=\"noopener noreferrer\">{}</a>",
                attr(&href),
                clean_text(label)
            )
        }
        BlockKind::List { list_type, items } => {
            let tag = match list_type {
                ListType::Ordered => "ol",
                ListType::Bullet => "ul",
            };
            let mut html = format!("<{tag} class=\"block-list\">");
            for item in items {
                let _ = write!(html, "<li>{}</li>", clean_text(item));
            }
            let _ = write!(html, "</{tag}>");
            html
        }
        BlockKind::Quote { author } => {
            let mut html = format!(
                "<blockquote class=\"block-quote\"><p>{}</p>",
                clean_text(content)
            );
            if let Some(author) = author {
                let _ = write!(html, "<cite>{}</cite>", clean_text(author));
            }
            html.push_str("</blockquote>");
            html
        }
        BlockKind::Callout { callout_type } => format!(
            "<div class=\"block-callout callout-{}\">{}</div>",
            callout_class(*callout_type),
            clean_text(content)
        ),
        BlockKind::Separator => "<hr class=\"block-separator\">".to_string(),
        BlockKind::Embed => {
            let src =
                safe_url(content, UrlSlot::Frame).unwrap_or_else(|| BLANK_FRAME.to_string());
            format!(
                "<div class=\"block-embed\"><iframe src=\"{}\" title=\"Embedded Content\" sandbox=\"{EMBED_SANDBOX}\"></iframe></div>",
                attr(&src)
            )
        }
        BlockKind::Unknown { type_name, .. } => format!(
            "<p class=\"block-unknown\">Unknown block type: {}</p>",
            clean_text(type_name)
        ),
    }
}

fn callout_class(callout_type: CalloutType) -> &'static str {
    callout_type.as_str()
}

/// Escape a value for a double-quoted attribute. `clean_text` would also
/// entity-encode `/` and `=`, which is valid but unreadable inside URLs.
fn attr(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            c => out.push(c),
        }
    }
    out
}

/// Rewrite YouTube and Vimeo watch URLs into their player form. Anything
/// else is returned unchanged.
///
/// ```
/// use baristaflow_api::render::video_embed_url;
///
/// assert_eq!(
///     video_embed_url("https://www.youtube.com/watch?v=abc123&t=10"),
///     "https://www.youtube.com/embed/abc123"
/// );
/// assert_eq!(
///     video_embed_url("https://vimeo.com/76979871"),
///     "https://player.vimeo.com/video/76979871"
/// );
/// ```
pub fn video_embed_url(raw: &str) -> String {
    let Ok(url) = Url::parse(raw.trim()) else {
        return raw.to_string();
    };
    let host = url.host_str().unwrap_or_default();
    let host = host
        .strip_prefix("www.")
        .or_else(|| host.strip_prefix("m."))
        .unwrap_or(host);
    let last_segment = url
        .path_segments()
        .and_then(|mut segments| segments.rfind(|s| !s.is_empty()))
        .map(str::to_string);

    match host {
        "youtube.com" | "youtu.be" => {
            let id = url
                .query_pairs()
                .find(|(key, _)| key == "v")
                .map(|(_, value)| value.into_owned())
                .or(last_segment);
            match id {
                Some(id) => format!("https://www.youtube.com/embed/{id}"),
                None => raw.to_string(),
            }
        }
        "vimeo.com" | "player.vimeo.com" => match last_segment {
            Some(id) => format!("https://player.vimeo.com/video/{id}"),
            None => raw.to_string(),
        },
        _ => raw.to_string(),
    }
}

/// Return the URL when its scheme is acceptable for `slot`. Root-relative
/// paths such as `/uploads/x.png` are allowed everywhere but frames.
fn safe_url(raw: &str, slot: UrlSlot) -> Option<String> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if raw.starts_with('/') && !raw.starts_with("//") {
        return (slot != UrlSlot::Frame).then(|| raw.to_string());
    }
    let url = Url::parse(raw).ok()?;
    let allowed = match url.scheme() {
        "http" | "https" => true,
        "mailto" => slot == UrlSlot::Link,
        "data" => {
            slot == UrlSlot::Media
                && !raw
                    .get(5..)
                    .unwrap_or_default()
                    .trim_start()
                    .starts_with("text/html")
        }
        _ => false,
    };
    allowed.then(|| raw.to_string())
}
