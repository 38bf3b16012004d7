use std::fmt;

use thiserror::Error;

/// Characters the document store refuses inside a path segment.
const FORBIDDEN: [char; 5] = ['.', '#', '$', '[', ']'];

/// Slash-separated address of a node in the document tree, e.g.
/// `orders/{uid}/{orderId}`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StorePath {
    segments: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StorePathError {
    #[error("store path must not be empty")]
    Empty,
    #[error("store path segment `{0}` is empty or contains a forbidden character")]
    InvalidSegment(String),
}

impl StorePath {
    /// Parse a `/`-separated path. Leading and trailing slashes are ignored.
    ///
    /// ```
    /// use baristaflow_api::store::StorePath;
    ///
    /// let path = StorePath::parse("/users/abc/followers").unwrap();
    /// assert_eq!(path.to_string(), "users/abc/followers");
    /// ```
    pub fn parse(raw: &str) -> Result<Self, StorePathError> {
        let trimmed = raw.trim_matches('/');
        if trimmed.is_empty() {
            return Err(StorePathError::Empty);
        }
        let mut segments = Vec::new();
        for segment in trimmed.split('/') {
            validate_segment(segment)?;
            segments.push(segment.to_string());
        }
        Ok(Self { segments })
    }

    /// Start a path at a top-level collection such as `blogs`.
    pub fn root(segment: impl Into<String>) -> Result<Self, StorePathError> {
        let segment = segment.into();
        validate_segment(&segment)?;
        Ok(Self {
            segments: vec![segment],
        })
    }

    pub fn child(mut self, segment: impl fmt::Display) -> Result<Self, StorePathError> {
        let segment = segment.to_string();
        validate_segment(&segment)?;
        self.segments.push(segment);
        Ok(self)
    }

    /// Append a relative, possibly multi-segment path.
    pub fn join(mut self, relative: &str) -> Result<Self, StorePathError> {
        for segment in relative.trim_matches('/').split('/') {
            validate_segment(segment)?;
            self.segments.push(segment.to_string());
        }
        Ok(self)
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// Top-level collection this path lives under.
    pub fn head(&self) -> &str {
        self.segments.first().map(String::as_str).unwrap_or_default()
    }

    /// Segments below the top-level collection.
    pub fn tail(&self) -> &[String] {
        self.segments.get(1..).unwrap_or_default()
    }

    pub fn starts_with(&self, prefix: &StorePath) -> bool {
        self.segments.starts_with(&prefix.segments)
    }

    /// True when one path is an ancestor of (or equal to) the other.
    pub fn overlaps(&self, other: &StorePath) -> bool {
        self.starts_with(other) || other.starts_with(self)
    }
}

fn validate_segment(segment: &str) -> Result<(), StorePathError> {
    if segment.is_empty() || segment.contains(FORBIDDEN) || segment.contains('/') {
        return Err(StorePathError::InvalidSegment(segment.to_string()));
    }
    Ok(())
}

impl fmt::Display for StorePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.segments.join("/"))
    }
}
