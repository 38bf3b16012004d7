//! Aggregate search result model.
//!
//! Hits are matched by case-insensitive substring containment and kept in
//! source order: users, blogs, products, courses. There is no ranking.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::models::{BlogPost, Course, Product, User};

const USER_PLACEHOLDER_IMAGE: &str = "https://via.placeholder.com/150";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum SearchKind {
    User,
    Blog,
    Product,
    Course,
}

/// Client-side tab selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum SearchFilter {
    #[default]
    All,
    Users,
    Blogs,
    Products,
    Courses,
}

impl SearchFilter {
    pub fn admits(&self, kind: SearchKind) -> bool {
        matches!(
            (self, kind),
            (SearchFilter::All, _)
                | (SearchFilter::Users, SearchKind::User)
                | (SearchFilter::Blogs, SearchKind::Blog)
                | (SearchFilter::Products, SearchKind::Product)
                | (SearchFilter::Courses, SearchKind::Course)
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct SearchResult {
    pub id: String,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(rename = "type")]
    pub kind: SearchKind,
    pub link: String,
}

/// Lower-cased, trimmed search term. Blank input yields `None`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchTerm(String);

impl SearchTerm {
    pub fn new(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(Self(trimmed.to_lowercase()))
        }
    }

    /// True when any field contains the term, ignoring case.
    pub fn hits(&self, fields: &[&str]) -> bool {
        fields
            .iter()
            .any(|field| field.to_lowercase().contains(&self.0))
    }

    pub fn match_user(&self, user: &User) -> Option<SearchResult> {
        self.hits(&[&user.username]).then(|| SearchResult {
            id: user.uid.clone(),
            title: user.username.clone(),
            description: Some(
                user.description
                    .clone()
                    .unwrap_or_else(|| "BaristaFlow user".to_string()),
            ),
            image: Some(
                user.photo_url
                    .clone()
                    .unwrap_or_else(|| USER_PLACEHOLDER_IMAGE.to_string()),
            ),
            kind: SearchKind::User,
            link: format!("/profile/{}", user.uid),
        })
    }

    pub fn match_blog(&self, blog: &BlogPost) -> Option<SearchResult> {
        self.hits(&[&blog.title, &blog.content]).then(|| SearchResult {
            id: blog.id.to_string(),
            title: blog.title.clone(),
            description: Some(blog.excerpt.clone()),
            image: Some(blog.image_url.clone()),
            kind: SearchKind::Blog,
            link: format!("/community/{}", blog.id),
        })
    }

    pub fn match_product(&self, product: &Product) -> Option<SearchResult> {
        self.hits(&[&product.name, &product.description])
            .then(|| SearchResult {
                id: product.id.to_string(),
                title: product.name.clone(),
                description: Some(product.description.clone()),
                image: Some(product.image.clone()),
                kind: SearchKind::Product,
                link: format!("/products/{}", product.id),
            })
    }

    pub fn match_course(&self, course: &Course) -> Option<SearchResult> {
        self.hits(&[&course.title, &course.description])
            .then(|| SearchResult {
                id: course.id.clone(),
                title: course.title.clone(),
                description: Some(course.description.clone()),
                image: Some(course.image.clone()),
                kind: SearchKind::Course,
                link: format!("/courses/{}", course.id),
            })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, ToSchema)]
pub struct SearchCounts {
    pub all: usize,
    pub users: usize,
    pub blogs: usize,
    pub products: usize,
    pub courses: usize,
}

impl SearchCounts {
    pub fn tally(results: &[SearchResult]) -> Self {
        let mut counts = Self {
            all: results.len(),
            ..Self::default()
        };
        for result in results {
            match result.kind {
                SearchKind::User => counts.users += 1,
                SearchKind::Blog => counts.blogs += 1,
                SearchKind::Product => counts.products += 1,
                SearchKind::Course => counts.courses += 1,
            }
        }
        counts
    }
}

/// Merged output of one search across every source.
#[derive(Debug, Clone, Default, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SearchOutcome {
    pub results: Vec<SearchResult>,
    /// Counts over the unfiltered result set.
    pub counts: SearchCounts,
    /// Sources whose fetch failed and contributed nothing.
    pub failed_sources: Vec<SearchKind>,
}

impl SearchOutcome {
    pub fn merge(batches: Vec<(SearchKind, Option<Vec<SearchResult>>)>) -> Self {
        let mut results = Vec::new();
        let mut failed_sources = Vec::new();
        for (kind, batch) in batches {
            match batch {
                Some(batch) => results.extend(batch),
                None => failed_sources.push(kind),
            }
        }
        let counts = SearchCounts::tally(&results);
        Self {
            results,
            counts,
            failed_sources,
        }
    }

    /// Keep only the results the filter admits; counts are untouched.
    pub fn filtered(mut self, filter: SearchFilter) -> Self {
        self.results.retain(|result| filter.admits(result.kind));
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hit(kind: SearchKind, id: &str) -> SearchResult {
        SearchResult {
            id: id.into(),
            title: id.into(),
            description: None,
            image: None,
            kind,
            link: String::new(),
        }
    }

    #[test]
    fn blank_terms_are_rejected() {
        assert!(SearchTerm::new("   ").is_none());
        assert!(SearchTerm::new("").is_none());
    }

    #[test]
    fn matching_ignores_case() {
        let term = SearchTerm::new("  ESPRESSO ").unwrap();
        assert!(term.hits(&["Máquina Espresso Portátil"]));
        assert!(!term.hits(&["V60 Dripper", "filtrado"]));
    }

    #[test]
    fn merge_keeps_source_order_and_records_failures() {
        let outcome = SearchOutcome::merge(vec![
            (SearchKind::User, Some(vec![hit(SearchKind::User, "u")])),
            (SearchKind::Blog, None),
            (SearchKind::Product, Some(vec![hit(SearchKind::Product, "p1"), hit(SearchKind::Product, "p2")])),
            (SearchKind::Course, Some(vec![])),
        ]);
        let ids: Vec<_> = outcome.results.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, ["u", "p1", "p2"]);
        assert_eq!(outcome.failed_sources, vec![SearchKind::Blog]);
        assert_eq!(outcome.counts.all, 3);
        assert_eq!(outcome.counts.products, 2);

        let products = outcome.filtered(SearchFilter::Products);
        assert_eq!(products.results.len(), 2);
        assert_eq!(products.counts.all, 3);
    }
}
