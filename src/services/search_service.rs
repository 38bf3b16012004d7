use crate::{
    domain::search::{SearchFilter, SearchKind, SearchOutcome, SearchResult, SearchTerm},
    error::AppResult,
    models::User,
    response::{ApiResponse, Meta},
    services::{blog_service::all_blogs, course_service::all_courses, product_service::catalog},
    state::AppState,
    store::{DocumentStore, StoreError, StorePath, list_as},
};

async fn search_users(
    store: &dyn DocumentStore,
    term: &SearchTerm,
) -> Result<Vec<SearchResult>, StoreError> {
    Ok(list_as::<User>(store, &StorePath::root("users")?)
        .await?
        .iter()
        .filter_map(|(_, user)| term.match_user(user))
        .collect())
}

async fn search_blogs(
    store: &dyn DocumentStore,
    term: &SearchTerm,
) -> Result<Vec<SearchResult>, StoreError> {
    Ok(all_blogs(store)
        .await?
        .iter()
        .filter_map(|blog| term.match_blog(blog))
        .collect())
}

/// Archived courses are not part of the public catalog and never match.
async fn search_courses(
    store: &dyn DocumentStore,
    term: &SearchTerm,
) -> Result<Vec<SearchResult>, StoreError> {
    Ok(all_courses(store)
        .await?
        .iter()
        .filter(|course| !course.is_archived)
        .filter_map(|course| term.match_course(course))
        .collect())
}

fn search_products(term: &SearchTerm) -> Vec<SearchResult> {
    catalog()
        .iter()
        .filter_map(|product| term.match_product(product))
        .collect()
}

/// Turn a failed source into an empty contribution, logging why.
fn settle(
    kind: SearchKind,
    result: Result<Vec<SearchResult>, StoreError>,
) -> (SearchKind, Option<Vec<SearchResult>>) {
    match result {
        Ok(results) => (kind, Some(results)),
        Err(err) => {
            tracing::warn!(source = ?kind, error = %err, "search source failed");
            (kind, None)
        }
    }
}

/// Query every source concurrently and merge in source order. One failing
/// source never hides the results of the others.
pub async fn run_search(store: &dyn DocumentStore, raw_query: &str) -> SearchOutcome {
    let Some(term) = SearchTerm::new(raw_query) else {
        return SearchOutcome::default();
    };

    let (users, blogs, courses) = tokio::join!(
        search_users(store, &term),
        search_blogs(store, &term),
        search_courses(store, &term),
    );

    SearchOutcome::merge(vec![
        settle(SearchKind::User, users),
        settle(SearchKind::Blog, blogs),
        (SearchKind::Product, Some(search_products(&term))),
        settle(SearchKind::Course, courses),
    ])
}

pub async fn search(
    state: &AppState,
    query: &str,
    filter: SearchFilter,
) -> AppResult<ApiResponse<SearchOutcome>> {
    let outcome = run_search(state.store.as_ref(), query).await.filtered(filter);
    let meta = Meta::total(outcome.counts.all);
    Ok(ApiResponse::success("Ok", outcome, Some(meta)))
}
