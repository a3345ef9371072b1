//! The single entry point for a list request.
//!
//! Composes the filter resolver, sort resolver and paginator into one
//! resolved query, executes it against the store, and assembles the page
//! envelope. Read-only; issues at most two store queries per request (count,
//! then page-fetch), each retried at most once on unavailability.

use std::collections::HashMap;
use std::time::Duration;

use crate::error::QueryError;
use crate::filter;
use crate::page::{PageEnvelope, PageRequest};
use crate::schema::EntitySchema;
use crate::sort;
use crate::store::{EntityStore, StoreError};
use crate::{page, store};

/// Fixed backoff before the single retry of a failed store call.
pub const STORE_RETRY_BACKOFF: Duration = Duration::from_millis(50);

/// Raw list-request parameters, split into their roles.
///
/// Plain values passed through the orchestrator; no framework request state.
#[derive(Debug, Clone, Default)]
pub struct ListParams {
    pub filters: HashMap<String, String>,
    pub sort: Option<String>,
    pub page: Option<String>,
    pub page_size: Option<String>,
}

impl ListParams {
    /// Split a raw query-string map into filter map and reserved parameters.
    pub fn from_query(mut params: HashMap<String, String>) -> Self {
        let sort = params.remove("sort");
        let page = params.remove("page");
        let page_size = params.remove("page_size");
        Self {
            filters: params,
            sort,
            page,
            page_size,
        }
    }
}

/// Resolve and execute one list request.
///
/// Any resolver failure short-circuits before the store is touched; the
/// count query runs only after both resolvers succeed, and the page-fetch
/// only after the count. A zero count returns the empty envelope without a
/// fetch.
pub async fn run_list<T, S>(
    store: &S,
    schema: &'static EntitySchema,
    params: &ListParams,
) -> Result<PageEnvelope<T>, QueryError>
where
    S: EntityStore<T>,
{
    let predicates = filter::resolve(schema, &params.filters)?;
    let sort_spec = sort::resolve(schema, params.sort.as_deref())?;
    let request = PageRequest::resolve(params.page.as_deref(), params.page_size.as_deref())?;

    let total_count = retry_once(schema.entity, "count", || store.count(&predicates)).await?;
    let window = page::window(request, total_count);

    if total_count == 0 {
        return Ok(PageEnvelope::from_window(&window, Vec::new()));
    }

    let items = retry_once(schema.entity, "fetch_page", || {
        store.fetch_page(&predicates, &sort_spec, window.offset, window.limit)
    })
    .await?;

    Ok(PageEnvelope::from_window(&window, items))
}

async fn retry_once<T, F, Fut>(entity: &str, op_name: &str, op: F) -> Result<T, QueryError>
where
    F: Fn() -> Fut,
    Fut: Future<Output = Result<T, store::StoreError>>,
{
    match op().await {
        Ok(value) => Ok(value),
        Err(StoreError::Unavailable(first)) => {
            tracing::warn!(entity, op = op_name, error = %first, "store call failed, retrying");
            tokio::time::sleep(STORE_RETRY_BACKOFF).await;
            op().await.map_err(|StoreError::Unavailable(msg)| {
                tracing::error!(entity, op = op_name, error = %msg, "store call failed after retry");
                QueryError::StoreUnavailable(msg)
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::Predicate;
    use crate::sort::SortSpec;
    use crate::testutil::{SAMPLE_SCHEMA, SampleRow, sample_row};
    use std::sync::atomic::{AtomicU64, Ordering};

    /// Vec-backed store that counts calls and can fail the first N of them.
    struct StubStore {
        rows: Vec<SampleRow>,
        count_calls: AtomicU64,
        fetch_calls: AtomicU64,
        failures_left: AtomicU64,
    }

    impl StubStore {
        fn new(rows: Vec<SampleRow>) -> Self {
            Self {
                rows,
                count_calls: AtomicU64::new(0),
                fetch_calls: AtomicU64::new(0),
                failures_left: AtomicU64::new(0),
            }
        }

        fn failing_first(rows: Vec<SampleRow>, failures: u64) -> Self {
            let store = Self::new(rows);
            store.failures_left.store(failures, Ordering::SeqCst);
            store
        }

        fn maybe_fail(&self) -> Result<(), StoreError> {
            if self
                .failures_left
                .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
                .is_ok()
            {
                return Err(StoreError::Unavailable("connection refused".into()));
            }
            Ok(())
        }

        fn matching(&self, predicates: &[Predicate]) -> Vec<SampleRow> {
            self.rows
                .iter()
                .filter(|row| predicates.iter().all(|p| p.matches(*row)))
                .cloned()
                .collect()
        }
    }

    impl EntityStore<SampleRow> for StubStore {
        async fn count(&self, predicates: &[Predicate]) -> Result<u64, StoreError> {
            self.count_calls.fetch_add(1, Ordering::SeqCst);
            self.maybe_fail()?;
            Ok(self.matching(predicates).len() as u64)
        }

        async fn fetch_page(
            &self,
            predicates: &[Predicate],
            sort: &SortSpec,
            offset: u64,
            limit: u64,
        ) -> Result<Vec<SampleRow>, StoreError> {
            self.fetch_calls.fetch_add(1, Ordering::SeqCst);
            self.maybe_fail()?;
            let mut rows = self.matching(predicates);
            rows.sort_by(|a, b| sort.compare(a, b));
            Ok(rows
                .into_iter()
                .skip(offset as usize)
                .take(limit as usize)
                .collect())
        }
    }

    fn twenty_five_rows() -> Vec<SampleRow> {
        (0..25)
            .map(|i| sample_row(&format!("item {i}"), 100 + i, i as u128))
            .collect()
    }

    fn list(pairs: &[(&str, &str)]) -> ListParams {
        ListParams::from_query(
            pairs
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        )
    }

    #[tokio::test]
    async fn issues_exactly_two_store_queries() {
        let store = StubStore::new(twenty_five_rows());
        run_list(&store, &SAMPLE_SCHEMA, &list(&[])).await.unwrap();
        assert_eq!(store.count_calls.load(Ordering::SeqCst), 1);
        assert_eq!(store.fetch_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn resolver_failure_never_touches_the_store() {
        let store = StubStore::new(twenty_five_rows());
        let err = run_list(&store, &SAMPLE_SCHEMA, &list(&[("min_price", "10"), ("max_price", "5")]))
            .await
            .unwrap_err();
        assert_eq!(err, QueryError::invalid_range("price"));
        assert_eq!(store.count_calls.load(Ordering::SeqCst), 0);
        assert_eq!(store.fetch_calls.load(Ordering::SeqCst), 0);

        let err = run_list(&store, &SAMPLE_SCHEMA, &list(&[("sort", "flavor")]))
            .await
            .unwrap_err();
        assert_eq!(err, QueryError::InvalidSortField("flavor".to_string()));
        assert_eq!(store.count_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn empty_count_skips_the_fetch() {
        let store = StubStore::new(Vec::new());
        let envelope = run_list(&store, &SAMPLE_SCHEMA, &list(&[])).await.unwrap();
        assert!(envelope.items.is_empty());
        assert_eq!(envelope.page, 1);
        assert_eq!(envelope.total_pages, 0);
        assert!(!envelope.has_next);
        assert!(!envelope.has_previous);
        assert_eq!(store.fetch_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn twenty_five_rows_page_three_of_ten() {
        let store = StubStore::new(twenty_five_rows());
        let envelope = run_list(
            &store,
            &SAMPLE_SCHEMA,
            &list(&[("page", "3"), ("page_size", "10"), ("sort", "price")]),
        )
        .await
        .unwrap();
        assert_eq!(envelope.items.len(), 5);
        assert_eq!(envelope.total_count, 25);
        assert!(!envelope.has_next);
        assert!(envelope.has_previous);
    }

    #[tokio::test(start_paused = true)]
    async fn transient_unavailability_is_retried_once() {
        let store = StubStore::failing_first(twenty_five_rows(), 1);
        let envelope = run_list(&store, &SAMPLE_SCHEMA, &list(&[])).await.unwrap();
        assert_eq!(envelope.total_count, 25);
        // First count failed, second succeeded, then one fetch.
        assert_eq!(store.count_calls.load(Ordering::SeqCst), 2);
        assert_eq!(store.fetch_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn persistent_unavailability_surfaces_after_one_retry() {
        let store = StubStore::failing_first(twenty_five_rows(), 10);
        let err = run_list(&store, &SAMPLE_SCHEMA, &list(&[])).await.unwrap_err();
        assert!(matches!(err, QueryError::StoreUnavailable(_)));
        assert_eq!(store.count_calls.load(Ordering::SeqCst), 2);
        assert_eq!(store.fetch_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn repeated_requests_return_identical_pages() {
        let store = StubStore::new(twenty_five_rows());
        let params = list(&[("page", "2"), ("page_size", "7"), ("sort", "-price")]);
        let first = run_list(&store, &SAMPLE_SCHEMA, &params).await.unwrap();
        let second = run_list(&store, &SAMPLE_SCHEMA, &params).await.unwrap();
        assert_eq!(first, second);
    }
}
