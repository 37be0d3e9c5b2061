use std::future::Future;
use std::time::Duration;

use anyhow::Result;

use crate::cache::TtlCache;
use crate::log_debug;

const ENABLE_LOGS: bool = true;

/// Build the canonical cache key for a table query.
///
/// Filter keys are sorted lexicographically before joining, so semantically
/// identical filter sets always produce the same key regardless of the
/// order the filters were supplied in.
pub fn query_cache_key(table: &str, filters: &[(&str, &str)]) -> String {
    if filters.is_empty() {
        return table.to_string();
    }

    let mut sorted = filters.to_vec();
    sorted.sort_by(|a, b| a.0.cmp(b.0));

    let filter_part = sorted
        .iter()
        .map(|(key, value)| format!("{key}:{value}"))
        .collect::<Vec<_>>()
        .join("|");

    format!("{table}?{filter_part}")
}

/// Serve `key` from the cache, or run `fetch` and cache its result.
///
/// A hit returns immediately without invoking `fetch`. On a miss the fetched
/// value is stored under `key` (with `ttl`, or the cache default) and
/// returned. A failed fetch is propagated to the caller and never cached, so
/// a transient failure cannot poison the cache for the TTL window; every
/// call after a failure retries the underlying fetch.
///
/// Concurrent misses on the same key are not de-duplicated: two callers
/// racing on an empty slot may both run `fetch`. Coalescing would change the
/// side-effect timing of the wrapped operation, so the race is left as is.
pub async fn cached_query<T, F, Fut>(
    cache: &TtlCache<T>,
    key: &str,
    ttl: Option<Duration>,
    fetch: F,
) -> Result<T>
where
    T: Clone,
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    if let Some(hit) = cache.get(key) {
        log_debug!("query cache hit for '{key}'");
        return Ok(hit);
    }

    let data = fetch().await?;

    match ttl {
        Some(ttl) => cache.set_with_ttl(key, data.clone(), ttl),
        None => cache.set(key, data.clone()),
    }

    Ok(data)
}

/// Drop every cached query for `table` after a mutation to it.
///
/// Removes the bare `table` key and every `table?...` filtered variant, but
/// not keys of other tables that merely contain `table` as a substring.
pub fn invalidate_table<T: Clone>(cache: &TtlCache<T>, table: &str) {
    let prefix = format!("{table}?");
    cache.invalidate_where(|key| key == table || key.starts_with(&prefix));
    log_debug!("invalidated cached queries for table '{table}'");
}
