//! Path resolution within a selected experiment.
//!
//! Turns a requested URL path into object lookups against the experiment's
//! prefix, walking a fixed fallback chain and stopping at the first hit.

use hyper::StatusCode;
use hyper::body::Bytes;
use store::{ObjectStore, StoreError};

/// Outcome of the fallback chain.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Resolution {
    /// An object was found; serve its bytes with the given status.
    Object {
        key: String,
        status: StatusCode,
        body: Bytes,
    },
    /// Every fallback missed; the caller emits the generic 404.
    Missing,
}

/// Resolve `path` (leading `/`) inside `experiment`, trying in order:
///
/// 1. `<experiment><path>index.html` when the path carries no `.` anywhere
///    (assets keep their extension, so a dot-free path is a directory
///    request), else `<experiment><path>` verbatim;
/// 2. the path with any trailing slash removed, plus `.html`;
/// 3. the experiment's own `404.html`, served with status 404;
/// 4. `Missing`.
///
/// Each step is one point read; a miss falls through, a store failure
/// aborts the chain.
pub async fn resolve(
    store: &dyn ObjectStore,
    experiment: &str,
    path: &str,
) -> Result<Resolution, StoreError> {
    let primary = if path.contains('.') {
        format!("{experiment}{path}")
    } else {
        format!("{experiment}{path}index.html")
    };
    if let Some(body) = store.get(&primary).await? {
        return Ok(found(primary, StatusCode::OK, body));
    }

    let html_key = match path.strip_suffix('/') {
        Some(stripped) => format!("{experiment}{stripped}.html"),
        None => format!("{experiment}{path}.html"),
    };
    if let Some(body) = store.get(&html_key).await? {
        return Ok(found(html_key, StatusCode::OK, body));
    }

    let custom_404 = format!("{experiment}/404.html");
    if let Some(body) = store.get(&custom_404).await? {
        return Ok(found(custom_404, StatusCode::NOT_FOUND, body));
    }

    Ok(Resolution::Missing)
}

fn found(key: String, status: StatusCode, body: Bytes) -> Resolution {
    tracing::debug!(%key, status = status.as_u16(), "resolved object");
    Resolution::Object { key, status, body }
}
