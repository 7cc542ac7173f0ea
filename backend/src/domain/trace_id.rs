//! Request-scoped trace identifier for correlation across logs and errors.
//!
//! The identifier lives in task-local storage so that errors raised deep in a
//! service can capture it without parameter threading. Task-locals are not
//! inherited by spawned tasks; wrap such work in [`TraceId::scope`].

use std::future::Future;

use tokio::task_local;
use uuid::Uuid;

task_local! {
    static TRACE_ID: TraceId;
}

/// Name of the response (and optional request) header carrying the identifier.
pub const TRACE_ID_HEADER: &str = "trace-id";

/// Per-request trace identifier.
///
/// # Examples
/// ```
/// use masters_backend::TraceId;
///
/// # tokio::runtime::Runtime::new().expect("runtime").block_on(async {
/// let id = TraceId::generate();
/// let seen = TraceId::scope(id, async { TraceId::current() }).await;
/// assert_eq!(seen, Some(id));
/// # });
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TraceId(Uuid);

impl TraceId {
    /// Generate a new random trace identifier.
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    /// Accept an identifier supplied by an upstream proxy.
    ///
    /// Only well-formed UUIDs are honoured; anything else yields `None` so the
    /// caller can fall back to [`TraceId::generate`].
    #[must_use]
    pub fn from_header(value: &str) -> Option<Self> {
        Uuid::parse_str(value.trim()).ok().filter(|id| !id.is_nil()).map(Self)
    }

    /// Returns the current trace identifier if one is in scope.
    #[must_use]
    pub fn current() -> Option<Self> {
        TRACE_ID.try_with(|id| *id).ok()
    }

    /// Access the inner UUID.
    #[must_use]
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }

    /// Execute the provided future with the supplied trace identifier in scope.
    pub async fn scope<Fut>(trace_id: TraceId, fut: Fut) -> Fut::Output
    where
        Fut: Future,
    {
        TRACE_ID.scope(trace_id, fut).await
    }

    /// Run a synchronous closure with the identifier in scope.
    pub fn sync_scope<F, R>(trace_id: TraceId, f: F) -> R
    where
        F: FnOnce() -> R,
    {
        TRACE_ID.sync_scope(trace_id, f)
    }
}

impl std::fmt::Display for TraceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for TraceId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}
