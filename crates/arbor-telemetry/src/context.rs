//! Request context for correlating log lines.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identifying data carried through one unit of work, such as a single
/// resolution or access check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestContext {
    /// Unique id of this request.
    pub request_id: Uuid,
    /// When the request started.
    pub started_at: DateTime<Utc>,
    /// Component that created the context.
    pub component: String,
    /// Operation being performed.
    pub operation: Option<String>,
    /// Principal the request acts for, if known.
    pub principal: Option<String>,
}

impl RequestContext {
    /// Fresh context for `component`.
    #[must_use]
    pub fn new(component: impl Into<String>) -> Self {
        Self {
            request_id: Uuid::new_v4(),
            started_at: Utc::now(),
            component: component.into(),
            operation: None,
            principal: None,
        }
    }

    /// Set the operation name.
    #[must_use]
    pub fn with_operation(mut self, operation: impl Into<String>) -> Self {
        self.operation = Some(operation.into());
        self
    }

    /// Set the principal.
    #[must_use]
    pub fn with_principal(mut self, principal: impl ToString) -> Self {
        self.principal = Some(principal.to_string());
        self
    }

    /// Milliseconds since the request started.
    #[must_use]
    pub fn elapsed_ms(&self) -> i64 {
        Utc::now()
            .signed_duration_since(self.started_at)
            .num_milliseconds()
    }

    /// An `info`-level span carrying the request fields.
    #[must_use]
    pub fn span(&self) -> tracing::Span {
        tracing::info_span!(
            "request",
            request_id = %self.request_id,
            component = %self.component,
            operation = self.operation.as_deref(),
            principal = self.principal.as_deref(),
        )
    }
}

/// Enters the request span and logs completion when dropped.
pub struct RequestGuard {
    context: RequestContext,
    _span: tracing::span::EnteredSpan,
}

impl RequestGuard {
    /// Enter `context`'s span.
    #[must_use]
    pub fn new(context: RequestContext) -> Self {
        let span = context.span().entered();
        tracing::debug!("Request started");
        Self {
            context,
            _span: span,
        }
    }

    /// The guarded context.
    #[must_use]
    pub fn context(&self) -> &RequestContext {
        &self.context
    }
}

impl Drop for RequestGuard {
    fn drop(&mut self) {
        tracing::debug!(elapsed_ms = self.context.elapsed_ms(), "Request completed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_context() {
        let ctx = RequestContext::new("resolver");
        assert_eq!(ctx.component, "resolver");
        assert!(ctx.operation.is_none());
        assert!(ctx.principal.is_none());
        assert_ne!(ctx.request_id, RequestContext::new("resolver").request_id);
    }

    #[test]
    fn test_builder() {
        let ctx = RequestContext::new("cli")
            .with_operation("resolve")
            .with_principal("principal:1234abcd");

        assert_eq!(ctx.operation.as_deref(), Some("resolve"));
        assert_eq!(ctx.principal.as_deref(), Some("principal:1234abcd"));
    }

    #[test]
    fn test_serialization() {
        let ctx = RequestContext::new("cli").with_operation("check");
        let json = serde_json::to_string(&ctx).unwrap();
        let back: RequestContext = serde_json::from_str(&json).unwrap();
        assert_eq!(back, ctx);
    }

    #[test]
    fn test_guard() {
        let guard = RequestGuard::new(RequestContext::new("cli"));
        assert_eq!(guard.context().component, "cli");
        assert!(guard.context().elapsed_ms() >= 0);
    }
}
