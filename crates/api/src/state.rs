//! Shared handler state

use std::sync::Arc;

use weave_runtime::ActionRunner;

/// State shared by every route.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Executes actions for both routes.
    pub runner: Arc<ActionRunner>,
    /// Parent of every request span.
    pub parent_span: tracing::Span,
}

impl AppState {
    /// Create state around `runner`. Request spans are roots.
    pub fn new(runner: Arc<ActionRunner>) -> Self {
        Self {
            runner,
            parent_span: tracing::Span::none(),
        }
    }

    /// Parent request spans on `span`, usually the logger's service span.
    #[must_use]
    pub fn with_parent_span(mut self, span: tracing::Span) -> Self {
        self.parent_span = span;
        self
    }
}
