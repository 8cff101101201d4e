//! The executable side of an action.

use std::future::Future;
use std::marker::PhantomData;

use async_trait::async_trait;
use serde_json::Value;

use crate::config::ResolvedActionConfig;
use crate::context::ActionContext;
use crate::error::ActionError;

/// Executable unit behind an action id.
///
/// Implementations receive a configuration that has already been merged and
/// validated against the action's schema.
///
/// # Example
///
/// ```rust
/// use async_trait::async_trait;
/// use serde_json::{Value, json};
/// use weave_action::{ActionContext, ActionError, ActionHandler, ResolvedActionConfig};
///
/// struct Auth;
///
/// #[async_trait]
/// impl ActionHandler for Auth {
///     async fn execute(
///         &self,
///         _ctx: &ActionContext,
///         _config: &ResolvedActionConfig,
///     ) -> Result<Value, ActionError> {
///         Ok(json!({"valid_credentials": true}))
///     }
/// }
/// ```
#[async_trait]
pub trait ActionHandler: Send + Sync + 'static {
    /// Run the action.
    async fn execute(
        &self,
        ctx: &ActionContext,
        config: &ResolvedActionConfig,
    ) -> Result<Value, ActionError>;
}

/// [`ActionHandler`] built from an async closure.
///
/// The closure receives owned copies of the context and configuration so the
/// returned future is `'static`.
pub struct FnHandler<F, Fut> {
    f: F,
    _fut: PhantomData<fn() -> Fut>,
}

/// Wrap an async closure as an [`ActionHandler`].
pub fn handler_fn<F, Fut>(f: F) -> FnHandler<F, Fut>
where
    F: Fn(ActionContext, ResolvedActionConfig) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<Value, ActionError>> + Send + 'static,
{
    FnHandler {
        f,
        _fut: PhantomData,
    }
}

#[async_trait]
impl<F, Fut> ActionHandler for FnHandler<F, Fut>
where
    F: Fn(ActionContext, ResolvedActionConfig) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<Value, ActionError>> + Send + 'static,
{
    async fn execute(
        &self,
        ctx: &ActionContext,
        config: &ResolvedActionConfig,
    ) -> Result<Value, ActionError> {
        (self.f)(ctx.clone(), config.clone()).await
    }
}

impl<F, Fut> std::fmt::Debug for FnHandler<F, Fut> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FnHandler").finish_non_exhaustive()
    }
}
