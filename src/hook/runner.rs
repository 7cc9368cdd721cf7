use std::sync::Arc;

use futures::future::BoxFuture;
use tracing::Instrument;

use crate::{
    error::Error,
    hook::{phase, AfterRequest, AfterTest, BeforeRequest, BeforeTest, Cleanup},
    services::Services,
};

/// Binds a hook trait object to its lifecycle phase.
pub trait HookPhase: Send + Sync + 'static {
    const PHASE: &'static str;

    /// Name of the concrete hook type, used in logs and errors.
    fn hook_name(&self) -> &'static str;
}

macro_rules! hook_phase {
    ($($hook:ident => $phase:expr),+ $(,)?) => {
        $(
            impl HookPhase for dyn $hook {
                const PHASE: &'static str = $phase;

                fn hook_name(&self) -> &'static str {
                    self.name()
                }
            }
        )+
    };
}

hook_phase! {
    BeforeTest => phase::BEFORE_TEST,
    BeforeRequest => phase::BEFORE_REQUEST,
    AfterRequest => phase::AFTER_REQUEST,
    AfterTest => phase::AFTER_TEST,
    Cleanup => phase::CLEANUP,
}

/// Resolves hooks of one phase from a server's services and runs them in order.
///
/// Runs are fail-fast: the first hook error aborts the remaining hooks of the phase and
/// is returned wrapped in [`Error::HookFailed`]. A phase with no registered hooks is a
/// no-op.
#[derive(Clone)]
pub struct HookRunner {
    services: Services,
}

impl HookRunner {
    pub fn new(services: Services) -> Self {
        Self { services }
    }

    /// Every hook registered for phase `T`, in registration order.
    pub fn hooks<T>(&self) -> Vec<Arc<T>>
    where
        T: ?Sized + HookPhase,
    {
        self.services.get_all::<T>()
    }

    /// Run `action` on every hook of phase `T` with shared access to `state`.
    ///
    /// # Example
    ///
    /// ```ignore
    /// runner
    ///     .run::<dyn BeforeTest, _, _>(&ctx, |hook, ctx| {
    ///         Box::pin(async move { hook.before_test(ctx).await })
    ///     })
    ///     .await?;
    /// ```
    pub async fn run<T, S, F>(&self, state: &S, action: F) -> Result<(), Error>
    where
        T: ?Sized + HookPhase,
        S: ?Sized + Sync,
        F: for<'a> Fn(Arc<T>, &'a S) -> BoxFuture<'a, Result<(), Error>>,
    {
        let hooks = self.hooks::<T>();
        if hooks.is_empty() {
            return Ok(());
        }

        let span = tracing::debug_span!("hook", phase = T::PHASE, hooks = hooks.len());

        async {
            for hook in hooks {
                let name = hook.hook_name();
                tracing::debug!(hook = name, "Running {} hook", T::PHASE);

                action(hook, state)
                    .await
                    .map_err(|source| Self::failed::<T>(name, source))?;
            }

            Ok(())
        }
        .instrument(span)
        .await
    }

    /// Run `action` on every hook of phase `T` with exclusive access to `state`.
    ///
    /// Used by phases whose hooks may modify what they are given, such as
    /// [`BeforeRequest`] hooks rewriting the outgoing request.
    pub async fn run_mut<T, S, F>(&self, state: &mut S, action: F) -> Result<(), Error>
    where
        T: ?Sized + HookPhase,
        S: ?Sized + Send,
        F: for<'a> Fn(Arc<T>, &'a mut S) -> BoxFuture<'a, Result<(), Error>>,
    {
        let hooks = self.hooks::<T>();
        if hooks.is_empty() {
            return Ok(());
        }

        let span = tracing::debug_span!("hook", phase = T::PHASE, hooks = hooks.len());

        async {
            for hook in hooks {
                let name = hook.hook_name();
                tracing::debug!(hook = name, "Running {} hook", T::PHASE);

                action(hook, &mut *state)
                    .await
                    .map_err(|source| Self::failed::<T>(name, source))?;
            }

            Ok(())
        }
        .instrument(span)
        .await
    }

    fn failed<T>(hook: &'static str, source: Error) -> Error
    where
        T: ?Sized + HookPhase,
    {
        tracing::error!(hook = hook, error = %source, "{} hook failed", T::PHASE);

        Error::HookFailed {
            phase: T::PHASE,
            hook,
            source: Box::new(source),
        }
    }
}
