use std::sync::Arc;

use axum::Router;

use crate::{
    config::Config,
    error::Error,
    hook::{AfterRequest, AfterTest, BeforeRequest, BeforeTest, Cleanup, HookPhase},
    logs::LogFilter,
    server::TestServer,
    services::{ServiceCollection, Services},
};

/// Configures a [`TestServer`] before it is built.
///
/// Handed to the configuration callback registered with
/// [`ServerManager::register`](crate::ServerManager::register). Methods can be chained;
/// nothing runs until [`build`](Self::build).
pub struct ServerBuilder {
    name: String,
    router: Option<Router>,
    services: ServiceCollection,
    log_filters: Vec<LogFilter>,
    config: Config,
}

impl ServerBuilder {
    /// Create a builder for the server `name` with default configuration.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            router: None,
            services: ServiceCollection::new(),
            log_filters: Vec::new(),
            config: Config::default(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Replace the framework configuration used by this server.
    pub fn with_config(mut self, config: Config) -> Self {
        self.config = config;
        self
    }

    /// Set the application under test.
    ///
    /// The router must already have its state applied.
    pub fn with_router(mut self, router: Router) -> Self {
        self.router = Some(router);
        self
    }

    /// Register a singleton service resolvable by hooks and tests.
    pub fn with_service<T>(self, value: T) -> Self
    where
        T: Send + Sync + 'static,
    {
        self.with_shared_service(Arc::new(value))
    }

    /// Register an already shared service, which may be a trait object.
    pub fn with_shared_service<T>(mut self, value: Arc<T>) -> Self
    where
        T: ?Sized + Send + Sync + 'static,
    {
        self.services.add(value);
        self
    }

    /// Register a service created once per session.
    pub fn with_scoped_service<T, F>(mut self, factory: F) -> Self
    where
        T: Send + Sync + 'static,
        F: Fn(&Services) -> T + Send + Sync + 'static,
    {
        self.services.add_scoped(factory);
        self
    }

    /// Register a hook under the phase trait `T`.
    ///
    /// Prefer the per-phase helpers such as [`with_before_test`](Self::with_before_test);
    /// this form is useful when the hook is already behind an `Arc`.
    pub fn with_hook<T>(mut self, hook: Arc<T>) -> Self
    where
        T: ?Sized + HookPhase,
    {
        self.services.add(hook);
        self
    }

    pub fn with_before_test<H: BeforeTest + 'static>(self, hook: H) -> Self {
        self.with_hook::<dyn BeforeTest>(Arc::new(hook))
    }

    pub fn with_before_request<H: BeforeRequest + 'static>(self, hook: H) -> Self {
        self.with_hook::<dyn BeforeRequest>(Arc::new(hook))
    }

    pub fn with_after_request<H: AfterRequest + 'static>(self, hook: H) -> Self {
        self.with_hook::<dyn AfterRequest>(Arc::new(hook))
    }

    pub fn with_after_test<H: AfterTest + 'static>(self, hook: H) -> Self {
        self.with_hook::<dyn AfterTest>(Arc::new(hook))
    }

    pub fn with_cleanup<H: Cleanup + 'static>(self, hook: H) -> Self {
        self.with_hook::<dyn Cleanup>(Arc::new(hook))
    }

    /// Add a global log filter applied to every session of this server.
    pub fn allow_logs(mut self, filter: LogFilter) -> Self {
        self.log_filters.push(filter);
        self
    }

    /// Build the server.
    ///
    /// The default global filter accepting events below
    /// [`Config::unexpected_log_level`] is placed ahead of any filter added with
    /// [`allow_logs`](Self::allow_logs).
    ///
    /// # Returns
    /// - `Ok(TestServer)` - Server ready to open sessions
    /// - `Err(Error::ServerConfiguration)` - No router was configured
    pub fn build(self) -> Result<TestServer, Error> {
        let router = self.router.ok_or_else(|| Error::ServerConfiguration {
            name: self.name.clone(),
            reason: "no router configured, call ServerBuilder::with_router".to_string(),
        })?;

        let mut log_filters = vec![LogFilter::below(self.config.unexpected_log_level)];
        log_filters.extend(self.log_filters);

        Ok(TestServer::new(
            self.name,
            router,
            self.services.build(),
            log_filters,
            self.config,
        ))
    }
}
