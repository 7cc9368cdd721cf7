use std::{
    collections::HashMap,
    future::Future,
    sync::{Arc, Mutex, MutexGuard, OnceLock, PoisonError, RwLock},
};

use futures::future::BoxFuture;
use tokio::sync::OnceCell;

use crate::{
    config::Config,
    error::Error,
    server::{ServerBuilder, TestServer, TestSession},
};

/// Server name used when a test does not ask for a specific one.
pub const DEFAULT_SERVER: &str = "default";

type Configure =
    Arc<dyn Fn(ServerBuilder) -> BoxFuture<'static, Result<ServerBuilder, Error>> + Send + Sync>;

static GLOBAL: OnceLock<ServerManager> = OnceLock::new();

/// Maps logical server names to lazily built, cached [`TestServer`]s.
///
/// Each name is built at most once: the first request runs the registered configuration
/// callback while later requests for the same name wait for it, then every request reuses
/// the same server. Building one name never blocks lookups of another. A callback that
/// fails is not cached, so the next request tries again.
pub struct ServerManager {
    config: Config,
    registrations: RwLock<HashMap<String, Configure>>,
    servers: Mutex<HashMap<String, Arc<OnceCell<Arc<TestServer>>>>>,
}

impl ServerManager {
    /// Create a manager whose servers use the default [`Config`].
    pub fn new() -> Self {
        Self::with_config(Config::default())
    }

    pub fn with_config(config: Config) -> Self {
        Self {
            config,
            registrations: RwLock::new(HashMap::new()),
            servers: Mutex::new(HashMap::new()),
        }
    }

    /// Process-wide manager configured from the environment.
    ///
    /// The environment is read on the first successful call. Invalid values are reported
    /// on every call until they are fixed; nothing is cached in that case.
    ///
    /// # Returns
    /// - `Ok(&ServerManager)` - The shared manager
    /// - `Err(Error::ConfigError)` - A `BULLETPROVE_*` variable holds an invalid value
    pub fn global() -> Result<&'static ServerManager, Error> {
        if let Some(manager) = GLOBAL.get() {
            return Ok(manager);
        }

        let config = Config::from_env()?;

        Ok(GLOBAL.get_or_init(|| ServerManager::with_config(config)))
    }

    /// Register the configuration callback for server `name`.
    ///
    /// The callback receives a [`ServerBuilder`] preloaded with this manager's
    /// configuration and runs once, the first time `name` is requested. Registering a name
    /// again replaces its callback but never rebuilds a server already cached.
    ///
    /// # Example
    ///
    /// ```ignore
    /// manager.register("api", |builder| async move {
    ///     Ok(builder.with_router(app::router()))
    /// });
    /// ```
    pub fn register<F, Fut>(&self, name: impl Into<String>, configure: F)
    where
        F: Fn(ServerBuilder) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<ServerBuilder, Error>> + Send + 'static,
    {
        let callback: Configure = Arc::new(
            move |builder: ServerBuilder| -> BoxFuture<'static, Result<ServerBuilder, Error>> {
                Box::pin(configure(builder))
            },
        );

        self.registrations
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(name.into(), callback);
    }

    pub fn is_registered(&self, name: &str) -> bool {
        self.registrations
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(name)
    }

    /// Names of the servers built so far.
    pub fn running(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .servers()
            .iter()
            .filter(|(_, cell)| cell.initialized())
            .map(|(name, _)| name.clone())
            .collect();
        names.sort();
        names
    }

    /// Return the server registered as `name`, building it on first use.
    ///
    /// # Returns
    /// - `Ok(Arc<TestServer>)` - Cached or newly built server
    /// - `Err(Error::ServerNotRegistered)` - No callback registered for `name`
    /// - `Err(Error)` - The configuration callback or build failed
    pub async fn get_server(&self, name: &str) -> Result<Arc<TestServer>, Error> {
        let cell = Arc::clone(self.servers().entry(name.to_string()).or_default());

        let server = cell
            .get_or_try_init(|| async {
                let configure = self
                    .registrations
                    .read()
                    .unwrap_or_else(PoisonError::into_inner)
                    .get(name)
                    .cloned()
                    .ok_or_else(|| Error::ServerNotRegistered(name.to_string()))?;

                tracing::info!(server = name, "Building test server");

                let builder = ServerBuilder::new(name).with_config(self.config.clone());
                let server = Arc::new(configure(builder).await?.build()?);

                tracing::info!(server = name, "Test server ready");

                Ok::<_, Error>(server)
            })
            .await?;

        Ok(Arc::clone(server))
    }

    fn servers(&self) -> MutexGuard<'_, HashMap<String, Arc<OnceCell<Arc<TestServer>>>>> {
        self.servers.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Open a session for `test_name` on server `name`.
    pub async fn start_session(
        &self,
        name: &str,
        test_name: impl Into<String>,
    ) -> Result<TestSession, Error> {
        let server = self.get_server(name).await?;

        server.start_session(test_name).await
    }
}

impl Default for ServerManager {
    fn default() -> Self {
        Self::new()
    }
}
