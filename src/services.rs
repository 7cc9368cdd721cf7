//! Type-keyed service container.
//!
//! A [`ServiceCollection`] is filled while a test server is configured and frozen into
//! [`Services`] when the server is built. Every session then resolves through its own
//! [`ServiceScope`], which lazily creates scoped services once per session and falls back
//! to the root container for everything else.
//!
//! Services are keyed by type, including unsized trait objects, so hook traits such as
//! `dyn BeforeTest` can hold any number of registrations which resolve in registration order.

use std::{
    any::{type_name, Any, TypeId},
    collections::HashMap,
    sync::{Arc, Mutex, PoisonError},
};

use crate::error::Error;

type Instance = Arc<dyn Any + Send + Sync>;
type ScopedFactory = Arc<dyn Fn(&Services) -> Instance + Send + Sync>;

/// Mutable registration list used while configuring a test server.
#[derive(Default)]
pub struct ServiceCollection {
    instances: HashMap<TypeId, Vec<Instance>>,
    scoped: HashMap<TypeId, ScopedFactory>,
}

impl ServiceCollection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an instance under the type key `T`.
    ///
    /// `T` may be a trait object, in which case several implementations can be registered
    /// under the same key and are resolved in the order they were added.
    pub fn add<T>(&mut self, value: Arc<T>) -> &mut Self
    where
        T: ?Sized + Send + Sync + 'static,
    {
        self.instances
            .entry(TypeId::of::<T>())
            .or_default()
            .push(Arc::new(value));
        self
    }

    /// Register a factory producing one instance of `T` per session scope.
    ///
    /// Registering a second factory for the same type replaces the first.
    pub fn add_scoped<T, F>(&mut self, create: F) -> &mut Self
    where
        T: Send + Sync + 'static,
        F: Fn(&Services) -> T + Send + Sync + 'static,
    {
        let factory: ScopedFactory = Arc::new(move |services: &Services| -> Instance {
            Arc::new(Arc::new(create(services)))
        });
        self.scoped.insert(TypeId::of::<T>(), factory);
        self
    }

    /// Freeze the collection into a clonable container.
    pub fn build(self) -> Services {
        Services {
            inner: Arc::new(ServicesRef {
                instances: self.instances,
                scoped: self.scoped,
            }),
        }
    }
}

struct ServicesRef {
    instances: HashMap<TypeId, Vec<Instance>>,
    scoped: HashMap<TypeId, ScopedFactory>,
}

/// Root service container of a test server.
///
/// Cloning is cheap; all clones share the same registrations.
#[derive(Clone)]
pub struct Services {
    inner: Arc<ServicesRef>,
}

impl Services {
    /// Resolve every instance registered under `T`, in registration order.
    pub fn get_all<T>(&self) -> Vec<Arc<T>>
    where
        T: ?Sized + Send + Sync + 'static,
    {
        self.inner
            .instances
            .get(&TypeId::of::<T>())
            .map(|instances| instances.iter().filter_map(downcast::<T>).collect())
            .unwrap_or_default()
    }

    /// Resolve the most recently registered instance of `T`.
    pub fn get<T>(&self) -> Option<Arc<T>>
    where
        T: ?Sized + Send + Sync + 'static,
    {
        self.inner
            .instances
            .get(&TypeId::of::<T>())
            .and_then(|instances| instances.last())
            .and_then(downcast::<T>)
    }

    /// Resolve `T` or fail with [`Error::ServiceNotRegistered`].
    pub fn require<T>(&self) -> Result<Arc<T>, Error>
    where
        T: ?Sized + Send + Sync + 'static,
    {
        self.get::<T>()
            .ok_or(Error::ServiceNotRegistered(type_name::<T>()))
    }

    /// Open a new resolution scope over this container.
    pub fn create_scope(&self) -> ServiceScope {
        ServiceScope {
            root: self.clone(),
            instances: Arc::new(Mutex::new(HashMap::new())),
        }
    }
}

/// One session's resolution scope.
#[derive(Clone)]
pub struct ServiceScope {
    root: Services,
    instances: Arc<Mutex<HashMap<TypeId, Instance>>>,
}

impl ServiceScope {
    /// Resolve `T`, creating the scoped instance on first use.
    ///
    /// Types without a scoped factory resolve from the root container.
    pub fn get<T>(&self) -> Option<Arc<T>>
    where
        T: Send + Sync + 'static,
    {
        let key = TypeId::of::<T>();

        let Some(factory) = self.root.inner.scoped.get(&key) else {
            return self.root.get::<T>();
        };

        let instance = {
            let mut instances = self.instances.lock().unwrap_or_else(PoisonError::into_inner);
            instances
                .entry(key)
                .or_insert_with(|| factory(&self.root))
                .clone()
        };

        downcast::<T>(&instance)
    }

    /// Resolve `T` or fail with [`Error::ServiceNotRegistered`].
    pub fn require<T>(&self) -> Result<Arc<T>, Error>
    where
        T: Send + Sync + 'static,
    {
        self.get::<T>()
            .ok_or(Error::ServiceNotRegistered(type_name::<T>()))
    }

    /// The root container this scope resolves through.
    pub fn root(&self) -> &Services {
        &self.root
    }
}

fn downcast<T>(instance: &Instance) -> Option<Arc<T>>
where
    T: ?Sized + Send + Sync + 'static,
{
    instance.downcast_ref::<Arc<T>>().cloned()
}
