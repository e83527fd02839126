use crate::di::middleware::Middleware;
use crate::di::{BindOptions, Bindings, Instance, Target};
use crate::error::{DijonError, Result};
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::sync::Arc;

/// Central registry of class-level bindings.
///
/// Each target type gets one entry holding its bound properties, its
/// class-level middleware (in registration order) and its method-level
/// middleware. Nothing is stored on the target types themselves.
///
/// # Example
/// ```
/// use dijon::{Registry, Target};
///
/// struct ConsoleLogger;
/// struct Service;
/// impl Target for Service {}
///
/// let registry = Registry::new();
/// registry.inject::<Service, _, _>("logger", || ConsoleLogger).unwrap();
///
/// let first = registry.property::<Service, ConsoleLogger>("logger").unwrap();
/// let second = registry.property::<Service, ConsoleLogger>("logger").unwrap();
/// assert!(first.ptr_eq(&second));
/// ```
pub struct Registry {
    classes: DashMap<TypeId, ClassEntry>,
}

struct ClassEntry {
    class_name: &'static str,
    properties: HashMap<String, Property>,
    middleware: Vec<Middleware>,
    method_middleware: HashMap<String, HashMap<String, Middleware>>,
}

impl ClassEntry {
    fn new<C: Target>() -> Self {
        Self {
            class_name: C::class_name(),
            properties: HashMap::new(),
            middleware: Vec::new(),
            method_middleware: HashMap::new(),
        }
    }
}

struct Property {
    instance: Arc<dyn Any + Send + Sync>,
}

impl Registry {
    pub fn new() -> Self {
        Self {
            classes: DashMap::new(),
        }
    }

    /// Bind a mutable dependency as a read-only property of `C`.
    ///
    /// # Errors
    /// Returns [`DijonError::NameClash`] if `C` already has a member or property
    /// named `name`. The registry is left untouched in that case.
    pub fn inject<C, D, F>(&self, name: &str, construct: F) -> Result<()>
    where
        C: Target,
        D: Send + Sync + 'static,
        F: FnOnce() -> D,
    {
        self.inject_with::<C, D, F>(name, construct, BindOptions::default())
    }

    /// Same as [`Registry::inject`], but the instance rejects writes.
    pub fn frozen_inject<C, D, F>(&self, name: &str, construct: F) -> Result<()>
    where
        C: Target,
        D: Send + Sync + 'static,
        F: FnOnce() -> D,
    {
        self.inject_with::<C, D, F>(name, construct, BindOptions::frozen())
    }

    pub fn inject_with<C, D, F>(&self, name: &str, construct: F, options: BindOptions) -> Result<()>
    where
        C: Target,
        D: Send + Sync + 'static,
        F: FnOnce() -> D,
    {
        if C::members().contains(&name) || self.contains::<C>(name) {
            return Err(DijonError::name_clash(name, C::class_name()));
        }

        // No shard lock is held while constructing: the constructor may use this registry.
        let property = Self::construct(construct, options);

        match self.classes.entry(TypeId::of::<C>()) {
            Entry::Occupied(mut occupied) => {
                let entry = occupied.get_mut();
                if entry.properties.contains_key(name) {
                    return Err(DijonError::name_clash(name, entry.class_name));
                }
                entry.properties.insert(name.to_string(), property);
            }
            Entry::Vacant(vacant) => {
                let mut entry = ClassEntry::new::<C>();
                entry.properties.insert(name.to_string(), property);
                vacant.insert(entry);
            }
        }

        tracing::debug!(
            "Bound '{}' ({}) on {}{}",
            name,
            std::any::type_name::<D>(),
            C::class_name(),
            if options.freeze { " [frozen]" } else { "" }
        );
        Ok(())
    }

    fn construct<D, F>(construct: F, options: BindOptions) -> Property
    where
        D: Send + Sync + 'static,
        F: FnOnce() -> D,
    {
        Property {
            instance: Arc::new(Instance::with_options(construct(), options)),
        }
    }

    /// Read the dependency bound as `name` on `C`.
    ///
    /// Every class-level middleware registered for `name` runs, in
    /// registration order, before the instance is returned. The same instance
    /// is returned on every read.
    ///
    /// # Errors
    /// Returns an error if nothing is bound under `name` or if it is not a `D`.
    pub fn property<C, D>(&self, name: &str) -> Result<Instance<D>>
    where
        C: Target,
        D: Send + Sync + 'static,
    {
        let (instance, middleware) = {
            let entry = self
                .classes
                .get(&TypeId::of::<C>())
                .ok_or_else(|| DijonError::property_not_found(name, C::class_name()))?;
            let property = entry
                .properties
                .get(name)
                .ok_or_else(|| DijonError::property_not_found(name, entry.class_name))?;
            let instance = property
                .instance
                .downcast_ref::<Instance<D>>()
                .ok_or_else(|| DijonError::downcast_failed::<D>(name))?
                .clone();
            let middleware: Vec<Middleware> = entry
                .middleware
                .iter()
                .filter(|m| m.dependency_name() == name)
                .cloned()
                .collect();
            (instance, middleware)
        };

        tracing::trace!(
            "Reading '{}' on {} ({} middleware)",
            name,
            C::class_name(),
            middleware.len()
        );
        for m in &middleware {
            if !m.call(&instance) {
                tracing::warn!(
                    "Skipping middleware for '{}' on {}: callback expects a different type than {}",
                    name,
                    C::class_name(),
                    std::any::type_name::<D>()
                );
            }
        }

        Ok(instance)
    }

    /// Register a callback fired on every read of the class-level dependency `name`.
    pub fn middleware<C, D, F>(&self, name: &str, callback: F) -> &Self
    where
        C: Target,
        D: Send + Sync + 'static,
        F: Fn(&Instance<D>) + Send + Sync + 'static,
    {
        self.classes
            .entry(TypeId::of::<C>())
            .or_insert_with(ClassEntry::new::<C>)
            .middleware
            .push(Middleware::new(name, callback));
        tracing::debug!("Registered middleware for '{}' on {}", name, C::class_name());
        self
    }

    /// Register a method-level callback for `name` on `C::method`.
    ///
    /// A later registration for the same method and name replaces the earlier
    /// one. Method-level middleware is recorded only; no read path invokes it.
    pub fn method_middleware<C, D, F>(&self, method: &str, name: &str, callback: F) -> &Self
    where
        C: Target,
        D: Send + Sync + 'static,
        F: Fn(&Instance<D>) + Send + Sync + 'static,
    {
        self.classes
            .entry(TypeId::of::<C>())
            .or_insert_with(ClassEntry::new::<C>)
            .method_middleware
            .entry(method.to_string())
            .or_default()
            .insert(name.to_string(), Middleware::new(name, callback));
        tracing::debug!(
            "Registered method middleware for '{}' on {}::{}",
            name,
            C::class_name(),
            method
        );
        self
    }

    /// Dependency names with method-level middleware recorded on `C::method`, sorted.
    pub fn method_middleware_names<C: Target>(&self, method: &str) -> Vec<String> {
        let mut names: Vec<String> = self
            .classes
            .get(&TypeId::of::<C>())
            .and_then(|entry| {
                entry
                    .method_middleware
                    .get(method)
                    .map(|m| m.keys().cloned().collect())
            })
            .unwrap_or_default();
        names.sort();
        names
    }

    /// Apply the bindings generated for `C` by the struct attributes.
    pub fn bind<C: Bindings>(&self) -> Result<()> {
        tracing::debug!("Applying bindings for {}", C::class_name());
        C::bind(self).inspect_err(|e| {
            tracing::error!("Binding {} failed: {}", C::class_name(), e);
        })
    }

    /// Run `f` once with this registry and return its result.
    ///
    /// The registry exposes `inject`, `frozen_inject`, `middleware` and
    /// `injector`, so `f` can configure several targets in one place.
    pub fn injector<R, F>(&self, f: F) -> R
    where
        F: FnOnce(&Self) -> R,
    {
        f(self)
    }

    pub fn contains<C: Target>(&self, name: &str) -> bool {
        self.classes
            .get(&TypeId::of::<C>())
            .is_some_and(|entry| entry.properties.contains_key(name))
    }

    /// Number of targets with an entry.
    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    struct ConsoleLogger {
        prefix: String,
    }

    struct Service;
    impl Target for Service {}

    struct A;
    impl Target for A {
        fn members() -> &'static [&'static str] {
            &["x"]
        }
    }

    struct Foo;

    #[test]
    fn test_property_returns_the_same_instance() {
        let registry = Registry::new();
        registry
            .inject::<Service, _, _>("logger", || ConsoleLogger {
                prefix: "svc".to_string(),
            })
            .unwrap();

        let first = registry.property::<Service, ConsoleLogger>("logger").unwrap();
        let second = registry.property::<Service, ConsoleLogger>("logger").unwrap();
        assert!(first.ptr_eq(&second));
        assert_eq!(first.read().prefix, "svc");
        assert!(registry.contains::<Service>("logger"));
    }

    #[test]
    fn test_clash_with_declared_member_leaves_registry_untouched() {
        let registry = Registry::new();
        let err = registry.inject::<A, _, _>("x", || Foo).unwrap_err();

        assert!(err.is_name_clash());
        let message = err.to_string();
        assert!(message.contains("x"));
        assert!(message.contains("A"));
        assert!(registry.is_empty());
    }

    #[test]
    fn test_rebinding_same_name_clashes() {
        let registry = Registry::new();
        registry.inject::<Service, _, _>("n", || 1u32).unwrap();

        let constructed = Mutex::new(false);
        let err = registry
            .inject::<Service, _, _>("n", || {
                *constructed.lock().unwrap() = true;
                2u32
            })
            .unwrap_err();

        assert!(err.is_name_clash());
        assert!(!*constructed.lock().unwrap());
        assert_eq!(*registry.property::<Service, u32>("n").unwrap().read(), 1);
    }

    #[test]
    fn test_frozen_inject_rejects_mutation() {
        let registry = Registry::new();
        registry
            .frozen_inject::<Service, _, _>("config", || vec![1, 2, 3])
            .unwrap();

        let config = registry.property::<Service, Vec<i32>>("config").unwrap();
        assert!(config.write().is_err());
        assert_eq!(*config.read(), vec![1, 2, 3]);
    }

    #[test]
    fn test_middleware_runs_in_registration_order_on_every_read() {
        let registry = Registry::new();
        let calls = Arc::new(Mutex::new(Vec::new()));

        for tag in ["first", "second", "third"] {
            let calls = calls.clone();
            registry.middleware::<Service, u32, _>("n", move |_| {
                calls.lock().unwrap().push(tag);
            });
        }
        registry.inject::<Service, _, _>("n", || 7u32).unwrap();

        registry.property::<Service, u32>("n").unwrap();
        assert_eq!(*calls.lock().unwrap(), vec!["first", "second", "third"]);

        registry.property::<Service, u32>("n").unwrap();
        assert_eq!(calls.lock().unwrap().len(), 6);
    }

    #[test]
    fn test_middleware_receives_the_bound_instance() {
        let registry = Registry::new();
        let seen: Arc<Mutex<Option<Instance<u32>>>> = Arc::new(Mutex::new(None));
        let sink = seen.clone();
        registry.middleware::<Service, u32, _>("n", move |instance| {
            *sink.lock().unwrap() = Some(instance.clone());
        });
        registry.inject::<Service, _, _>("n", || 7u32).unwrap();

        let read = registry.property::<Service, u32>("n").unwrap();
        let seen = seen.lock().unwrap().clone().unwrap();
        assert!(seen.ptr_eq(&read));
    }

    #[test]
    fn test_middleware_for_other_names_does_not_fire() {
        let registry = Registry::new();
        let calls = Arc::new(Mutex::new(0));
        let counter = calls.clone();
        registry.middleware::<Service, u32, _>("other", move |_| {
            *counter.lock().unwrap() += 1;
        });
        registry.inject::<Service, _, _>("n", || 7u32).unwrap();

        registry.property::<Service, u32>("n").unwrap();
        assert_eq!(*calls.lock().unwrap(), 0);
    }

    #[test]
    fn test_middleware_may_read_the_registry() {
        let registry = Arc::new(Registry::new());
        let inner = registry.clone();
        let seen = Arc::new(Mutex::new(0u32));
        let sink = seen.clone();
        registry.inject::<Service, _, _>("base", || 40u32).unwrap();
        registry.middleware::<Service, u32, _>("n", move |_| {
            *sink.lock().unwrap() = *inner.property::<Service, u32>("base").unwrap().read();
        });
        registry.inject::<Service, _, _>("n", || 2u32).unwrap();

        registry.property::<Service, u32>("n").unwrap();
        assert_eq!(*seen.lock().unwrap(), 40);
    }

    #[test]
    fn test_constructor_may_read_the_registry() {
        let registry = Registry::new();
        registry.inject::<Service, _, _>("base", || 40u32).unwrap();
        registry
            .inject::<Service, _, _>("derived", || {
                *registry.property::<Service, u32>("base").unwrap().read() + 2
            })
            .unwrap();

        assert_eq!(*registry.property::<Service, u32>("derived").unwrap().read(), 42);
    }

    #[test]
    fn test_constructor_may_bind_other_dependencies() {
        let registry = Registry::new();
        registry
            .inject::<Service, _, _>("outer", || {
                registry.inject::<Service, _, _>("inner", || 1u32).unwrap();
                2u32
            })
            .unwrap();

        assert!(registry.contains::<Service>("inner"));
        assert!(registry.contains::<Service>("outer"));
    }

    #[test]
    fn test_constructor_binding_the_same_name_still_clashes() {
        let registry = Registry::new();
        let err = registry
            .inject::<Service, _, _>("n", || {
                registry.inject::<Service, _, _>("n", || 1u32).unwrap();
                2u32
            })
            .unwrap_err();

        assert!(err.is_name_clash());
        assert_eq!(*registry.property::<Service, u32>("n").unwrap().read(), 1);
    }

    #[test]
    fn test_mismatched_middleware_is_skipped() {
        let registry = Registry::new();
        let calls = Arc::new(Mutex::new(0));
        let counter = calls.clone();
        registry.middleware::<Service, String, _>("n", move |_| {
            *counter.lock().unwrap() += 1;
        });
        registry.inject::<Service, _, _>("n", || 7u32).unwrap();

        let n = registry.property::<Service, u32>("n").unwrap();
        assert_eq!(*n.read(), 7);
        assert_eq!(*calls.lock().unwrap(), 0);
    }

    #[test]
    fn test_property_errors() {
        let registry = Registry::new();
        assert!(matches!(
            registry.property::<Service, u32>("n"),
            Err(DijonError::PropertyNotFound { .. })
        ));

        registry.inject::<Service, _, _>("n", || 7u32).unwrap();
        assert!(matches!(
            registry.property::<Service, String>("n"),
            Err(DijonError::DowncastFailed { .. })
        ));
    }

    #[test]
    fn test_method_middleware_replaces_by_name() {
        let registry = Registry::new();
        registry.method_middleware::<Service, u32, _>("run", "n", |_| {});
        registry.method_middleware::<Service, u32, _>("run", "n", |_| {});
        registry.method_middleware::<Service, String, _>("run", "label", |_| {});

        assert_eq!(
            registry.method_middleware_names::<Service>("run"),
            vec!["label".to_string(), "n".to_string()]
        );
        assert!(registry.method_middleware_names::<Service>("stop").is_empty());
    }

    #[test]
    fn test_injector_runs_once_with_the_registry() {
        let registry = Registry::new();
        let mut runs = 0;
        let result = registry.injector(|di| {
            runs += 1;
            di.inject::<Service, _, _>("n", || 1u32)?;
            di.frozen_inject::<Service, _, _>("m", || 2u32)?;
            di.injector(|nested| nested.contains::<Service>("m"));
            Ok::<_, DijonError>(di.len())
        });

        assert_eq!(runs, 1);
        assert_eq!(result.unwrap(), 1);
    }
}
