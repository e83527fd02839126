use crate::di::{BindOptions, Instance};
use dashmap::DashMap;
use std::any::Any;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

/// Per-receiver storage for invocation-scoped dependencies.
///
/// Slots are pushed by [`MethodInjector::enter`] and removed when the
/// returned [`ContextGuard`] drops. Slots for the same name stack, so a
/// nested call shadows the outer binding and restores it on exit.
#[derive(Default)]
pub struct Context {
    slots: DashMap<String, Vec<Slot>>,
    next_token: AtomicU64,
}

struct Slot {
    token: u64,
    value: Arc<dyn Any + Send + Sync>,
}

impl Context {
    pub fn new() -> Self {
        Self::default()
    }

    /// Expose `instance` under `name` until the guard is dropped.
    pub fn enter<D: Send + Sync + 'static>(&self, name: &str, instance: Instance<D>) -> ContextGuard<'_> {
        let token = self.next_token.fetch_add(1, Ordering::Relaxed);
        self.slots.entry(name.to_string()).or_default().push(Slot {
            token,
            value: Arc::new(instance),
        });
        tracing::trace!("Entered '{}' (slot {})", name, token);
        ContextGuard {
            context: self,
            name: name.to_string(),
            token,
        }
    }

    /// The innermost binding for `name`, if one is active and is a `D`.
    pub fn get<D: Send + Sync + 'static>(&self, name: &str) -> Option<Instance<D>> {
        let slots = self.slots.get(name)?;
        slots.last()?.value.downcast_ref::<Instance<D>>().cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.slots.contains_key(name)
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    fn leave(&self, name: &str, token: u64) {
        if let Some(mut slots) = self.slots.get_mut(name) {
            slots.retain(|slot| slot.token != token);
        }
        self.slots.remove_if(name, |_, slots| slots.is_empty());
        tracing::trace!("Left '{}' (slot {})", name, token);
    }
}

/// Removes its slot from the [`Context`] when dropped, including during unwinding.
#[must_use = "the dependency is removed as soon as the guard is dropped"]
pub struct ContextGuard<'a> {
    context: &'a Context,
    name: String,
    token: u64,
}

impl Drop for ContextGuard<'_> {
    fn drop(&mut self) {
        self.context.leave(&self.name, self.token);
    }
}

/// Implemented by receivers of method-level injection.
pub trait HasContext {
    fn context(&self) -> &Context;
}

/// A method-level injection site: one dependency instance, exposed on the
/// receiver's [`Context`] for the duration of each call.
///
/// # Example
/// ```
/// use dijon::{Context, HasContext, MethodInjector};
///
/// struct Greeter {
///     ctx: Context,
/// }
///
/// impl HasContext for Greeter {
///     fn context(&self) -> &Context {
///         &self.ctx
///     }
/// }
///
/// let site = MethodInjector::new("greeting", || String::from("hello"));
/// let greeter = Greeter { ctx: Context::new() };
///
/// let out = site.invoke(&greeter, |g| {
///     let greeting = g.context().get::<String>("greeting").unwrap();
///     format!("{} world", greeting.read())
/// });
/// assert_eq!(out, "hello world");
/// assert!(!greeter.context().contains("greeting"));
/// ```
pub struct MethodInjector<D> {
    name: &'static str,
    instance: Instance<D>,
}

impl<D: Send + Sync + 'static> MethodInjector<D> {
    pub fn new<F: FnOnce() -> D>(name: &'static str, construct: F) -> Self {
        Self::with_options(name, construct, BindOptions::default())
    }

    pub fn frozen<F: FnOnce() -> D>(name: &'static str, construct: F) -> Self {
        Self::with_options(name, construct, BindOptions::frozen())
    }

    pub fn with_options<F: FnOnce() -> D>(name: &'static str, construct: F, options: BindOptions) -> Self {
        tracing::debug!(
            "Bound method-level '{}' ({}){}",
            name,
            std::any::type_name::<D>(),
            if options.freeze { " [frozen]" } else { "" }
        );
        Self {
            name,
            instance: Instance::with_options(construct(), options),
        }
    }

    pub fn instance(&self) -> &Instance<D> {
        &self.instance
    }

    /// Expose the dependency on `receiver` until the guard is dropped.
    pub fn enter<'r, R: HasContext + ?Sized>(&self, receiver: &'r R) -> ContextGuard<'r> {
        receiver.context().enter(self.name, self.instance.clone())
    }

    /// Call `f` with the dependency exposed on `receiver`, returning what `f` returns.
    pub fn invoke<R, T, F>(&self, receiver: &R, f: F) -> T
    where
        R: HasContext + ?Sized,
        F: FnOnce(&R) -> T,
    {
        let _guard = self.enter(receiver);
        f(receiver)
    }
}
