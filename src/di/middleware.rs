use crate::di::Instance;
use std::any::Any;
use std::sync::Arc;

type ErasedCallback = Arc<dyn Fn(&(dyn Any + Send + Sync)) -> bool + Send + Sync>;

/// A `(dependency name, callback)` pair.
///
/// The callback is stored type-erased; it only fires for instances of the
/// type it was registered with.
#[derive(Clone)]
pub(crate) struct Middleware {
    dependency_name: String,
    callback: ErasedCallback,
}

impl Middleware {
    pub(crate) fn new<D, F>(dependency_name: impl Into<String>, callback: F) -> Self
    where
        D: Send + Sync + 'static,
        F: Fn(&Instance<D>) + Send + Sync + 'static,
    {
        let callback: ErasedCallback = Arc::new(move |instance: &(dyn Any + Send + Sync)| {
            match instance.downcast_ref::<Instance<D>>() {
                Some(instance) => {
                    callback(instance);
                    true
                }
                None => false,
            }
        });
        Self {
            dependency_name: dependency_name.into(),
            callback,
        }
    }

    pub(crate) fn dependency_name(&self) -> &str {
        &self.dependency_name
    }

    /// Run the callback against an erased `Instance<D>`. Returns false when the
    /// instance type does not match the one the callback expects.
    pub(crate) fn call(&self, instance: &(dyn Any + Send + Sync)) -> bool {
        (self.callback)(instance)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_call_matches_on_instance_type() {
        let seen = Arc::new(AtomicUsize::new(0));
        let counter = seen.clone();
        let middleware = Middleware::new("n", move |n: &Instance<u32>| {
            counter.fetch_add(*n.read() as usize, Ordering::SeqCst);
        });

        assert_eq!(middleware.dependency_name(), "n");
        assert!(middleware.call(&Instance::new(5u32)));
        assert!(!middleware.call(&Instance::new("five")));
        assert_eq!(seen.load(Ordering::SeqCst), 5);
    }
}
