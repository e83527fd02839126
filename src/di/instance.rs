use crate::error::{DijonError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Options applied when a dependency instance is created.
///
/// ```
/// use dijon::BindOptions;
///
/// let options: BindOptions = serde_json::from_str(r#"{ "freeze": true }"#).unwrap();
/// assert!(options.freeze);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BindOptions {
    /// Reject every write to the instance once it is bound.
    pub freeze: bool,
}

impl BindOptions {
    pub fn frozen() -> Self {
        Self { freeze: true }
    }
}

/// A shared handle to a bound dependency.
///
/// The value is constructed once per binding site; every clone of the handle
/// points at the same value. Frozen handles refuse writes.
pub struct Instance<T: ?Sized> {
    inner: Arc<RwLock<T>>,
    frozen: bool,
}

impl<T: Send + Sync + 'static> Instance<T> {
    pub fn new(value: T) -> Self {
        Self::with_options(value, BindOptions::default())
    }

    pub fn frozen(value: T) -> Self {
        Self::with_options(value, BindOptions::frozen())
    }

    pub fn with_options(value: T, options: BindOptions) -> Self {
        Self {
            inner: Arc::new(RwLock::new(value)),
            frozen: options.freeze,
        }
    }
}

impl<T: ?Sized> Instance<T> {
    pub fn is_frozen(&self) -> bool {
        self.frozen
    }

    pub fn read(&self) -> RwLockReadGuard<'_, T> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    /// Borrow the value mutably.
    ///
    /// # Errors
    /// Returns [`DijonError::Frozen`] if the instance was bound frozen.
    pub fn write(&self) -> Result<RwLockWriteGuard<'_, T>> {
        if self.frozen {
            return Err(DijonError::Frozen {
                type_name: std::any::type_name::<T>().to_string(),
            });
        }
        Ok(self.inner.write().unwrap_or_else(PoisonError::into_inner))
    }

    /// Identity comparison: true when both handles come from the same binding.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl<T: ?Sized> Clone for Instance<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
            frozen: self.frozen,
        }
    }
}

impl<T: ?Sized + fmt::Debug> fmt::Debug for Instance<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Instance")
            .field("value", &&*self.read())
            .field("frozen", &self.frozen)
            .finish()
    }
}
