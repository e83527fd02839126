use crate::di::{Instance, Registry};
use crate::error::Result;

/// A type that dependencies can be bound to.
///
/// This is usually implemented by `#[derive(Target)]` or by the struct form of
/// `#[inject]`.
///
/// # Example
/// ```
/// use dijon::Target;
///
/// #[derive(Target)]
/// #[target(members(render))]
/// pub struct Page;
///
/// assert_eq!(<Page as dijon::Target>::class_name(), "Page");
/// assert_eq!(<Page as dijon::Target>::members(), &["render"]);
/// ```
pub trait Target: 'static {
    /// Name used in error messages and logs.
    fn class_name() -> &'static str {
        let full = std::any::type_name::<Self>();
        full.rsplit("::").next().unwrap_or(full)
    }

    /// Members the type already declares. Binding a dependency under one of
    /// these names is a clash.
    fn members() -> &'static [&'static str] {
        &[]
    }
}

/// Class-level bindings generated by the struct attributes.
pub trait Bindings: Target + Sized {
    /// Apply every binding and middleware registration for this type.
    ///
    /// # Errors
    /// Returns an error if any dependency name clashes with an existing member.
    fn bind(registry: &Registry) -> Result<()>;
}

/// Implemented by receivers that can reach the registry their class was bound in.
pub trait HasRegistry: Target + Sized {
    fn registry(&self) -> &Registry;

    /// Read a class-level dependency through this receiver.
    ///
    /// # Errors
    /// Returns an error if no dependency named `name` of type `D` is bound on `Self`.
    fn dependency<D: Send + Sync + 'static>(&self, name: &str) -> Result<Instance<D>> {
        self.registry().property::<Self, D>(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Plain;
    impl Target for Plain {}

    #[test]
    fn test_default_class_name_strips_module_path() {
        assert_eq!(Plain::class_name(), "Plain");
        assert!(Plain::members().is_empty());
    }
}
