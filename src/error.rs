use thiserror::Error;

pub type Result<T> = std::result::Result<T, DijonError>;

#[derive(Debug, Error)]
pub enum DijonError {
    #[error("{name} method or property already defined on class {class}.")]
    NameClash { name: String, class: String },

    #[error("Property '{name}' is not bound on class {class}")]
    PropertyNotFound { name: String, class: String },

    #[error("Failed to downcast dependency '{name}' to {type_name}")]
    DowncastFailed { name: String, type_name: String },

    #[error("Cannot mutate frozen dependency of type {type_name}")]
    Frozen { type_name: String },
}

impl DijonError {
    pub(crate) fn name_clash(name: impl Into<String>, class: impl Into<String>) -> Self {
        Self::NameClash {
            name: name.into(),
            class: class.into(),
        }
    }

    pub(crate) fn property_not_found(name: impl Into<String>, class: impl Into<String>) -> Self {
        Self::PropertyNotFound {
            name: name.into(),
            class: class.into(),
        }
    }

    pub(crate) fn downcast_failed<T>(name: impl Into<String>) -> Self {
        Self::DowncastFailed {
            name: name.into(),
            type_name: std::any::type_name::<T>().to_string(),
        }
    }

    /// Returns true for the configuration clash raised at binding time.
    pub fn is_name_clash(&self) -> bool {
        matches!(self, Self::NameClash { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_name_clash_message_mentions_name_and_class() {
        let err = DijonError::name_clash("x", "A");
        assert!(err.is_name_clash());
        assert_eq!(err.to_string(), "x method or property already defined on class A.");
    }

    #[test]
    fn test_downcast_message_names_type() {
        let err = DijonError::downcast_failed::<String>("logger");
        assert!(err.to_string().contains("alloc::string::String"));
        assert!(!err.is_name_clash());
    }
}
