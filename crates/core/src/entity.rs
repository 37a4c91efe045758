//! Entity capabilities: identity and self-validation.
//!
//! An entity type implements each trait on its own; there is no common base.

use crate::error::ValidationError;

/// Entity marker + minimal interface.
pub trait Entity {
    /// Strongly-typed entity identifier.
    type Id: Clone + Eq + core::hash::Hash + core::fmt::Debug;

    /// Returns the entity identifier.
    fn id(&self) -> &Self::Id;
}

/// Self-validation hook, run before an entity is handed to persistence.
///
/// Implementations own their rule set. Validation must be pure: it inspects
/// field values only and never consults a clock, a store or the network.
pub trait Validate {
    fn validate(&self) -> Result<(), ValidationError>;

    /// Convenience predicate over [`Validate::validate`].
    fn is_valid(&self) -> bool {
        self.validate().is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Named(String);

    impl Validate for Named {
        fn validate(&self) -> Result<(), ValidationError> {
            if self.0.is_empty() {
                return Err(ValidationError::missing("name"));
            }
            Ok(())
        }
    }

    #[test]
    fn is_valid_follows_validate() {
        assert!(Named("alice".into()).is_valid());
        assert!(!Named(String::new()).is_valid());
    }
}
