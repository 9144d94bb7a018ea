//! Declaration-time errors.
//!
//! Only class definition and helper registration can fail. Resolution misses,
//! unknown section names, and unresolved child placeholders are deliberate
//! no-ops (see the module docs on `args` and `element::compose`), so nothing
//! at render time produces an error from this crate.

/// Errors raised while declaring a component class or registering helpers.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DeclarationError {
    /// An argument/option spec was declared with a name that is not a plain
    /// identifier.
    #[error("invalid spec name: {name:?}")]
    InvalidSpecName { name: String },

    /// A section was declared with a name that is not a plain identifier.
    #[error("invalid section name: {name:?}")]
    InvalidSectionName { name: String },

    /// `default_tag` was given a name that cannot be a tag.
    #[error("invalid tag name: {name:?}")]
    InvalidTagName { name: String },

    /// A child helper was declared with an invalid name.
    #[error("invalid child helper name: {name:?}")]
    InvalidChildName { name: String },

    /// A helper was registered under a name that is not a plain identifier.
    #[error("invalid helper name: {name:?}")]
    InvalidHelperName { name: String },

    /// A helper with this name is already registered.
    #[error("helper already registered: {name:?}")]
    HelperExists { name: String },
}

// ===========================================================================
// Tests
// ===========================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_messages() {
        let err = DeclarationError::InvalidSpecName {
            name: "bad name".to_owned(),
        };
        assert_eq!(err.to_string(), "invalid spec name: \"bad name\"");

        let err = DeclarationError::HelperExists {
            name: "icon".to_owned(),
        };
        assert_eq!(err.to_string(), "helper already registered: \"icon\"");
    }
}
