//! Key taxonomy derived from the spelling of a key.

/// Classification of a document or schema key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyKind {
    /// Uppercase first letter, no trailing `s`: a single nested object.
    Object,
    /// Uppercase first letter with a trailing `s`: a collection of objects.
    ///
    /// Collections are recognized but never descended into.
    Collection,
    /// Anything else: a scalar or array-valued attribute.
    Attribute,
}

impl KeyKind {
    /// Classify a key by its first character and suffix.
    pub fn classify(key: &str) -> Self {
        match key.chars().next() {
            Some(first) if first.is_uppercase() => {
                if key.ends_with('s') {
                    Self::Collection
                } else {
                    Self::Object
                }
            }
            _ => Self::Attribute,
        }
    }

    pub fn is_object(key: &str) -> bool {
        Self::classify(key) == Self::Object
    }

    pub fn is_attribute(key: &str) -> bool {
        Self::classify(key) == Self::Attribute
    }
}
