//! Which parse path produced a result.

/// Outcome of a translation that has a primary path and a permissive fallback.
#[derive(Debug, Clone, PartialEq)]
pub enum Translation<T> {
    /// The primary parser accepted the input.
    Parsed(T),
    /// The primary parser rejected the input; the value came from the fallback.
    Fallback(T),
    /// Neither path produced a usable value.
    Unsupported(String),
}

impl<T> Translation<T> {
    pub fn is_parsed(&self) -> bool {
        matches!(self, Translation::Parsed(_))
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, Translation::Fallback(_))
    }

    /// The translated value, if any.
    pub fn into_value(self) -> Option<T> {
        match self {
            Translation::Parsed(value) | Translation::Fallback(value) => Some(value),
            Translation::Unsupported(_) => None,
        }
    }

    pub fn value(&self) -> Option<&T> {
        match self {
            Translation::Parsed(value) | Translation::Fallback(value) => Some(value),
            Translation::Unsupported(_) => None,
        }
    }
}
