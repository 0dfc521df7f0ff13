//! Configuration access port trait.

/// Raw INI-style lookups. Typing and range checks happen in
/// [`crate::domain::config_validation`] so every adapter rejects bad values
/// the same way.
pub trait ConfigPort {
    /// The value of `key` in `section`, or `None` when either is absent.
    fn get_string(&self, section: &str, key: &str) -> Option<String>;
}
