use crate::error::Result;

/// Raw string key-value persistence.
///
/// This trait handles the "how" of flat storage (files on disk vs memory),
/// while `FlatStore` and the migration controller handle the "what"
/// (the creations array blob, the credential key).
///
/// Methods take `&self`; implementations handle their own mutability.
pub trait KeyValueBackend {
    /// Read the value stored under `key`.
    /// Returns Ok(None) when the key has never been written or was removed.
    fn get_item(&self, key: &str) -> Result<Option<String>>;

    /// Store `value` under `key`, replacing any previous value.
    /// MUST be atomic (e.g. write to tmp then rename) to avoid partial writes.
    fn set_item(&self, key: &str, value: &str) -> Result<()>;

    /// Remove `key`. Removing an absent key is not an error.
    fn remove_item(&self, key: &str) -> Result<()>;
}

/// Lets tests keep a handle on a backend they hand to a migration controller.
#[cfg(test)]
impl<B: KeyValueBackend + ?Sized> KeyValueBackend for std::rc::Rc<B> {
    fn get_item(&self, key: &str) -> Result<Option<String>> {
        (**self).get_item(key)
    }

    fn set_item(&self, key: &str, value: &str) -> Result<()> {
        (**self).set_item(key, value)
    }

    fn remove_item(&self, key: &str) -> Result<()> {
        (**self).remove_item(key)
    }
}
