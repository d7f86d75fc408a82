//! Flat Store: the whole creations collection as one serialized JSON array
//! under a single key, plus one key per setting.
//!
//! There is no partial update: every write reads the full array, changes it,
//! and writes it back.
//!
//! Read policy: a missing key or an undecodable blob reads as an empty
//! collection, and a single undecodable element is skipped. Corruption is
//! logged, never raised, so callers always get a usable list.

use super::backend::KeyValueBackend;
use super::{CreationStore, StoreKind, CREATIONS_KEY, CREDENTIAL_KEY, CREDENTIAL_SETTING};
use crate::error::Result;
use crate::model::Creation;
use serde_json::Value;
use tracing::warn;

pub struct FlatStore<B: KeyValueBackend> {
    backend: B,
}

impl<B: KeyValueBackend> FlatStore<B> {
    pub fn new(backend: B) -> Self {
        Self { backend }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    fn read_all(&self) -> Result<Vec<Creation>> {
        let Some(raw) = self.backend.get_item(CREATIONS_KEY)? else {
            return Ok(Vec::new());
        };
        Ok(decode_creations(&raw))
    }

    fn write_all(&self, creations: &[Creation]) -> Result<()> {
        let raw = serde_json::to_string(creations)?;
        self.backend.set_item(CREATIONS_KEY, &raw)
    }
}

/// Storage key used for a logical setting.
pub fn setting_key(key: &str) -> String {
    if key == CREDENTIAL_SETTING {
        CREDENTIAL_KEY.to_string()
    } else {
        format!("natura_setting_{}", key)
    }
}

/// Decode a creations blob leniently. Shared with the migration, which reads
/// the same representation from legacy browser storage.
pub fn decode_creations(raw: &str) -> Vec<Creation> {
    let items = match serde_json::from_str::<Value>(raw) {
        Ok(Value::Array(items)) => items,
        Ok(_) => {
            warn!("stored creations blob is not an array, treating as empty");
            return Vec::new();
        }
        Err(err) => {
            warn!(%err, "stored creations blob is unreadable, treating as empty");
            return Vec::new();
        }
    };

    items
        .into_iter()
        .enumerate()
        .filter_map(|(position, item)| match serde_json::from_value(item) {
            Ok(creation) => Some(creation),
            Err(err) => {
                warn!(position, %err, "skipping undecodable stored creation");
                None
            }
        })
        .collect()
}

impl<B: KeyValueBackend> CreationStore for FlatStore<B> {
    fn kind(&self) -> StoreKind {
        StoreKind::Flat
    }

    fn insert(&self, creation: &Creation) -> Result<()> {
        let mut creations = self.read_all()?;
        creations.push(creation.clone());
        self.write_all(&creations)
    }

    fn list(&self) -> Result<Vec<Creation>> {
        self.read_all()
    }

    fn delete(&self, id: &str) -> Result<()> {
        let creations = self.read_all()?;
        let before = creations.len();
        let remaining: Vec<Creation> = creations.into_iter().filter(|c| c.id != id).collect();
        if remaining.len() == before {
            return Ok(());
        }
        self.write_all(&remaining)
    }

    fn get_setting(&self, key: &str) -> Result<Option<String>> {
        self.backend.get_item(&setting_key(key))
    }

    fn put_setting(&self, key: &str, value: &str) -> Result<()> {
        self.backend.set_item(&setting_key(key), value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{CreationKind, NewCreation};
    use crate::store::mem_backend::MemBackend;
    use chrono::Utc;

    fn creation(id: &str) -> Creation {
        NewCreation::new(CreationKind::Animal, "Fox", "https://a/fox.png")
            .into_creation(id.into(), Utc::now())
    }

    #[test]
    fn empty_when_key_absent() {
        let store = FlatStore::new(MemBackend::new());
        assert!(store.list().unwrap().is_empty());
    }

    #[test]
    fn insert_appends_to_single_blob() {
        let store = FlatStore::new(MemBackend::new());
        store.insert(&creation("1")).unwrap();
        store.insert(&creation("2")).unwrap();

        let ids: Vec<String> = store.list().unwrap().into_iter().map(|c| c.id).collect();
        assert_eq!(ids, vec!["1", "2"]);
        assert_eq!(store.backend().len(), 1);
    }

    #[test]
    fn corrupt_blob_reads_as_empty() {
        let backend = MemBackend::new();
        backend.set_item(CREATIONS_KEY, "{not json").unwrap();
        let store = FlatStore::new(backend);
        assert!(store.list().unwrap().is_empty());
    }

    #[test]
    fn non_array_blob_reads_as_empty() {
        let backend = MemBackend::new();
        backend.set_item(CREATIONS_KEY, r#"{"id":"1"}"#).unwrap();
        let store = FlatStore::new(backend);
        assert!(store.list().unwrap().is_empty());
    }

    #[test]
    fn undecodable_element_is_skipped() {
        let good = serde_json::to_value(creation("good")).unwrap();
        let raw = serde_json::json!([good, {"id": 42, "type": "dragon"}]).to_string();
        let records = decode_creations(&raw);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].id, "good");
    }

    #[test]
    fn delete_is_idempotent() {
        let store = FlatStore::new(MemBackend::new());
        store.insert(&creation("1")).unwrap();
        store.delete("1").unwrap();
        store.delete("1").unwrap();
        store.delete("never-existed").unwrap();
        assert!(store.list().unwrap().is_empty());
    }

    #[test]
    fn credential_lives_under_its_own_key() {
        let store = FlatStore::new(MemBackend::new());
        store.put_setting(CREDENTIAL_SETTING, "sk-1").unwrap();
        store.put_setting(CREDENTIAL_SETTING, "sk-2").unwrap();

        assert_eq!(store.get_setting(CREDENTIAL_SETTING).unwrap(), Some("sk-2".into()));
        assert!(store.backend().contains_key(CREDENTIAL_KEY));
        assert_eq!(setting_key("theme"), "natura_setting_theme");
    }

    #[test]
    fn failed_write_keeps_previous_collection() {
        let store = FlatStore::new(MemBackend::new());
        store.insert(&creation("1")).unwrap();
        store.backend().set_simulate_write_error(true);

        assert!(store.insert(&creation("2")).is_err());
        assert_eq!(store.list().unwrap().len(), 1);
    }
}
