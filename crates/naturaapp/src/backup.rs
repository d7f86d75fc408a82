//! # Backup Codec
//!
//! Export turns the whole collection into a self-contained JSON document;
//! import reads such a document back into the repository.
//!
//! ```json
//! {
//!   "version": "1.0",
//!   "exportDate": "2025-03-02T09:41:00.000Z",
//!   "count": 1,
//!   "creations": [
//!     { "id": "…", "imageUri": "data:image/png;base64,…", "commonName": "…",
//!       "scientificName": "…", "description": "…", "type": "plant",
//!       "createdAt": "…" }
//!   ]
//! }
//! ```
//!
//! Every `imageUri` in a document is an inline image, so a backup restores on
//! any machine without network access. Remote images are fetched and inlined
//! during export through an [`ImageFetcher`]; import never fetches.
//!
//! Import is best-effort and non-atomic:
//! - malformed records are skipped, the rest of the batch goes on;
//! - with `replace_existing`, the current collection is deleted record by
//!   record before the first insert. A crash part-way leaves a partially
//!   cleared store; there is no rollback.
//! - imported records get fresh ids and timestamps.

use crate::error::{NaturaError, Result};
use crate::model::{Creation, CreationKind, NewCreation};
use crate::repository::CreationRepository;
use crate::store::CreationStore;
use crate::validate::is_inline_image;
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::io::Read;
use std::time::Duration;
use tracing::{info, warn};

pub const BACKUP_VERSION: &str = "1.0";

const FETCH_TIMEOUT: Duration = Duration::from_secs(30);
const MAX_IMAGE_BYTES: u64 = 32 * 1024 * 1024;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BackupDocument {
    pub version: String,
    pub export_date: DateTime<Utc>,
    pub count: usize,
    pub creations: Vec<Creation>,
}

impl BackupDocument {
    pub fn new(creations: Vec<Creation>) -> Self {
        Self {
            version: BACKUP_VERSION.to_string(),
            export_date: Utc::now(),
            count: creations.len(),
            creations,
        }
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Image bytes retrieved for a remote reference.
#[derive(Debug, Clone)]
pub struct FetchedImage {
    /// Media type as reported by the server; may be missing or generic.
    pub media_type: Option<String>,
    pub bytes: Vec<u8>,
}

/// Retrieves the bytes behind a remote image URL.
pub trait ImageFetcher {
    fn fetch(&self, url: &str) -> Result<FetchedImage>;
}

/// [`ImageFetcher`] over plain HTTP(S).
pub struct HttpFetcher {
    agent: ureq::Agent,
}

impl Default for HttpFetcher {
    fn default() -> Self {
        Self::new()
    }
}

impl HttpFetcher {
    pub fn new() -> Self {
        Self {
            agent: ureq::AgentBuilder::new().timeout(FETCH_TIMEOUT).build(),
        }
    }
}

impl ImageFetcher for HttpFetcher {
    fn fetch(&self, url: &str) -> Result<FetchedImage> {
        let response = self
            .agent
            .get(url)
            .call()
            .map_err(|e| NaturaError::Fetch(format!("{}: {}", url, e)))?;

        let media_type = response
            .header("Content-Type")
            .map(|_| response.content_type().to_string());

        let bytes = read_capped(response.into_reader(), MAX_IMAGE_BYTES, url)?;
        Ok(FetchedImage { media_type, bytes })
    }
}

/// Read a whole response body, refusing one larger than `limit` bytes rather
/// than keeping a truncated image.
fn read_capped<R: Read>(reader: R, limit: u64, url: &str) -> Result<Vec<u8>> {
    let mut bytes = Vec::new();
    reader
        .take(limit + 1)
        .read_to_end(&mut bytes)
        .map_err(NaturaError::Io)?;

    if bytes.len() as u64 > limit {
        return Err(NaturaError::Fetch(format!(
            "{}: image exceeds {} MiB",
            url,
            limit / (1024 * 1024)
        )));
    }
    Ok(bytes)
}

/// Encode bytes as an inline image reference.
pub fn encode_inline_image(media_type: &str, bytes: &[u8]) -> String {
    format!("data:{};base64,{}", media_type, STANDARD.encode(bytes))
}

/// Recognize common image formats from their leading bytes.
pub fn sniff_media_type(bytes: &[u8]) -> Option<&'static str> {
    if bytes.starts_with(b"\x89PNG\r\n\x1a\n") {
        Some("image/png")
    } else if bytes.starts_with(&[0xFF, 0xD8, 0xFF]) {
        Some("image/jpeg")
    } else if bytes.starts_with(b"GIF87a") || bytes.starts_with(b"GIF89a") {
        Some("image/gif")
    } else if bytes.len() >= 12 && &bytes[..4] == b"RIFF" && &bytes[8..12] == b"WEBP" {
        Some("image/webp")
    } else {
        None
    }
}

/// Turn an image reference into an inline payload, fetching it if remote.
fn inline_reference<F: ImageFetcher + ?Sized>(fetcher: &F, uri: &str) -> Result<String> {
    if is_inline_image(uri) {
        return Ok(uri.to_string());
    }

    let image = fetcher.fetch(uri)?;
    if image.bytes.is_empty() {
        return Err(NaturaError::Fetch(format!("{}: empty response", uri)));
    }

    let declared = image
        .media_type
        .as_deref()
        .filter(|media_type| media_type.starts_with("image/"));
    let media_type = match declared {
        Some(media_type) => media_type.to_string(),
        None => sniff_media_type(&image.bytes)
            .map(str::to_string)
            .ok_or_else(|| {
                NaturaError::Fetch(format!(
                    "{}: response is not an image ({})",
                    uri,
                    image.media_type.as_deref().unwrap_or("no content type")
                ))
            })?,
    };

    Ok(encode_inline_image(&media_type, &image.bytes))
}

#[derive(Debug)]
pub struct ExportOutcome {
    pub document: BackupDocument,
    /// Creations left out, with the reason their image could not be inlined.
    pub skipped: Vec<(Creation, String)>,
}

/// Build a backup document from every listed creation.
///
/// A creation whose remote image cannot be fetched is left out and reported;
/// export fails only when there is nothing to export at all.
pub fn export_document<S, F>(repo: &CreationRepository<S>, fetcher: &F) -> Result<ExportOutcome>
where
    S: CreationStore,
    F: ImageFetcher + ?Sized,
{
    let creations = repo.list()?;
    if creations.is_empty() {
        return Err(NaturaError::Backup(
            "nothing to export: there are no creations yet".to_string(),
        ));
    }

    let total = creations.len();
    let mut exported = Vec::with_capacity(total);
    let mut skipped = Vec::new();

    for mut creation in creations {
        match inline_reference(fetcher, &creation.image_uri) {
            Ok(inline) => {
                creation.image_uri = inline;
                exported.push(creation);
            }
            Err(err) => {
                warn!(id = %creation.id, %err, "leaving creation out of the backup");
                skipped.push((creation, err.to_string()));
            }
        }
    }

    if exported.is_empty() {
        return Err(NaturaError::Backup(format!(
            "none of the {} creation(s) could be exported",
            total
        )));
    }

    info!(exported = exported.len(), skipped = skipped.len(), "backup document built");
    Ok(ExportOutcome {
        document: BackupDocument::new(exported),
        skipped,
    })
}

#[derive(Debug, Default)]
pub struct ImportOutcome {
    pub imported: Vec<Creation>,
    pub skipped: usize,
    /// Creations deleted beforehand because of `replace_existing`.
    pub removed: usize,
}

/// Read a backup document into the repository.
///
/// Fails when the text is not JSON, has no `creations` array, or yields no
/// importable record. The store is only cleared once at least one record is
/// known to be importable.
pub fn import_document<S: CreationStore>(
    repo: &CreationRepository<S>,
    text: &str,
    replace_existing: bool,
) -> Result<ImportOutcome> {
    let value: Value = serde_json::from_str(text)
        .map_err(|e| NaturaError::Backup(format!("the backup file is not valid JSON: {}", e)))?;

    let records = value
        .get("creations")
        .and_then(Value::as_array)
        .ok_or_else(|| {
            NaturaError::Backup("the backup file has no creations array".to_string())
        })?;

    if let Some(version) = value.get("version").and_then(Value::as_str) {
        if version != BACKUP_VERSION {
            warn!(version, "importing a backup written by a different format version");
        }
    }

    let mut outcome = ImportOutcome::default();
    let mut candidates = Vec::with_capacity(records.len());
    for (position, record) in records.iter().enumerate() {
        match importable(record) {
            Ok(new) => candidates.push(new),
            Err(reason) => {
                warn!(position, %reason, "skipping backup record");
                outcome.skipped += 1;
            }
        }
    }

    if candidates.is_empty() {
        return Err(NaturaError::Backup(format!(
            "no importable creations among {} record(s)",
            records.len()
        )));
    }

    if replace_existing {
        outcome.removed = repo.clear()?;
    }

    for new in candidates {
        match repo.save(new) {
            Ok(creation) => outcome.imported.push(creation),
            Err(NaturaError::Validation(reason)) => {
                warn!(%reason, "skipping backup record");
                outcome.skipped += 1;
            }
            Err(err) => return Err(err),
        }
    }

    if outcome.imported.is_empty() {
        return Err(NaturaError::Backup(
            "no creation in the backup could be imported".to_string(),
        ));
    }

    info!(
        imported = outcome.imported.len(),
        skipped = outcome.skipped,
        removed = outcome.removed,
        "backup imported"
    );
    Ok(outcome)
}

fn importable(record: &Value) -> std::result::Result<NewCreation, String> {
    let field = |name: &str| record.get(name).and_then(Value::as_str);

    let image_uri = field("imageUri").ok_or("missing imageUri")?;
    let common_name = field("commonName").ok_or("missing commonName")?;
    let scientific_name = field("scientificName").ok_or("missing scientificName")?;

    if common_name.trim().is_empty() {
        return Err("empty commonName".to_string());
    }
    if !is_inline_image(image_uri) {
        return Err("imageUri is not an inline image".to_string());
    }

    let kind: CreationKind = field("type").ok_or("missing type")?.parse()?;

    Ok(NewCreation {
        image_uri: image_uri.to_string(),
        common_name: common_name.to_string(),
        scientific_name: scientific_name.to_string(),
        description: field("description").unwrap_or_default().to_string(),
        kind,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::flat::FlatStore;
    use crate::store::mem_backend::MemBackend;
    use serde_json::json;
    use std::cell::RefCell;
    use std::collections::HashMap;

    const PNG_BYTES: &[u8] = b"\x89PNG\r\n\x1a\n\0\0\0\rIHDR";
    const INLINE: &str = "data:image/png;base64,iVBORw0KGgo=";

    #[derive(Default)]
    struct StubFetcher {
        responses: HashMap<String, FetchedImage>,
        calls: RefCell<Vec<String>>,
    }

    impl StubFetcher {
        fn with(mut self, url: &str, media_type: Option<&str>, bytes: &[u8]) -> Self {
            self.responses.insert(
                url.to_string(),
                FetchedImage {
                    media_type: media_type.map(str::to_string),
                    bytes: bytes.to_vec(),
                },
            );
            self
        }
    }

    impl ImageFetcher for StubFetcher {
        fn fetch(&self, url: &str) -> Result<FetchedImage> {
            self.calls.borrow_mut().push(url.to_string());
            self.responses
                .get(url)
                .cloned()
                .ok_or_else(|| NaturaError::Fetch(format!("{}: 404", url)))
        }
    }

    fn repo() -> CreationRepository<FlatStore<MemBackend>> {
        CreationRepository::new(FlatStore::new(MemBackend::new()))
    }

    fn new(name: &str, uri: &str) -> NewCreation {
        NewCreation::new(CreationKind::Animal, name, uri).with_scientific_name("Vulpes vulpes")
    }

    #[test]
    fn export_of_empty_collection_fails() {
        let err = export_document(&repo(), &StubFetcher::default()).unwrap_err();
        assert!(matches!(err, NaturaError::Backup(_)));
    }

    #[test]
    fn export_inlines_remote_images_and_keeps_inline_ones() {
        let repo = repo();
        repo.save(new("Fox", "https://cdn/fox.png")).unwrap();
        repo.save(new("Badger", INLINE)).unwrap();

        let fetcher = StubFetcher::default().with("https://cdn/fox.png", Some("image/png"), PNG_BYTES);
        let outcome = export_document(&repo, &fetcher).unwrap();

        assert_eq!(outcome.document.version, "1.0");
        assert_eq!(outcome.document.count, 2);
        assert!(outcome.skipped.is_empty());
        assert!(outcome
            .document
            .creations
            .iter()
            .all(|c| c.image_uri.starts_with("data:image/")));
        assert_eq!(fetcher.calls.borrow().as_slice(), ["https://cdn/fox.png"]);
    }

    #[test]
    fn export_sniffs_generic_content_type() {
        let repo = repo();
        repo.save(new("Fox", "https://cdn/fox")).unwrap();
        let fetcher =
            StubFetcher::default().with("https://cdn/fox", Some("application/octet-stream"), PNG_BYTES);

        let outcome = export_document(&repo, &fetcher).unwrap();
        assert!(outcome.document.creations[0]
            .image_uri
            .starts_with("data:image/png;base64,"));
    }

    #[test]
    fn export_skips_unfetchable_and_html_responses() {
        let repo = repo();
        repo.save(new("Fox", INLINE)).unwrap();
        repo.save(new("Gone", "https://cdn/gone.png")).unwrap();
        repo.save(new("Error page", "https://cdn/error.png")).unwrap();

        let fetcher =
            StubFetcher::default().with("https://cdn/error.png", Some("text/html"), b"<html></html>");
        let outcome = export_document(&repo, &fetcher).unwrap();

        assert_eq!(outcome.document.count, 1);
        assert_eq!(outcome.skipped.len(), 2);
    }

    #[test]
    fn document_serializes_in_backup_shape() {
        let repo = repo();
        repo.save(new("Fox", INLINE)).unwrap();
        let json = export_document(&repo, &StubFetcher::default())
            .unwrap()
            .document
            .to_json()
            .unwrap();

        let value: Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["version"], "1.0");
        assert_eq!(value["count"], 1);
        assert!(value["exportDate"].is_string());
        assert_eq!(value["creations"][0]["type"], "animal");
        assert_eq!(value["creations"][0]["imageUri"], INLINE);
    }

    #[test]
    fn import_rejects_non_json_and_missing_array() {
        let repo = repo();
        assert!(matches!(
            import_document(&repo, "not json", false),
            Err(NaturaError::Backup(_))
        ));
        assert!(matches!(
            import_document(&repo, r#"{"version":"1.0"}"#, false),
            Err(NaturaError::Backup(_))
        ));
        assert!(matches!(
            import_document(&repo, r#"{"creations":{}}"#, false),
            Err(NaturaError::Backup(_))
        ));
    }

    #[test]
    fn import_skips_records_with_remote_or_missing_fields() {
        let repo = repo();
        let doc = json!({
            "creations": [
                {"imageUri": INLINE, "commonName": "Fox", "scientificName": "", "type": "animal"},
                {"imageUri": "https://cdn/fox.png", "commonName": "Remote", "scientificName": "x", "type": "animal"},
                {"imageUri": INLINE, "scientificName": "x", "type": "animal"},
                {"imageUri": INLINE, "commonName": "No latin", "type": "plant"},
                {"imageUri": INLINE, "commonName": "Dragon", "scientificName": "x", "type": "dragon"}
            ]
        });

        let outcome = import_document(&repo, &doc.to_string(), false).unwrap();
        assert_eq!(outcome.imported.len(), 1);
        assert_eq!(outcome.skipped, 4);
        assert_eq!(outcome.imported[0].description, "");
    }

    #[test]
    fn import_assigns_fresh_identity() {
        let repo = repo();
        let doc = json!({
            "creations": [{
                "id": "original-id", "createdAt": "2020-01-01T00:00:00Z",
                "imageUri": INLINE, "commonName": "Fox", "scientificName": "Vulpes vulpes",
                "description": "Red", "type": "animal"
            }]
        });

        let outcome = import_document(&repo, &doc.to_string(), false).unwrap();
        let imported = &outcome.imported[0];
        assert_ne!(imported.id, "original-id");
        assert!(imported.created_at.timestamp() > 1_577_836_800);
    }

    #[test]
    fn replace_clears_existing_first() {
        let repo = repo();
        repo.save(new("Old", INLINE)).unwrap();
        repo.save(new("Older", INLINE)).unwrap();

        let doc = json!({"creations": [
            {"imageUri": INLINE, "commonName": "New", "scientificName": "", "type": "insect"}
        ]});
        let outcome = import_document(&repo, &doc.to_string(), true).unwrap();

        assert_eq!(outcome.removed, 2);
        let names: Vec<String> = repo.list().unwrap().into_iter().map(|c| c.common_name).collect();
        assert_eq!(names, vec!["New"]);
    }

    #[test]
    fn nothing_importable_leaves_store_untouched_even_with_replace() {
        let repo = repo();
        repo.save(new("Keep", INLINE)).unwrap();

        let doc = json!({"creations": [{"imageUri": INLINE, "type": "plant"}]});
        assert!(import_document(&repo, &doc.to_string(), true).is_err());
        assert_eq!(repo.list().unwrap().len(), 1);
    }

    #[test]
    fn oversized_body_is_refused_not_truncated() {
        let limit = 2 * 1024 * 1024;
        let body = vec![0u8; limit as usize + 1000];
        let err = read_capped(body.as_slice(), limit, "https://cdn/huge.png").unwrap_err();
        assert!(matches!(err, NaturaError::Fetch(ref msg) if msg.contains("exceeds 2 MiB")));

        let exact = vec![7u8; limit as usize];
        assert_eq!(read_capped(exact.as_slice(), limit, "https://cdn/ok.png").unwrap(), exact);
    }

    #[test]
    fn export_leaves_out_oversized_images() {
        struct Oversized;

        impl ImageFetcher for Oversized {
            fn fetch(&self, url: &str) -> Result<FetchedImage> {
                let mut body = PNG_BYTES.to_vec();
                body.extend_from_slice(&[0u8; 64]);
                let bytes = read_capped(body.as_slice(), 32, url)?;
                Ok(FetchedImage {
                    media_type: Some("image/png".to_string()),
                    bytes,
                })
            }
        }

        let repo = repo();
        repo.save(new("Fox", INLINE)).unwrap();
        repo.save(new("Whale", "https://cdn/whale.png")).unwrap();

        let outcome = export_document(&repo, &Oversized).unwrap();
        assert_eq!(outcome.document.count, 1);
        assert_eq!(outcome.skipped.len(), 1);
        assert_eq!(outcome.skipped[0].0.common_name, "Whale");
        assert!(outcome.skipped[0].1.contains("exceeds"));
    }

    #[test]
    fn sniffs_known_formats() {
        assert_eq!(sniff_media_type(PNG_BYTES), Some("image/png"));
        assert_eq!(sniff_media_type(&[0xFF, 0xD8, 0xFF, 0xE0]), Some("image/jpeg"));
        assert_eq!(sniff_media_type(b"GIF89a..."), Some("image/gif"));
        assert_eq!(sniff_media_type(b"RIFF\0\0\0\0WEBPVP8 "), Some("image/webp"));
        assert_eq!(sniff_media_type(b"<!doctype html>"), None);
    }
}
