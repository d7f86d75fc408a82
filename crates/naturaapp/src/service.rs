//! # Identification Pipeline
//!
//! A creation starts as a photo and/or a free-text description. An external
//! service identifies the species, a second call illustrates it, and the
//! result is persisted through the repository:
//!
//! ```text
//! AnalysisInput ──► SpeciesAnalyzer ──► AnalysisResult ──► Illustrator ──► image reference
//!                                              │                                  │
//!                                              └──────────► NewCreation ◄─────────┘
//!                                                               │
//!                                                   CreationRepository::save
//! ```
//!
//! Only the seams live here. Talking to an actual identification service is
//! the job of whoever implements the traits. The repository remains the
//! enforcement boundary: an analysis without a common name, or an
//! illustration that is not a usable image reference, is refused by `save`.

use crate::error::{NaturaError, Result};
use crate::model::{Creation, CreationKind, NewCreation};
use crate::repository::CreationRepository;
use crate::store::CreationStore;
use serde::{Deserialize, Serialize};
use tracing::info;

/// What the caller knows about the subject.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnalysisInput {
    /// Inline image of the subject.
    pub image: Option<String>,
    pub description: Option<String>,
}

impl AnalysisInput {
    pub fn is_empty(&self) -> bool {
        let blank = |v: &Option<String>| v.as_deref().map_or(true, |s| s.trim().is_empty());
        blank(&self.image) && blank(&self.description)
    }
}

/// Identification returned by the analysis service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    #[serde(rename = "type")]
    pub kind: CreationKind,
    pub common_name: String,
    pub scientific_name: String,
    /// Visual traits the illustration should show.
    pub characteristics: String,
    pub description: String,
}

pub trait SpeciesAnalyzer {
    fn analyze(&self, input: &AnalysisInput, credential: &str) -> Result<AnalysisResult>;
}

pub trait Illustrator {
    /// Produce an image reference (remote URL or inline image) for `analysis`.
    fn illustrate(&self, analysis: &AnalysisResult, credential: &str) -> Result<String>;
}

/// Identify, illustrate and save a new creation.
pub fn create_creation<S, A, I>(
    repo: &CreationRepository<S>,
    analyzer: &A,
    illustrator: &I,
    input: &AnalysisInput,
) -> Result<Creation>
where
    S: CreationStore,
    A: SpeciesAnalyzer + ?Sized,
    I: Illustrator + ?Sized,
{
    let credential = repo.credential()?.ok_or_else(|| {
        NaturaError::Api("no API key configured; set one with `natura key set`".to_string())
    })?;
    if input.is_empty() {
        return Err(NaturaError::Api(
            "an image or a description is required".to_string(),
        ));
    }

    let analysis = analyzer.analyze(input, &credential)?;
    info!(common_name = %analysis.common_name, kind = %analysis.kind, "species identified");
    let image_uri = illustrator.illustrate(&analysis, &credential)?;

    let new = NewCreation::new(analysis.kind, analysis.common_name, image_uri)
        .with_scientific_name(analysis.scientific_name)
        .with_description(analysis.description);
    repo.save(new)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ValidationError;
    use crate::store::flat::FlatStore;
    use crate::store::mem_backend::MemBackend;
    use std::cell::Cell;

    struct FixedAnalyzer(AnalysisResult);

    impl SpeciesAnalyzer for FixedAnalyzer {
        fn analyze(&self, _input: &AnalysisInput, credential: &str) -> Result<AnalysisResult> {
            assert_eq!(credential, "sk-test");
            Ok(self.0.clone())
        }
    }

    struct FixedIllustrator {
        uri: &'static str,
        calls: Cell<usize>,
    }

    impl Illustrator for FixedIllustrator {
        fn illustrate(&self, _analysis: &AnalysisResult, _credential: &str) -> Result<String> {
            self.calls.set(self.calls.get() + 1);
            Ok(self.uri.to_string())
        }
    }

    fn analysis(common_name: &str) -> AnalysisResult {
        AnalysisResult {
            kind: CreationKind::Insect,
            common_name: common_name.to_string(),
            scientific_name: "Coccinella septempunctata".to_string(),
            characteristics: "red elytra, seven black spots".to_string(),
            description: "A common ladybird.".to_string(),
        }
    }

    fn illustrator(uri: &'static str) -> FixedIllustrator {
        FixedIllustrator {
            uri,
            calls: Cell::new(0),
        }
    }

    fn repo_with_key() -> CreationRepository<FlatStore<MemBackend>> {
        let repo = CreationRepository::new(FlatStore::new(MemBackend::new()));
        repo.save_credential("sk-test").unwrap();
        repo
    }

    fn described() -> AnalysisInput {
        AnalysisInput {
            image: None,
            description: Some("small red beetle with spots".to_string()),
        }
    }

    #[test]
    fn pipeline_saves_the_illustrated_creation() {
        let repo = repo_with_key();
        let created = create_creation(
            &repo,
            &FixedAnalyzer(analysis("Ladybird")),
            &illustrator("https://cdn/ladybird.png"),
            &described(),
        )
        .unwrap();

        assert_eq!(created.common_name, "Ladybird");
        assert_eq!(created.kind, CreationKind::Insect);
        assert_eq!(created.description, "A common ladybird.");
        assert_eq!(repo.list().unwrap(), vec![created]);
    }

    #[test]
    fn missing_credential_stops_before_analysis() {
        let repo = CreationRepository::new(FlatStore::new(MemBackend::new()));
        let painter = illustrator("https://cdn/x.png");
        let err = create_creation(&repo, &FixedAnalyzer(analysis("X")), &painter, &described())
            .unwrap_err();
        assert!(matches!(err, NaturaError::Api(_)));
        assert_eq!(painter.calls.get(), 0);
    }

    #[test]
    fn empty_input_is_refused() {
        let repo = repo_with_key();
        let input = AnalysisInput {
            image: Some(String::new()),
            description: Some("  ".to_string()),
        };
        let err = create_creation(
            &repo,
            &FixedAnalyzer(analysis("X")),
            &illustrator("https://cdn/x.png"),
            &input,
        )
        .unwrap_err();
        assert!(matches!(err, NaturaError::Api(_)));
    }

    #[test]
    fn repository_rejects_unnamed_analysis() {
        let repo = repo_with_key();
        let err = create_creation(
            &repo,
            &FixedAnalyzer(analysis("")),
            &illustrator("https://cdn/x.png"),
            &described(),
        )
        .unwrap_err();
        assert!(matches!(
            err,
            NaturaError::Validation(ValidationError::MissingCommonName)
        ));
        assert!(repo.list().unwrap().is_empty());
    }

    #[test]
    fn repository_rejects_html_illustration() {
        let repo = repo_with_key();
        let err = create_creation(
            &repo,
            &FixedAnalyzer(analysis("Ladybird")),
            &illustrator("data:text/html;base64,PGh0bWw+"),
            &described(),
        )
        .unwrap_err();
        assert!(matches!(err, NaturaError::Validation(ValidationError::HtmlImage)));
    }

    #[test]
    fn analysis_result_reads_service_json() {
        let json = r#"{"type":"plant","commonName":"Fern","scientificName":"Polypodiopsida",
                       "characteristics":"fronds","description":"Shade lover"}"#;
        let parsed: AnalysisResult = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.kind, CreationKind::Plant);
        assert_eq!(parsed.characteristics, "fronds");
    }
}
