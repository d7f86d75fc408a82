use crate::commands::DisplayCreation;
use crate::error::{NaturaError, Result};
use crate::model::Creation;
use crate::repository::CreationRepository;
use crate::store::CreationStore;
use std::collections::HashSet;

/// How a user refers to creations on the command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selector {
    /// 1-based display index. Legacy ids are numeric too, so an index that is
    /// out of range is retried as an id.
    Index(usize),
    /// Inclusive index range, `start-end`.
    Range(usize, usize),
    Id(String),
}

/// Parse raw selector strings: `3`, `1-4`, or anything else as an id.
pub fn parse_selectors<I: AsRef<str>>(inputs: &[I]) -> Result<Vec<Selector>> {
    let mut selectors = Vec::new();
    for input in inputs {
        let raw = input.as_ref().trim();
        if raw.is_empty() {
            return Err(NaturaError::Api("empty selector".to_string()));
        }
        selectors.push(parse_one(raw)?);
    }
    Ok(selectors)
}

fn parse_one(raw: &str) -> Result<Selector> {
    if let Ok(n) = raw.parse::<usize>() {
        return Ok(Selector::Index(n));
    }

    if let Some((start, end)) = raw.split_once('-') {
        if let (Ok(start), Ok(end)) = (start.parse::<usize>(), end.parse::<usize>()) {
            if start == 0 || start > end {
                return Err(NaturaError::Api(format!("Invalid range {}", raw)));
            }
            return Ok(Selector::Range(start, end));
        }
    }

    Ok(Selector::Id(raw.to_string()))
}

/// Sort newest first and number from 1. Ties fall back to id order so the
/// numbering is stable between runs.
pub fn index_creations(mut creations: Vec<Creation>) -> Vec<DisplayCreation> {
    creations.sort_by(|a, b| {
        b.created_at
            .cmp(&a.created_at)
            .then_with(|| b.id.cmp(&a.id))
    });
    creations
        .into_iter()
        .enumerate()
        .map(|(i, creation)| DisplayCreation {
            index: i + 1,
            creation,
        })
        .collect()
}

pub fn indexed_creations<S: CreationStore>(
    repo: &CreationRepository<S>,
) -> Result<Vec<DisplayCreation>> {
    Ok(index_creations(repo.list()?))
}

/// Resolve selectors against the current listing, deduplicated, in the
/// order given.
pub fn resolve_selectors(
    indexed: &[DisplayCreation],
    selectors: &[Selector],
) -> Result<Vec<DisplayCreation>> {
    let by_index = |n: usize| indexed.get(n.wrapping_sub(1)).filter(|_| n > 0);
    let by_id = |id: &str| indexed.iter().find(|d| d.creation.id == id);

    let mut seen = HashSet::new();
    let mut resolved = Vec::new();
    let mut push = |found: &DisplayCreation| {
        if seen.insert(found.creation.id.clone()) {
            resolved.push(found.clone());
        }
    };

    for selector in selectors {
        match selector {
            Selector::Index(n) => {
                let found = by_index(*n)
                    .or_else(|| by_id(&n.to_string()))
                    .ok_or_else(|| NaturaError::NotFound(format!("index {}", n)))?;
                push(found);
            }
            Selector::Range(start, end) => {
                if *end > indexed.len() {
                    return Err(NaturaError::NotFound(format!(
                        "range {}-{} (there are {} creation(s))",
                        start,
                        end,
                        indexed.len()
                    )));
                }
                for n in *start..=*end {
                    if let Some(found) = by_index(n) {
                        push(found);
                    }
                }
            }
            Selector::Id(id) => {
                let found = by_id(id).ok_or_else(|| NaturaError::NotFound(id.clone()))?;
                push(found);
            }
        }
    }

    Ok(resolved)
}
