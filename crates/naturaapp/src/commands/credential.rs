//! The API key used by the identification service. Stored through the
//! repository like any other setting; shown masked unless asked otherwise.

use crate::commands::{CmdMessage, CmdResult};
use crate::error::{NaturaError, Result};
use crate::repository::CreationRepository;
use crate::store::CreationStore;

pub fn get<S: CreationStore>(repo: &CreationRepository<S>, reveal: bool) -> Result<CmdResult> {
    let mut result = CmdResult::default();
    match repo.credential()? {
        Some(key) if reveal => result.add_message(CmdMessage::info(key)),
        Some(key) => result.add_message(CmdMessage::info(mask(&key))),
        None => result.add_message(CmdMessage::warning("No API key configured.")),
    }
    Ok(result)
}

pub fn set<S: CreationStore>(repo: &CreationRepository<S>, value: &str) -> Result<CmdResult> {
    let value = value.trim();
    if value.is_empty() {
        return Err(NaturaError::Api("the API key cannot be empty".to_string()));
    }
    repo.save_credential(value)?;

    let mut result = CmdResult::default();
    result.add_message(CmdMessage::success("API key saved."));
    Ok(result)
}

/// Keep a short prefix and the last four characters.
fn mask(key: &str) -> String {
    let chars: Vec<char> = key.chars().collect();
    if chars.len() <= 8 {
        return "*".repeat(chars.len());
    }
    let head: String = chars[..3].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{}…{}", head, tail)
}
