use std::fs;
use std::path::Path;

use tracing::warn;

const DEFAULT_SYSTEM_PROMPT: &str = include_str!(concat!(
    env!("CARGO_MANIFEST_DIR"),
    "/prompts/system_prompt.md"
));

/// Built-in system prompt used when no asset is configured or readable.
pub fn default_system_prompt() -> &'static str {
    DEFAULT_SYSTEM_PROMPT.trim()
}

/// Reads the system prompt asset.
///
/// Called for every question so edits to the file apply without a restart.
/// A missing, unreadable or blank file falls back to the built-in prompt.
pub fn load_system_prompt(path: Option<&Path>) -> String {
    let Some(path) = path else {
        return default_system_prompt().to_string();
    };

    match fs::read_to_string(path) {
        Ok(contents) if !contents.trim().is_empty() => contents.trim().to_string(),
        Ok(_) => {
            warn!(path = %path.display(), "system prompt file is empty, using built-in prompt");
            default_system_prompt().to_string()
        }
        Err(err) => {
            warn!(path = %path.display(), error = %err, "system prompt file unavailable, using built-in prompt");
            default_system_prompt().to_string()
        }
    }
}
