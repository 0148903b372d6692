use anyhow::{Context, Result};
use tokio::fs;
use tracing::debug;
use ubb_parser::EmoticonRuleSet;

use crate::cmd::EmoticonsArgs;

/// Load the emoticon rules chosen on the command line.
///
/// Fall back to the built-in rules when no rule file is given.
///
/// # Errors
///
/// When failed to read the rule file or the rules in it are invalid.
pub async fn load_emoticons(args: &EmoticonsArgs) -> Result<EmoticonRuleSet> {
    let Some(path) = &args.emoticons else {
        return Ok(EmoticonRuleSet::builtin().clone());
    };

    let data = fs::read_to_string(path)
        .await
        .with_context(|| format!("when reading emoticon rules file {path}"))?;
    let rules = EmoticonRuleSet::from_toml_str(data.as_str()).context("invalid emoticon rules")?;
    debug!("loaded {} emoticon rules from {path}", rules.rules().len());
    Ok(rules)
}

/// Read the markup source file.
///
/// # Errors
///
/// When failed to read the file or it is not utf-8.
pub async fn read_source(path: &str) -> Result<String> {
    fs::read_to_string(path)
        .await
        .with_context(|| format!("when reading content file {path}"))
}
