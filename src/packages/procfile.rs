//! Procfile parsing
//!
//! Only the `web` process is read. The first line starting with `web:`
//! (any case, any surrounding whitespace) supplies the command.

use regex::Regex;
use std::sync::LazyLock;

static WEB_PREFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^\s*web\s*:\s*").expect("valid web prefix pattern"));

/// Extract the `web` command from Procfile contents
pub fn web_command(content: &str) -> Option<String> {
    content.lines().find_map(|line| {
        let prefix = WEB_PREFIX.find(line)?;
        let command = line[prefix.end()..].trim();
        (!command.is_empty()).then(|| command.to_string())
    })
}
