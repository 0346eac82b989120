use anyhow::{Context, Result};
use concierge_call::CallConfig;
use std::fs;
use std::path::Path;

/// File values first, then flags on top.
pub fn load(path: Option<&Path>, url: Option<String>) -> Result<CallConfig> {
    let config = match path {
        Some(path) => {
            let text = fs::read_to_string(path)
                .with_context(|| format!("Failed to read config {}", path.display()))?;
            CallConfig::from_json(&text)
                .with_context(|| format!("Invalid config {}", path.display()))?
        }
        None => CallConfig::default(),
    };

    Ok(match url {
        Some(url) => config.with_relay_url(url),
        None => config,
    })
}
