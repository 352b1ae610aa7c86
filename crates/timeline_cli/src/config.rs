use std::fs;
use std::path::Path;

use anyhow::Context;
use engine_logging::engine_info;
use timeline_engine::HarvestConfig;

/// Defaults when `path` is `None`; otherwise a RON file whose missing keys fall back to defaults.
///
/// A map given in the file replaces the default map of the same name wholesale.
pub fn load_config(path: Option<&Path>) -> anyhow::Result<HarvestConfig> {
    let Some(path) = path else {
        return Ok(HarvestConfig::default());
    };

    let content = fs::read_to_string(path)
        .with_context(|| format!("failed to read config {}", path.display()))?;
    let config: HarvestConfig = ron::from_str(&content)
        .with_context(|| format!("failed to parse config {}", path.display()))?;
    config
        .validate()
        .with_context(|| format!("invalid config {}", path.display()))?;

    engine_info!("Loaded harvest configuration from {:?}", path);
    Ok(config)
}
