//! Config file loading/saving: a user override file (YAML or JSON,
//! selected by extension) is deep-merged over a built-in [`Preset`]'s
//! defaults (§4.9).

use std::path::Path;

use serde_json::Value;

use super::error::{ConfigError, ConfigResult};
use super::pipeline::PipelineConfig;
use super::profile::Preset;
use super::validation::Validatable;

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
enum Format {
    Yaml,
    Json,
}

fn format_of(path: &Path) -> ConfigResult<Format> {
    match path.extension().and_then(|e| e.to_str()) {
        Some("yaml") | Some("yml") => Ok(Format::Yaml),
        Some("json") => Ok(Format::Json),
        other => Err(ConfigError::Parse(format!(
            "unsupported config extension: {other:?}"
        ))),
    }
}

/// Loads `path` as an override patch and merges it over `preset`'s
/// defaults, validating the result.
pub fn load_patched(path: &Path, preset: Preset) -> ConfigResult<PipelineConfig> {
    let text = std::fs::read_to_string(path)?;
    let format = format_of(path)?;

    let patch: Value = match format {
        Format::Yaml => serde_yaml::from_str(&text).map_err(|e| ConfigError::Parse(e.to_string()))?,
        Format::Json => serde_json::from_str(&text).map_err(|e| ConfigError::Parse(e.to_string()))?,
    };

    let base = serde_json::to_value(PipelineConfig::from_preset(preset))
        .map_err(|e| ConfigError::Parse(e.to_string()))?;
    let merged = merge(base, patch);

    let config: PipelineConfig =
        serde_json::from_value(merged).map_err(|e| ConfigError::Parse(e.to_string()))?;
    config.validate()?;
    Ok(config)
}

/// Writes `config` to `path`, format chosen by extension.
pub fn save(path: &Path, config: &PipelineConfig) -> ConfigResult<()> {
    let format = format_of(path)?;
    let text = match format {
        Format::Yaml => serde_yaml::to_string(config).map_err(|e| ConfigError::Parse(e.to_string()))?,
        Format::Json => {
            serde_json::to_string_pretty(config).map_err(|e| ConfigError::Parse(e.to_string()))?
        }
    };
    std::fs::write(path, text)?;
    Ok(())
}

/// Recursive merge: scalars and arrays in `patch` replace `base`; objects
/// merge key by key.
fn merge(base: Value, patch: Value) -> Value {
    match (base, patch) {
        (Value::Object(mut base_map), Value::Object(patch_map)) => {
            for (key, patch_value) in patch_map {
                let merged = match base_map.remove(&key) {
                    Some(base_value) => merge(base_value, patch_value),
                    None => patch_value,
                };
                base_map.insert(key, merged);
            }
            Value::Object(base_map)
        }
        (_, patch) => patch,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn merge_overrides_leaf_without_touching_siblings() {
        let base = serde_json::json!({"a": {"x": 1, "y": 2}, "b": 3});
        let patch = serde_json::json!({"a": {"x": 9}});
        let merged = merge(base, patch);
        assert_eq!(merged["a"]["x"], 9);
        assert_eq!(merged["a"]["y"], 2);
        assert_eq!(merged["b"], 3);
    }

    #[test]
    fn load_patched_round_trips_through_tempfile() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("override.yaml");
        std::fs::write(&path, "taint:\n  maxHops: 3\n").unwrap();
        let config = load_patched(&path, Preset::Balanced).unwrap();
        assert_eq!(config.taint.max_hops, 3);
    }
}
