use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct PartscopeConfig {
    /// Catalog manifest used when `--manifest` is not given
    pub manifest: Option<String>,
    /// Scope used when `--scope` is not given
    pub default_scope: Option<String>,
}

pub fn default_config_path() -> PathBuf {
    PathBuf::from("partscope.toml")
}

pub fn default_manifest_path_in(base: &Path) -> PathBuf {
    base.join("catalog.toml")
}

pub fn load_config(path: Option<&Path>) -> anyhow::Result<Option<PartscopeConfig>> {
    let path = path.map(Path::to_path_buf).unwrap_or_else(default_config_path);
    if !path.exists() {
        return Ok(None);
    }

    let contents = std::fs::read_to_string(&path)?;
    let config: PartscopeConfig = toml::from_str(&contents)?;
    Ok(Some(config))
}

pub fn write_config(path: &Path, config: &PartscopeConfig, force: bool) -> anyhow::Result<()> {
    if path.exists() && !force {
        anyhow::bail!("config already exists at {} (use --force to overwrite)", path.display());
    }

    let contents = toml::to_string_pretty(config)?;
    std::fs::write(path, contents)?;
    Ok(())
}

/// Pick the manifest: explicit flag first, then config, then `catalog.toml`.
pub fn resolve_manifest(flag: Option<PathBuf>, config: Option<&PartscopeConfig>) -> PathBuf {
    flag.or_else(|| config.and_then(|c| c.manifest.as_ref()).map(PathBuf::from))
        .unwrap_or_else(|| default_manifest_path_in(Path::new(".")))
}

/// Pick the scope: explicit flag first, then the configured default.
pub fn resolve_scope(flag: Option<String>, config: Option<&PartscopeConfig>) -> anyhow::Result<String> {
    flag.or_else(|| config.and_then(|c| c.default_scope.clone()))
        .ok_or_else(|| anyhow::anyhow!("no scope given (use --scope or set default_scope in partscope.toml)"))
}
