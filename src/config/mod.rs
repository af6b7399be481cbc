use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Probe manifest: a library and the symbols it is expected to export
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProbeConfig {
    /// Path or loader-resolvable name of the library
    #[serde(default = "default_library")]
    pub library: String,

    /// Symbols that must be present
    #[serde(default)]
    pub required: Vec<String>,

    /// Symbols that may be absent (feature unavailable)
    #[serde(default)]
    pub optional: Vec<String>,
}

fn default_library() -> String {
    if cfg!(target_os = "macos") {
        "libm.dylib".to_string()
    } else {
        "libm.so.6".to_string()
    }
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            library: default_library(),
            required: Vec::new(),
            optional: Vec::new(),
        }
    }
}

impl ProbeConfig {
    /// Load the manifest from `~/.dynhook/probe.yaml`, or defaults if absent
    pub fn load_default() -> Result<Self> {
        let config_path = Self::default_config_path()?;

        if config_path.exists() {
            Self::load_from_file(&config_path)
        } else {
            Ok(Self::default())
        }
    }

    /// Load a manifest from a file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read probe manifest {}", path.as_ref().display()))?;

        let config: ProbeConfig =
            serde_yaml::from_str(&contents).context("Failed to parse probe manifest")?;

        Ok(config)
    }

    /// Write the manifest as YAML, creating parent directories
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let contents = serde_yaml::to_string(self).context("Failed to serialize probe manifest")?;

        if let Some(parent) = path.as_ref().parent() {
            fs::create_dir_all(parent).context("Failed to create probe manifest directory")?;
        }

        fs::write(path.as_ref(), contents).context("Failed to write probe manifest")?;

        Ok(())
    }

    /// Where [`ProbeConfig::load_default`] looks
    pub fn default_config_path() -> Result<PathBuf> {
        let home = dirs::home_dir().context("No home directory for the default probe manifest")?;

        Ok(home.join(".dynhook").join("probe.yaml"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ProbeConfig::default();
        assert!(config.library.starts_with("libm"));
        assert!(config.required.is_empty());
        assert!(config.optional.is_empty());
    }

    #[test]
    fn test_config_deserialization() {
        let yaml = r#"
library: /usr/lib/x86_64-linux-gnu/libcuda.so
required:
  - cuInit
  - cuDriverGetVersion
optional:
  - cuCheckpointProcessLock
"#;
        let config: ProbeConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.library, "/usr/lib/x86_64-linux-gnu/libcuda.so");
        assert_eq!(config.required, vec!["cuInit", "cuDriverGetVersion"]);
        assert_eq!(config.optional, vec!["cuCheckpointProcessLock"]);
    }

    #[test]
    fn test_missing_fields_use_defaults() {
        let config: ProbeConfig = serde_yaml::from_str("required: [sqrt]").unwrap();
        assert_eq!(config.library, default_library());
        assert_eq!(config.required, vec!["sqrt"]);
        assert!(config.optional.is_empty());
    }

    #[test]
    fn test_errors_name_the_manifest() {
        let dir = tempfile::tempdir().unwrap();

        let missing = dir.path().join("absent.yaml");
        let err = ProbeConfig::load_from_file(&missing).unwrap_err();
        assert!(err.to_string().contains("Failed to read probe manifest"));
        assert!(err.to_string().contains("absent.yaml"));

        let broken = dir.path().join("broken.yaml");
        fs::write(&broken, "required: [unterminated").unwrap();
        let err = ProbeConfig::load_from_file(&broken).unwrap_err();
        assert_eq!(err.to_string(), "Failed to parse probe manifest");
    }

    #[test]
    fn test_default_config_path() {
        if let Ok(path) = ProbeConfig::default_config_path() {
            assert!(path.ends_with(".dynhook/probe.yaml"));
        }
    }
}
