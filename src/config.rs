//! Provisioner configuration
//!
//! Loaded from YAML when a config file is given, otherwise built from
//! defaults. CLI flags are applied on top by the binary.

use crate::error::{Error, Result};
use crate::provisioning::naming::{DATA_STORAGE_CLASS_PREFIX, STORAGE_CLASS_ANNOTATION};
use crate::provisioning::retry::RetryBudget;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

/// Configuration shared by the storage-class ensurer and claim provisioner
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ProvisionerConfig {
    /// Bind wait budget
    pub retry: RetryBudget,
    /// Prefix for derived storage class names
    pub storage_class_prefix: String,
    /// Annotation key the claim uses to reference its storage class
    pub storage_class_annotation: String,
}

impl Default for ProvisionerConfig {
    fn default() -> Self {
        Self {
            retry: RetryBudget::default(),
            storage_class_prefix: DATA_STORAGE_CLASS_PREFIX.to_string(),
            storage_class_annotation: STORAGE_CLASS_ANNOTATION.to_string(),
        }
    }
}

impl ProvisionerConfig {
    /// Parse a YAML document; absent keys keep their defaults
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self> {
        debug!(path = %path.display(), "Loading provisioner config");
        let raw = std::fs::read_to_string(path)?;
        Self::from_yaml(&raw)
    }

    pub fn validate(&self) -> Result<()> {
        self.retry.validate()?;
        if self.storage_class_prefix.is_empty() {
            return Err(Error::Configuration(
                "storageClassPrefix must not be empty".into(),
            ));
        }
        if self.storage_class_annotation.is_empty() {
            return Err(Error::Configuration(
                "storageClassAnnotation must not be empty".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = ProvisionerConfig::default();
        assert_eq!(config.retry, RetryBudget::default());
        assert_eq!(config.storage_class_prefix, "etcd");
        assert_eq!(
            config.storage_class_annotation,
            "volume.beta.kubernetes.io/storage-class"
        );
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let config = ProvisionerConfig::from_yaml(
            "retry:\n  intervalMillis: 2000\n  maxAttempts: 30\n",
        )
        .unwrap();
        assert_eq!(config.retry.interval(), std::time::Duration::from_secs(2));
        assert_eq!(config.retry.max_attempts, 30);
        assert_eq!(config.storage_class_prefix, "etcd");
    }

    #[test]
    fn test_invalid_yaml_rejected() {
        assert!(matches!(
            ProvisionerConfig::from_yaml("storageClassPrefix: \"\"\n"),
            Err(Error::Configuration(_))
        ));
        assert!(matches!(
            ProvisionerConfig::from_yaml("retry: not-a-map\n"),
            Err(Error::YamlParse(_))
        ));
    }

    #[test]
    fn test_zero_interval_yaml_rejected() {
        assert!(matches!(
            ProvisionerConfig::from_yaml("retry:\n  intervalMillis: 0\n"),
            Err(Error::Configuration(_))
        ));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "storageClassPrefix: etcd-data").unwrap();

        let config = ProvisionerConfig::load(file.path()).unwrap();
        assert_eq!(config.storage_class_prefix, "etcd-data");
        assert_eq!(config.retry, RetryBudget::default());
    }
}
