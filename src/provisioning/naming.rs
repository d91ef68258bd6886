//! Deterministic object names
//!
//! Every name here is a pure function of its inputs so a retried
//! provisioning attempt always targets the same object.

use crate::error::{Error, Result};

/// Default prefix for data storage classes
pub const DATA_STORAGE_CLASS_PREFIX: &str = "etcd";

/// Beta annotation the claim uses to reference its storage class
pub const STORAGE_CLASS_ANNOTATION: &str = "volume.beta.kubernetes.io/storage-class";

/// Label carrying the owning cluster
pub const CLUSTER_LABEL: &str = "etcd_cluster";

/// Label carrying the application
pub const APP_LABEL: &str = "app";

/// Value of the application label on every data claim
pub const APP_NAME: &str = "etcd";

/// Last path segment of a provisioner, ignoring trailing separators.
///
/// `kubernetes.io/gce-pd` becomes `gce-pd`. Returns `None` when nothing
/// is left to name a class after.
pub fn provisioner_basename(provisioner_id: &str) -> Option<&str> {
    let trimmed = provisioner_id.trim_end_matches('/');
    let base = match trimmed.rfind('/') {
        Some(idx) => &trimmed[idx + 1..],
        None => trimmed,
    };
    if base.is_empty() {
        None
    } else {
        Some(base)
    }
}

/// Storage class name for a provisioner: `<prefix>-<basename>`
pub fn storage_class_name(prefix: &str, provisioner_id: &str) -> Result<String> {
    let base = provisioner_basename(provisioner_id)
        .ok_or_else(|| Error::InvalidProvisioner(provisioner_id.to_string()))?;
    Ok(format!("{}-{}", prefix, base))
}

/// Data claim name for a cluster member: `<cluster>-<member>-data-pvc`
pub fn data_pvc_name(cluster_id: &str, member_id: u64) -> String {
    format!("{}-{}-data-pvc", cluster_id, member_id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_provisioner_basename() {
        assert_eq!(provisioner_basename("gce-pd"), Some("gce-pd"));
        assert_eq!(provisioner_basename("kubernetes.io/gce-pd"), Some("gce-pd"));
        assert_eq!(provisioner_basename("kubernetes.io/aws-ebs/"), Some("aws-ebs"));
        assert_eq!(provisioner_basename(""), None);
        assert_eq!(provisioner_basename("///"), None);
    }

    #[test]
    fn test_storage_class_name() {
        assert_eq!(
            storage_class_name(DATA_STORAGE_CLASS_PREFIX, "kubernetes.io/gce-pd").unwrap(),
            "etcd-gce-pd"
        );
        assert_eq!(
            storage_class_name(DATA_STORAGE_CLASS_PREFIX, "ebs.csi.aws.com").unwrap(),
            "etcd-ebs.csi.aws.com"
        );
        assert!(matches!(
            storage_class_name(DATA_STORAGE_CLASS_PREFIX, ""),
            Err(Error::InvalidProvisioner(_))
        ));
    }

    #[test]
    fn test_data_pvc_name_stable() {
        assert_eq!(data_pvc_name("c1", 3), "c1-3-data-pvc");
        assert_eq!(data_pvc_name("c1", 3), data_pvc_name("c1", 3));
    }

    #[test]
    fn test_data_pvc_names_distinct_across_members() {
        let mut seen = HashSet::new();
        for cluster in ["c1", "c2", "prod"] {
            for member in 0..32u64 {
                assert!(seen.insert(data_pvc_name(cluster, member)));
            }
        }
        assert_eq!(seen.len(), 3 * 32);
    }
}
