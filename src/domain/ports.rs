//! Domain Ports - Core trait definitions for the storage provisioner
//!
//! These types define the boundary between the provisioning protocol and the
//! orchestration platform's resource store. Adapters implement
//! [`ResourceStore`] to provide concrete functionality.

use crate::error::Result;
use async_trait::async_trait;
use k8s_openapi::api::core::v1::PersistentVolumeClaim;
use k8s_openapi::api::storage::v1::StorageClass;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

// =============================================================================
// Storage Class
// =============================================================================

/// Storage class derived from a provisioner identifier
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StorageClassDescriptor {
    /// Class name, `<prefix>-<basename(provisioner)>`
    pub name: String,
    /// Fully-qualified provisioner backing the class
    pub provisioner_id: String,
}

// =============================================================================
// Volume Claims
// =============================================================================

/// Request for a member's data volume claim
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VolumeClaimRequest {
    /// etcd cluster the member belongs to
    pub cluster_id: String,
    /// Member identifier within the cluster
    pub member_id: u64,
    /// Namespace the claim lives in
    pub namespace: String,
    /// Provisioner whose storage class the claim references
    pub provisioner_id: String,
    /// Requested capacity in MiB
    pub size_mib: i64,
}

/// Observed phase of a persistent volume claim
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ClaimPhase {
    Pending,
    Bound,
    Lost,
    /// No status reported yet, or a phase this crate does not know
    Unknown,
}

impl ClaimPhase {
    /// Read the observed phase off a claim
    pub fn of(claim: &PersistentVolumeClaim) -> Self {
        claim
            .status
            .as_ref()
            .and_then(|s| s.phase.as_deref())
            .map(Self::from)
            .unwrap_or(ClaimPhase::Unknown)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ClaimPhase::Pending => "Pending",
            ClaimPhase::Bound => "Bound",
            ClaimPhase::Lost => "Lost",
            ClaimPhase::Unknown => "Unknown",
        }
    }
}

impl From<&str> for ClaimPhase {
    fn from(phase: &str) -> Self {
        match phase {
            "Pending" => ClaimPhase::Pending,
            "Bound" => ClaimPhase::Bound,
            "Lost" => ClaimPhase::Lost,
            _ => ClaimPhase::Unknown,
        }
    }
}

impl std::fmt::Display for ClaimPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of a successful claim provisioning
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClaimOutcome {
    /// Name of the bound claim
    pub claim_name: String,
    /// Namespace of the bound claim
    pub namespace: String,
    /// Storage class the claim references
    pub storage_class: String,
    /// Number of phase checks issued before Bound was observed
    pub poll_attempts: u32,
    /// Whether a stale claim had to be deleted and recreated
    pub recovered_conflict: bool,
    /// When Bound was observed
    pub bound_at: chrono::DateTime<chrono::Utc>,
}

// =============================================================================
// Resource Store Port
// =============================================================================

/// Port for the orchestration platform's resource store
///
/// Implementations must report a name collision on create as
/// [`Error::ResourceExists`](crate::Error::ResourceExists) and a missing
/// object on get/delete as
/// [`Error::ResourceNotFound`](crate::Error::ResourceNotFound); the
/// provisioning protocol branches on exactly those two outcomes.
#[async_trait]
pub trait ResourceStore: Send + Sync {
    /// Create a cluster-scoped storage class
    async fn create_storage_class(&self, class: &StorageClass) -> Result<StorageClass>;

    /// Create a persistent volume claim
    async fn create_claim(
        &self,
        namespace: &str,
        claim: &PersistentVolumeClaim,
    ) -> Result<PersistentVolumeClaim>;

    /// Fetch the current state of a claim
    async fn get_claim(&self, namespace: &str, name: &str) -> Result<PersistentVolumeClaim>;

    /// Delete a claim
    async fn delete_claim(&self, namespace: &str, name: &str) -> Result<()>;

    /// Get store name, for logging
    fn store_name(&self) -> &str;
}

pub type ResourceStoreRef = Arc<dyn ResourceStore>;
