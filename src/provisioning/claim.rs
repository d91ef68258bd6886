//! Member Data Claim Provisioner
//!
//! Creates the data PVC for one etcd member and blocks until the storage
//! system binds a volume to it.
//!
//! ```text
//! Creating ─ok──────────────────────────────────────────┐
//!    │                                                  ▼
//!    └─exists─► Deleting ─ok/not found─► Recreating ─ok─► Polling ─bound─► done
//!                  │                        │              │
//!                  └─error─► fail           ├─exists─► UnresolvableConflict
//!                                           └─error─► fail │
//!                                                          ├─get error─► fail
//!                                                          └─budget spent─► BindTimeout
//! ```
//!
//! A stale claim with the member's name is never reused: its storage class
//! or size may differ from the current request. It is deleted and the claim
//! recreated exactly once.

use crate::config::ProvisionerConfig;
use crate::domain::ports::{ClaimOutcome, ClaimPhase, ResourceStoreRef, VolumeClaimRequest};
use crate::error::{Error, Result};
use crate::provisioning::naming::{
    data_pvc_name, storage_class_name, APP_LABEL, APP_NAME, CLUSTER_LABEL,
};
use crate::provisioning::retry::{retry, Check, Retried};
use k8s_openapi::api::core::v1::{
    PersistentVolumeClaim, PersistentVolumeClaimSpec, VolumeResourceRequirements,
};
use k8s_openapi::apimachinery::pkg::api::resource::Quantity;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use std::collections::BTreeMap;
use tracing::{debug, info, warn};

const READ_WRITE_ONCE: &str = "ReadWriteOnce";
const STORAGE_RESOURCE: &str = "storage";

/// Provisions and waits on member data claims
pub struct ClaimProvisioner {
    store: ResourceStoreRef,
    config: ProvisionerConfig,
}

impl ClaimProvisioner {
    pub fn new(store: ResourceStoreRef, config: ProvisionerConfig) -> Self {
        Self { store, config }
    }

    pub fn config(&self) -> &ProvisionerConfig {
        &self.config
    }

    /// Build the claim payload for a request
    pub fn build_claim(&self, request: &VolumeClaimRequest) -> Result<PersistentVolumeClaim> {
        let class = storage_class_name(&self.config.storage_class_prefix, &request.provisioner_id)?;
        Ok(self.claim_for(request, class))
    }

    fn claim_for(&self, request: &VolumeClaimRequest, class: String) -> PersistentVolumeClaim {
        let labels = BTreeMap::from([
            (CLUSTER_LABEL.to_string(), request.cluster_id.clone()),
            (APP_LABEL.to_string(), APP_NAME.to_string()),
        ]);
        let annotations = BTreeMap::from([(self.config.storage_class_annotation.clone(), class)]);
        let requests = BTreeMap::from([(
            STORAGE_RESOURCE.to_string(),
            Quantity(format!("{}Mi", request.size_mib)),
        )]);

        PersistentVolumeClaim {
            metadata: ObjectMeta {
                name: Some(data_pvc_name(&request.cluster_id, request.member_id)),
                namespace: Some(request.namespace.clone()),
                labels: Some(labels),
                annotations: Some(annotations),
                ..Default::default()
            },
            spec: Some(PersistentVolumeClaimSpec {
                access_modes: Some(vec![READ_WRITE_ONCE.to_string()]),
                resources: Some(VolumeResourceRequirements {
                    requests: Some(requests),
                    ..Default::default()
                }),
                ..Default::default()
            }),
            status: None,
        }
    }

    /// Create the member's data claim and wait until it is Bound.
    ///
    /// On success the claim was Bound at the last check. On failure nothing
    /// is retried; the caller decides whether to start over. An invalid
    /// config or request fails before any store call.
    pub async fn provision_claim(&self, request: &VolumeClaimRequest) -> Result<ClaimOutcome> {
        self.config.validate()?;
        validate_request(request)?;

        let name = data_pvc_name(&request.cluster_id, request.member_id);
        let namespace = request.namespace.as_str();
        let storage_class =
            storage_class_name(&self.config.storage_class_prefix, &request.provisioner_id)?;
        let claim = self.claim_for(request, storage_class.clone());

        info!(
            claim = %name,
            namespace,
            class = %storage_class,
            size_mib = request.size_mib,
            "Creating member data PVC"
        );

        let recovered_conflict = self.create_or_replace(namespace, &name, &claim).await?;
        let poll_attempts = self.wait_bound(namespace, &name).await?;

        info!(
            claim = %name,
            namespace,
            attempts = poll_attempts,
            "Member data PVC bound"
        );

        Ok(ClaimOutcome {
            claim_name: name,
            namespace: request.namespace.clone(),
            storage_class,
            poll_attempts,
            recovered_conflict,
            bound_at: chrono::Utc::now(),
        })
    }

    /// Create the claim, replacing a stale one with the same name once.
    ///
    /// Returns whether the stale claim had to be replaced.
    async fn create_or_replace(
        &self,
        namespace: &str,
        name: &str,
        claim: &PersistentVolumeClaim,
    ) -> Result<bool> {
        match self.store.create_claim(namespace, claim).await {
            Ok(_) => return Ok(false),
            Err(e) if e.is_already_exists() => {
                warn!(claim = %name, namespace, "PVC already exists, deleting stale claim");
            }
            Err(e) => return Err(e),
        }

        match self.store.delete_claim(namespace, name).await {
            Ok(()) => {}
            Err(e) if e.is_not_found() => {
                debug!(claim = %name, namespace, "Stale PVC already gone");
            }
            Err(e) => return Err(e),
        }

        match self.store.create_claim(namespace, claim).await {
            Ok(_) => {
                info!(claim = %name, namespace, "Recreated PVC after removing stale claim");
                Ok(true)
            }
            Err(e) if e.is_already_exists() => Err(Error::UnresolvableConflict {
                name: name.to_string(),
            }),
            Err(e) => Err(e),
        }
    }

    /// Poll the claim until Bound. Returns the number of checks issued.
    async fn wait_bound(&self, namespace: &str, name: &str) -> Result<u32> {
        let store = &self.store;

        let outcome = retry(&self.config.retry, move |attempt| async move {
            let claim = store.get_claim(namespace, name).await?;
            let phase = ClaimPhase::of(&claim);
            debug!(claim = %name, namespace, attempt, %phase, "Checked PVC phase");

            Ok::<_, Error>(match phase {
                ClaimPhase::Bound => Check::Ready(()),
                other => Check::NotReady(other),
            })
        })
        .await?;

        match outcome {
            Retried::Ready { attempts, .. } => Ok(attempts),
            Retried::Exhausted { last, attempts } => Err(Error::BindTimeout {
                name: name.to_string(),
                last_phase: last.unwrap_or(ClaimPhase::Unknown),
                attempts,
            }),
        }
    }
}

fn validate_request(request: &VolumeClaimRequest) -> Result<()> {
    if request.cluster_id.is_empty() {
        return Err(Error::InvalidRequest("cluster id must not be empty".into()));
    }
    if request.namespace.is_empty() {
        return Err(Error::InvalidRequest("namespace must not be empty".into()));
    }
    if request.size_mib <= 0 {
        return Err(Error::InvalidRequest(format!(
            "volume size must be positive, got {} MiB",
            request.size_mib
        )));
    }
    Ok(())
}
