//! In-Memory Resource Store
//!
//! Keeps storage classes and claims in process and plays the part of the
//! volume binder: a claim reports `Pending` until it has been observed a
//! configurable number of times, then `Bound`. Used for standalone runs.

use crate::domain::ports::ResourceStore;
use crate::error::{Error, Result};
use async_trait::async_trait;
use k8s_openapi::api::core::v1::{PersistentVolumeClaim, PersistentVolumeClaimStatus};
use k8s_openapi::api::storage::v1::StorageClass;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::Time;
use parking_lot::RwLock;
use std::collections::BTreeMap;
use tracing::debug;

const STORAGE_CLASS_KIND: &str = "StorageClass";
const CLAIM_KIND: &str = "PersistentVolumeClaim";

#[derive(Debug, Clone)]
struct StoredClaim {
    claim: PersistentVolumeClaim,
    observations: u32,
}

/// Resource store backed by in-process maps
pub struct MemoryResourceStore {
    /// Observations after which a claim reports Bound
    bind_after: u32,
    classes: RwLock<BTreeMap<String, StorageClass>>,
    /// Claims keyed by (namespace, name)
    claims: RwLock<BTreeMap<(String, String), StoredClaim>>,
}

impl Default for MemoryResourceStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryResourceStore {
    pub fn new() -> Self {
        Self {
            bind_after: 1,
            classes: RwLock::new(BTreeMap::new()),
            claims: RwLock::new(BTreeMap::new()),
        }
    }

    /// Report Bound on the `observations`-th get of a claim. Zero never binds.
    pub fn with_bind_after(mut self, observations: u32) -> Self {
        self.bind_after = observations;
        self
    }

    pub fn storage_class(&self, name: &str) -> Option<StorageClass> {
        self.classes.read().get(name).cloned()
    }

    pub fn storage_class_count(&self) -> usize {
        self.classes.read().len()
    }

    /// Current state of a claim, without counting as an observation
    pub fn claim(&self, namespace: &str, name: &str) -> Option<PersistentVolumeClaim> {
        self.claims
            .read()
            .get(&key(namespace, name))
            .map(|stored| stored.claim.clone())
    }

    pub fn claim_count(&self) -> usize {
        self.claims.read().len()
    }
}

fn key(namespace: &str, name: &str) -> (String, String) {
    (namespace.to_string(), name.to_string())
}

fn set_phase(claim: &mut PersistentVolumeClaim, phase: &str) {
    claim
        .status
        .get_or_insert_with(PersistentVolumeClaimStatus::default)
        .phase = Some(phase.to_string());
}

fn object_name(name: Option<&String>, kind: &str) -> Result<String> {
    name.cloned()
        .ok_or_else(|| Error::Internal(format!("{} without metadata.name", kind)))
}

#[async_trait]
impl ResourceStore for MemoryResourceStore {
    async fn create_storage_class(&self, class: &StorageClass) -> Result<StorageClass> {
        let name = object_name(class.metadata.name.as_ref(), STORAGE_CLASS_KIND)?;

        let mut classes = self.classes.write();
        if classes.contains_key(&name) {
            return Err(Error::ResourceExists {
                kind: STORAGE_CLASS_KIND.into(),
                name,
            });
        }

        let mut created = class.clone();
        created.metadata.creation_timestamp = Some(Time(chrono::Utc::now()));
        classes.insert(name, created.clone());
        Ok(created)
    }

    async fn create_claim(
        &self,
        namespace: &str,
        claim: &PersistentVolumeClaim,
    ) -> Result<PersistentVolumeClaim> {
        let name = object_name(claim.metadata.name.as_ref(), CLAIM_KIND)?;

        let mut claims = self.claims.write();
        let key = key(namespace, &name);
        if claims.contains_key(&key) {
            return Err(Error::ResourceExists {
                kind: CLAIM_KIND.into(),
                name,
            });
        }

        let mut created = claim.clone();
        created.metadata.namespace = Some(namespace.to_string());
        created.metadata.creation_timestamp = Some(Time(chrono::Utc::now()));
        set_phase(&mut created, "Pending");

        debug!(claim = %name, namespace, "Stored PVC");
        claims.insert(
            key,
            StoredClaim {
                claim: created.clone(),
                observations: 0,
            },
        );
        Ok(created)
    }

    async fn get_claim(&self, namespace: &str, name: &str) -> Result<PersistentVolumeClaim> {
        let mut claims = self.claims.write();
        let stored = claims
            .get_mut(&key(namespace, name))
            .ok_or_else(|| Error::ResourceNotFound {
                kind: CLAIM_KIND.into(),
                name: name.into(),
            })?;

        stored.observations += 1;
        if self.bind_after > 0 && stored.observations >= self.bind_after {
            set_phase(&mut stored.claim, "Bound");
        }
        Ok(stored.claim.clone())
    }

    async fn delete_claim(&self, namespace: &str, name: &str) -> Result<()> {
        match self.claims.write().remove(&key(namespace, name)) {
            Some(_) => Ok(()),
            None => Err(Error::ResourceNotFound {
                kind: CLAIM_KIND.into(),
                name: name.into(),
            }),
        }
    }

    fn store_name(&self) -> &str {
        "memory"
    }
}
