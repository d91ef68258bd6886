//! Data Storage Class Ensurer
//!
//! Creates the storage class a provisioner's data claims reference. The
//! class name is derived from the provisioner, so repeated calls target the
//! same object.

use crate::config::ProvisionerConfig;
use crate::domain::ports::{ResourceStoreRef, StorageClassDescriptor};
use crate::error::{Error, Result};
use crate::provisioning::naming::storage_class_name;
use k8s_openapi::api::storage::v1::StorageClass;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use tracing::{debug, info};

/// Issues the single create for a provisioner's data storage class
pub struct StorageClassEnsurer {
    store: ResourceStoreRef,
    prefix: String,
}

impl StorageClassEnsurer {
    pub fn new(store: ResourceStoreRef, config: &ProvisionerConfig) -> Self {
        Self {
            store,
            prefix: config.storage_class_prefix.clone(),
        }
    }

    /// Derive the class for a provisioner without touching the store
    pub fn descriptor(&self, provisioner_id: &str) -> Result<StorageClassDescriptor> {
        if provisioner_id.is_empty() {
            return Err(Error::InvalidProvisioner(provisioner_id.to_string()));
        }
        Ok(StorageClassDescriptor {
            name: storage_class_name(&self.prefix, provisioner_id)?,
            provisioner_id: provisioner_id.to_string(),
        })
    }

    /// Create the storage class for `provisioner_id`.
    ///
    /// Reports the raw create outcome: an existing class surfaces as
    /// [`Error::ResourceExists`]. Use [`ensure_storage_class_idempotent`]
    /// to treat that as success.
    ///
    /// [`ensure_storage_class_idempotent`]: Self::ensure_storage_class_idempotent
    pub async fn ensure_storage_class(&self, provisioner_id: &str) -> Result<StorageClassDescriptor> {
        let descriptor = self.descriptor(provisioner_id)?;
        self.create(&descriptor).await?;
        Ok(descriptor)
    }

    /// Like [`ensure_storage_class`](Self::ensure_storage_class), but an
    /// already-existing class counts as success.
    pub async fn ensure_storage_class_idempotent(
        &self,
        provisioner_id: &str,
    ) -> Result<StorageClassDescriptor> {
        let descriptor = self.descriptor(provisioner_id)?;
        match self.create(&descriptor).await {
            Ok(()) => Ok(descriptor),
            Err(e) if e.is_already_exists() => {
                debug!(class = %descriptor.name, "Data storage class already exists");
                Ok(descriptor)
            }
            Err(e) => Err(e),
        }
    }

    async fn create(&self, descriptor: &StorageClassDescriptor) -> Result<()> {
        info!(
            class = %descriptor.name,
            provisioner = %descriptor.provisioner_id,
            store = self.store.store_name(),
            "Creating data storage class"
        );

        self.store
            .create_storage_class(&build_storage_class(descriptor))
            .await?;
        Ok(())
    }
}

/// Build the StorageClass object for a descriptor
pub fn build_storage_class(descriptor: &StorageClassDescriptor) -> StorageClass {
    StorageClass {
        metadata: ObjectMeta {
            name: Some(descriptor.name.clone()),
            ..Default::default()
        },
        provisioner: descriptor.provisioner_id.clone(),
        ..Default::default()
    }
}
