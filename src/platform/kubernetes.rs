//! Kubernetes Resource Store
//!
//! Talks to the API server through `kube::Api`. Conflict (409) and
//! not-found (404) responses are normalized to the structured errors the
//! provisioning protocol branches on; everything else stays a
//! [`kube::Error`].

use crate::domain::ports::ResourceStore;
use crate::error::{Error, Result};
use async_trait::async_trait;
use k8s_openapi::api::core::v1::PersistentVolumeClaim;
use k8s_openapi::api::storage::v1::StorageClass;
use kube::api::{Api, DeleteParams, PostParams};
use kube::Client;
use tracing::debug;

const STORAGE_CLASS_KIND: &str = "StorageClass";
const CLAIM_KIND: &str = "PersistentVolumeClaim";

/// Resource store backed by the Kubernetes API server
#[derive(Clone)]
pub struct KubeResourceStore {
    client: Client,
}

impl KubeResourceStore {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Connect using the in-cluster or kubeconfig defaults
    pub async fn try_default() -> Result<Self> {
        Ok(Self::new(Client::try_default().await?))
    }

    fn claims(&self, namespace: &str) -> Api<PersistentVolumeClaim> {
        Api::namespaced(self.client.clone(), namespace)
    }
}

/// Map an API error onto the structured store outcomes
pub fn map_api_error(err: kube::Error, kind: &str, name: &str) -> Error {
    match err {
        kube::Error::Api(ref resp) if resp.code == 409 => Error::ResourceExists {
            kind: kind.into(),
            name: name.into(),
        },
        kube::Error::Api(ref resp) if resp.code == 404 => Error::ResourceNotFound {
            kind: kind.into(),
            name: name.into(),
        },
        other => Error::Kube(other),
    }
}

fn name_of(name: Option<&String>) -> &str {
    name.map(String::as_str).unwrap_or_default()
}

#[async_trait]
impl ResourceStore for KubeResourceStore {
    async fn create_storage_class(&self, class: &StorageClass) -> Result<StorageClass> {
        let api: Api<StorageClass> = Api::all(self.client.clone());
        let name = name_of(class.metadata.name.as_ref());

        api.create(&PostParams::default(), class)
            .await
            .map_err(|e| map_api_error(e, STORAGE_CLASS_KIND, name))
    }

    async fn create_claim(
        &self,
        namespace: &str,
        claim: &PersistentVolumeClaim,
    ) -> Result<PersistentVolumeClaim> {
        let name = name_of(claim.metadata.name.as_ref());
        debug!(claim = %name, namespace, "POST PersistentVolumeClaim");

        self.claims(namespace)
            .create(&PostParams::default(), claim)
            .await
            .map_err(|e| map_api_error(e, CLAIM_KIND, name))
    }

    async fn get_claim(&self, namespace: &str, name: &str) -> Result<PersistentVolumeClaim> {
        self.claims(namespace)
            .get(name)
            .await
            .map_err(|e| map_api_error(e, CLAIM_KIND, name))
    }

    async fn delete_claim(&self, namespace: &str, name: &str) -> Result<()> {
        debug!(claim = %name, namespace, "DELETE PersistentVolumeClaim");

        self.claims(namespace)
            .delete(name, &DeleteParams::default())
            .await
            .map(|_| ())
            .map_err(|e| map_api_error(e, CLAIM_KIND, name))
    }

    fn store_name(&self) -> &str {
        "kubernetes"
    }
}
