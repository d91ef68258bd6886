//! Resource Store Adapters
//!
//! Provides implementations of the resource store port for:
//! - Kubernetes (API server via kube-rs)
//! - In-memory (standalone runs, no cluster)

pub mod kubernetes;
pub mod memory;

pub use kubernetes::*;
pub use memory::*;

use crate::domain::ports::ResourceStoreRef;
use crate::error::Result;
use std::sync::Arc;

/// Factory for creating resource stores
pub struct StoreFactory;

impl StoreFactory {
    /// Connect to Kubernetes, or use an in-memory store in standalone mode.
    ///
    /// `bind_after` only applies to the in-memory store.
    pub async fn create(standalone: bool, bind_after: u32) -> Result<ResourceStoreRef> {
        if standalone {
            Ok(Arc::new(MemoryResourceStore::new().with_bind_after(bind_after)))
        } else {
            Ok(Arc::new(KubeResourceStore::try_default().await?))
        }
    }
}
