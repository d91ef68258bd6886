//! etcd Storage Provisioner
//!
//! Provisions durable, per-member data volumes for etcd clusters running on
//! Kubernetes.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────┐
//! │                        Provisioning                              │
//! │  ┌─────────────────────────┐   ┌──────────────────────────────┐  │
//! │  │   StorageClassEnsurer   │   │       ClaimProvisioner       │  │
//! │  │  etcd-<provisioner>     │   │ create ─► replace ─► poll    │  │
//! │  └────────────┬────────────┘   └──────────────┬───────────────┘  │
//! │               └───────────────┬───────────────┘                  │
//! │                     ┌─────────┴─────────┐                        │
//! │                     │   ResourceStore   │                        │
//! │                     └─────────┬─────────┘                        │
//! ├───────────────────────────────┼──────────────────────────────────┤
//! │        ┌──────────────────────┴─────────────────────┐            │
//! │        │  Kubernetes (kube-rs)   │   In-memory      │            │
//! │        └────────────────────────────────────────────┘            │
//! └──────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Modules
//!
//! - [`provisioning`]: Storage-class ensurer, claim provisioner, naming, bounded retry
//! - [`platform`]: Resource store adapters
//! - [`domain`]: Core domain types and the store port
//! - [`config`]: Provisioner configuration
//! - [`error`]: Error types and handling

pub mod config;
pub mod domain;
pub mod error;
pub mod platform;
pub mod provisioning;

// Re-export commonly used types
pub use config::ProvisionerConfig;

pub use domain::ports::{
    ClaimOutcome, ClaimPhase, ResourceStore, ResourceStoreRef, StorageClassDescriptor,
    VolumeClaimRequest,
};

pub use error::{Error, ErrorAction, Result};

pub use platform::{KubeResourceStore, MemoryResourceStore, StoreFactory};

pub use provisioning::{
    data_pvc_name, storage_class_name, ClaimProvisioner, RetryBudget, StorageClassEnsurer,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");
