//! Provisioning Module
//!
//! Storage-class creation and the per-member claim protocol:
//! create, recover from a stale claim, then wait for the volume to bind.

pub mod claim;
pub mod naming;
pub mod retry;
pub mod storage_class;

pub use claim::*;
pub use naming::*;
pub use retry::*;
pub use storage_class::*;
