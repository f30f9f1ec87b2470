use super::machine::PurchaseMachine;
use crate::error::Result;
use async_trait::async_trait;
use std::sync::Arc;

/// Registry of machine instances keyed by opaque identifiers.
///
/// A store hands out shared references; it never mutates a machine itself.
#[async_trait]
pub trait MachineStore: Send + Sync {
    /// Registers `machine` under a fresh identifier and returns it.
    async fn save(&self, machine: PurchaseMachine) -> Result<String>;
    /// Fails with `VendingError::MachineNotFound` for unknown identifiers.
    async fn get(&self, id: &str) -> Result<Arc<PurchaseMachine>>;
    async fn len(&self) -> Result<usize>;
}

pub type MachineStoreBox = Box<dyn MachineStore>;
