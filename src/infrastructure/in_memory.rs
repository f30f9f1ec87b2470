use crate::domain::machine::PurchaseMachine;
use crate::domain::ports::MachineStore;
use crate::error::{Result, VendingError};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

/// A thread-safe in-memory machine registry.
///
/// Uses `Arc<RwLock<HashMap<String, Arc<PurchaseMachine>>>>` so lookups run
/// concurrently while identifier allocation is exclusive. Machines are lost
/// when the process exits.
#[derive(Default, Clone)]
pub struct InMemoryMachineStore {
    machines: Arc<RwLock<HashMap<String, Arc<PurchaseMachine>>>>,
}

impl InMemoryMachineStore {
    /// Creates a new, empty in-memory store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl MachineStore for InMemoryMachineStore {
    async fn save(&self, machine: PurchaseMachine) -> Result<String> {
        let mut machines = self.machines.write().await;

        let mut id = Uuid::new_v4().to_string();
        while machines.contains_key(&id) {
            id = Uuid::new_v4().to_string();
        }

        machines.insert(id.clone(), Arc::new(machine));
        Ok(id)
    }

    async fn get(&self, id: &str) -> Result<Arc<PurchaseMachine>> {
        let machines = self.machines.read().await;
        machines
            .get(id)
            .cloned()
            .ok_or_else(|| VendingError::MachineNotFound(id.to_string()))
    }

    async fn len(&self) -> Result<usize> {
        Ok(self.machines.read().await.len())
    }
}
