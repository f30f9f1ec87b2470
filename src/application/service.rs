use crate::domain::item::Item;
use crate::domain::machine::{Delivery, Outcome, PurchaseMachine, Snapshot, TransitionInput};
use crate::domain::ports::MachineStoreBox;
use crate::error::Result;

/// Entry point for every request against the registered machines.
///
/// `VendingService` resolves machine identifiers through its store and then
/// calls exactly one machine operation per method (except [`purchase`],
/// which calls two). Machine locks are never held across calls.
///
/// [`purchase`]: VendingService::purchase
pub struct VendingService {
    store: MachineStoreBox,
}

impl VendingService {
    /// Creates a new `VendingService` backed by `store`.
    pub fn new(store: MachineStoreBox) -> Self {
        Self { store }
    }

    /// Builds an idle machine from `inventory` and registers it.
    pub async fn add_machine(&self, inventory: Vec<Item>) -> Result<String> {
        let items = inventory.len();
        let id = self.store.save(PurchaseMachine::new(inventory)).await?;
        tracing::info!(machine_id = %id, items, "registered machine");
        Ok(id)
    }

    pub async fn insert_funds(&self, id: &str, amount: i64) -> Result<()> {
        let machine = self.store.get(id).await?;
        machine.insert_funds(amount)?;
        tracing::debug!(machine_id = %id, amount, "funds inserted");
        Ok(())
    }

    pub async fn select_product(&self, id: &str, product: &str) -> Result<()> {
        let machine = self.store.get(id).await?;
        machine.select_product(product)?;
        tracing::debug!(machine_id = %id, product, "product selected");
        Ok(())
    }

    pub async fn deliver(&self, id: &str) -> Result<Delivery> {
        let machine = self.store.get(id).await?;
        let delivery = machine.deliver()?;
        tracing::info!(
            machine_id = %id,
            product = %delivery.product,
            balance = delivery.balance,
            "product delivered"
        );
        Ok(delivery)
    }

    /// Selects `product` and delivers it right away.
    ///
    /// These are two separate machine operations. An abort that lands in
    /// between makes the delivery fail with a bad state error.
    pub async fn purchase(&self, id: &str, product: &str) -> Result<Delivery> {
        let machine = self.store.get(id).await?;
        machine.select_product(product)?;
        let delivery = machine.deliver()?;
        tracing::info!(
            machine_id = %id,
            product = %delivery.product,
            balance = delivery.balance,
            "product purchased"
        );
        Ok(delivery)
    }

    pub async fn abort(&self, id: &str) -> Result<()> {
        let machine = self.store.get(id).await?;
        machine.abort();
        tracing::debug!(machine_id = %id, "session aborted");
        Ok(())
    }

    /// Applies the operation the machine's current state expects.
    pub async fn transit(&self, id: &str, input: TransitionInput) -> Result<(Outcome, Snapshot)> {
        let machine = self.store.get(id).await?;
        let outcome = machine.transit(input)?;
        let snapshot = machine.snapshot();
        tracing::debug!(machine_id = %id, ?outcome, state = %snapshot.state, "transitioned");
        Ok((outcome, snapshot))
    }

    pub async fn snapshot(&self, id: &str) -> Result<Snapshot> {
        Ok(self.store.get(id).await?.snapshot())
    }
}
