use super::item::{Inventory, Item};
use crate::error::MachineError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// The observable name of a machine state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StateKind {
    /// Ready to accept funds.
    Idle,
    /// Funds inserted, ready to select a product.
    Selecting,
    /// Product selected, ready to deliver it.
    Delivering,
}

impl fmt::Display for StateKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            StateKind::Idle => "Idle",
            StateKind::Selecting => "Selecting",
            StateKind::Delivering => "Delivering",
        };
        f.write_str(name)
    }
}

/// Operations that are only legal in one state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    InsertFunds,
    SelectProduct,
    Deliver,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Operation::InsertFunds => "insert funds",
            Operation::SelectProduct => "select product",
            Operation::Deliver => "deliver product",
        };
        f.write_str(name)
    }
}

// The inserted amount and selected product live inside the variants, so they
// cannot be set in a state that does not own them.
#[derive(Debug, Clone, PartialEq, Eq)]
enum State {
    Idle,
    Selecting { inserted: i64 },
    Delivering { inserted: i64, product: String },
}

impl State {
    fn kind(&self) -> StateKind {
        match self {
            State::Idle => StateKind::Idle,
            State::Selecting { .. } => StateKind::Selecting,
            State::Delivering { .. } => StateKind::Delivering,
        }
    }
}

/// A single step of the purchase protocol.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    InsertFunds(i64),
    SelectProduct(String),
    Deliver,
    Abort,
}

/// Receipt of a successful delivery.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Delivery {
    pub product: String,
    pub price: u32,
    /// Inserted amount minus the price.
    pub balance: i64,
}

/// What a successfully applied command did.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Outcome {
    FundsInserted { amount: i64 },
    ProductSelected { product: String },
    Delivered(Delivery),
    Aborted,
}

/// Loosely typed input for [`PurchaseMachine::transit`].
///
/// Which field is required depends on the state the machine is in when the
/// input arrives.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransitionInput {
    #[serde(default)]
    pub inserted_amount: Option<i64>,
    #[serde(default)]
    pub selected_product: Option<String>,
}

impl TransitionInput {
    pub fn insert(amount: i64) -> Self {
        Self {
            inserted_amount: Some(amount),
            selected_product: None,
        }
    }

    pub fn select(product: impl Into<String>) -> Self {
        Self {
            inserted_amount: None,
            selected_product: Some(product.into()),
        }
    }
}

/// A consistent copy of a machine's fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    pub state: StateKind,
    pub inserted_amount: Option<i64>,
    pub selected_product: Option<String>,
    pub inventory: Vec<Item>,
}

#[derive(Debug)]
struct Session {
    state: State,
    inventory: Inventory,
}

impl Session {
    fn bad_state(&self, operation: Operation) -> MachineError {
        MachineError::BadState {
            operation,
            state: self.state.kind(),
        }
    }

    fn apply(&mut self, command: Command) -> Result<Outcome, MachineError> {
        match command {
            Command::InsertFunds(amount) => self
                .insert_funds(amount)
                .map(|()| Outcome::FundsInserted { amount }),
            Command::SelectProduct(product) => {
                self.select_product(&product)?;
                Ok(Outcome::ProductSelected { product })
            }
            Command::Deliver => self.deliver().map(Outcome::Delivered),
            Command::Abort => {
                self.abort();
                Ok(Outcome::Aborted)
            }
        }
    }

    fn resolve(&self, input: TransitionInput) -> Result<Command, MachineError> {
        match self.state {
            State::Idle => input
                .inserted_amount
                .map(Command::InsertFunds)
                .ok_or(MachineError::MissingInput("inserted_amount")),
            State::Selecting { .. } => input
                .selected_product
                .map(Command::SelectProduct)
                .ok_or(MachineError::MissingInput("selected_product")),
            State::Delivering { .. } => Ok(Command::Deliver),
        }
    }

    fn insert_funds(&mut self, amount: i64) -> Result<(), MachineError> {
        if self.state != State::Idle {
            return Err(self.bad_state(Operation::InsertFunds));
        }

        self.state = State::Selecting { inserted: amount };
        Ok(())
    }

    fn select_product(&mut self, name: &str) -> Result<(), MachineError> {
        let State::Selecting { inserted } = self.state else {
            return Err(self.bad_state(Operation::SelectProduct));
        };

        let item = self
            .inventory
            .get(name)
            .ok_or_else(|| MachineError::InvalidProduct(name.to_string()))?;

        if item.count < 1 {
            return Err(MachineError::OutOfStock(item.name.clone()));
        }

        if inserted < i64::from(item.price) {
            return Err(MachineError::InsufficientFunds {
                product: item.name.clone(),
                price: item.price,
                inserted,
            });
        }

        self.state = State::Delivering {
            inserted,
            product: name.to_string(),
        };
        Ok(())
    }

    fn deliver(&mut self) -> Result<Delivery, MachineError> {
        let State::Delivering { inserted, product } = &self.state else {
            return Err(self.bad_state(Operation::Deliver));
        };

        // Selection already checked all of this under the same lock discipline.
        let item = self.inventory.get_mut(product).ok_or_else(|| {
            MachineError::Internal(format!("selected product {product:?} is not in the inventory"))
        })?;
        let remaining = item.count.checked_sub(1).ok_or_else(|| {
            MachineError::Internal(format!("selected product {product:?} has no stock left"))
        })?;
        let balance = inserted
            .checked_sub(i64::from(item.price))
            .filter(|balance| *balance >= 0)
            .ok_or_else(|| {
                MachineError::Internal(format!(
                    "inserted amount {inserted} does not cover {product:?} at {}",
                    item.price
                ))
            })?;

        item.count = remaining;
        let delivery = Delivery {
            product: product.clone(),
            price: item.price,
            balance,
        };
        self.state = State::Idle;

        Ok(delivery)
    }

    fn abort(&mut self) {
        self.state = State::Idle;
    }

    fn inserted_amount(&self) -> Option<i64> {
        match self.state {
            State::Idle => None,
            State::Selecting { inserted } | State::Delivering { inserted, .. } => Some(inserted),
        }
    }

    fn selected_product(&self) -> Option<&str> {
        match &self.state {
            State::Delivering { product, .. } => Some(product.as_str()),
            _ => None,
        }
    }

    fn snapshot(&self) -> Snapshot {
        Snapshot {
            state: self.state.kind(),
            inserted_amount: self.inserted_amount(),
            selected_product: self.selected_product().map(str::to_string),
            inventory: self.inventory.items(),
        }
    }
}

/// The purchase state machine of a single vending machine.
///
/// ```text
/// Idle --insert_funds--> Selecting --select_product--> Delivering --deliver--> Idle
///   ^                        |                              |
///   +--------- abort --------+------------------------------+
/// ```
///
/// Every method takes the machine's lock for exactly one call, so concurrent
/// callers observe the operations in some serial order. Failed calls change
/// nothing.
#[derive(Debug)]
pub struct PurchaseMachine {
    session: Mutex<Session>,
}

impl PurchaseMachine {
    /// Builds an idle machine. Later items win when names repeat.
    pub fn new(items: impl IntoIterator<Item = Item>) -> Self {
        Self {
            session: Mutex::new(Session {
                state: State::Idle,
                inventory: items.into_iter().collect(),
            }),
        }
    }

    // Mutations validate before writing, so the data behind a poisoned lock
    // is still consistent.
    fn lock(&self) -> MutexGuard<'_, Session> {
        self.session.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Starts a purchase session with `amount`.
    pub fn insert_funds(&self, amount: i64) -> Result<(), MachineError> {
        self.lock().insert_funds(amount)
    }

    /// Chooses a product. The inserted amount is not consumed until delivery.
    pub fn select_product(&self, name: &str) -> Result<(), MachineError> {
        self.lock().select_product(name)
    }

    /// Hands out the selected product and returns to `Idle`.
    pub fn deliver(&self) -> Result<Delivery, MachineError> {
        self.lock().deliver()
    }

    /// Discards the current session from any state.
    pub fn abort(&self) {
        self.lock().abort();
    }

    /// Applies one command through the transition function.
    pub fn apply(&self, command: Command) -> Result<Outcome, MachineError> {
        self.lock().apply(command)
    }

    /// Applies whichever operation the current state expects, reading its
    /// argument from `input`.
    pub fn transit(&self, input: TransitionInput) -> Result<Outcome, MachineError> {
        let mut session = self.lock();
        let command = session.resolve(input)?;
        session.apply(command)
    }

    pub fn state(&self) -> StateKind {
        self.lock().state.kind()
    }

    pub fn inserted_amount(&self) -> Option<i64> {
        self.lock().inserted_amount()
    }

    pub fn selected_product(&self) -> Option<String> {
        self.lock().selected_product().map(str::to_string)
    }

    /// A copy of the named item.
    pub fn item(&self, name: &str) -> Option<Item> {
        self.lock().inventory.get(name).cloned()
    }

    pub fn snapshot(&self) -> Snapshot {
        self.lock().snapshot()
    }
}
