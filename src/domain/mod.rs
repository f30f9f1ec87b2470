//! Domain layer: the purchase state machine, its inventory, and the storage
//! port that the rest of the application depends on.

pub mod item;
pub mod machine;
pub mod ports;
