//! Application layer containing the request orchestration.
//!
//! This module defines the `VendingService` which acts as the primary entry point
//! for operating on registered machines. It resolves identifiers through the
//! injected `MachineStore` and forwards each request to a single machine.

pub mod service;
