//! Economy engine: account records, transaction operations, settlement
//! sweeps, and the JSON document store.
//!
//! The engine itself is synchronous and does no I/O except through
//! [`store::JsonStore`]; serialization of concurrent writers is the caller's
//! responsibility (the API layer puts the whole ledger behind one lock).

pub mod ledger;
pub mod ops;
pub mod sampling;
pub mod settlement;
pub mod store;

pub use ledger::Ledger;
pub use ops::{LedgerError, OpReceipt};
pub use store::{JsonStore, StoreError};
