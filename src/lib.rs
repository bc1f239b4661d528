//! Append-only transaction ledger with hash-linked blocks and a
//! proof-of-work gate on every block after genesis.

pub mod blockchain;
pub mod config;
pub mod error;
pub mod transaction;

pub use blockchain::{Block, Blockchain, PreviousHash, ProofSearch, SharedBlockchain};
pub use error::{LedgerError, Result};
pub use transaction::{Amount, Transaction};
