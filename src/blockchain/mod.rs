pub mod block;
pub mod canonical;
pub mod model;
pub mod proof;
pub mod shared;

pub use block::{Block, PreviousHash};
pub use model::Blockchain;
pub use proof::{CancelToken, ProofSearch, is_valid_proof, proof_of_work_search};
pub use shared::SharedBlockchain;

/// Hex prefix a proof digest must start with. Fixed; not a tunable difficulty.
pub const POW_PREFIX: &str = "0000";

/// `previous_hash` of the genesis block.
pub const GENESIS_PREVIOUS_HASH: u64 = 1;

/// `proof` of the genesis block (never searched for).
pub const GENESIS_PROOF: u64 = 100;
