use chrono::Utc;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use super::canonical::to_canonical_string;
use super::{GENESIS_PREVIOUS_HASH, GENESIS_PROOF};
use crate::error::Result;
use crate::transaction::Transaction;

/// Link to the parent block: the genesis sentinel or the parent's digest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PreviousHash {
    Sentinel(u64),
    Digest(String),
}

impl PreviousHash {
    pub fn genesis() -> Self {
        PreviousHash::Sentinel(GENESIS_PREVIOUS_HASH)
    }

    pub fn is_genesis(&self) -> bool {
        matches!(self, PreviousHash::Sentinel(v) if *v == GENESIS_PREVIOUS_HASH)
    }
}

impl From<String> for PreviousHash {
    fn from(digest: String) -> Self {
        PreviousHash::Digest(digest)
    }
}

impl From<&str> for PreviousHash {
    fn from(digest: &str) -> Self {
        PreviousHash::Digest(digest.to_string())
    }
}

/// A single block in the ledger.
///
/// Fields are declared in lexicographic order so that the derived
/// `Serialize` output is the canonical preimage of [`Block::hash`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Block {
    pub index: u64,
    pub previous_hash: PreviousHash,
    pub proof: u64,
    pub timestamp: f64, // seconds since the Unix epoch (UTC)
    pub transactions: Vec<Transaction>,
}

impl Block {
    /// First block of every chain. Its proof is a sentinel, not a PoW result.
    pub fn genesis() -> Self {
        Self::new(1, GENESIS_PROOF, PreviousHash::genesis(), Vec::new())
    }

    /// Build a block stamped with the current wall-clock time.
    pub fn new(
        index: u64,
        proof: u64,
        previous_hash: PreviousHash,
        transactions: Vec<Transaction>,
    ) -> Self {
        Self {
            index,
            previous_hash,
            proof,
            timestamp: now_seconds(),
            transactions,
        }
    }

    /// Compact, key-sorted, ASCII-only JSON: the exact bytes fed to SHA-256.
    pub fn canonical_json(&self) -> Result<String> {
        to_canonical_string(self)
    }

    /// Lowercase hex SHA-256 of [`Block::canonical_json`] (64 chars).
    pub fn hash(&self) -> Result<String> {
        let json = self.canonical_json()?;
        Ok(sha256_hex(json.as_bytes()))
    }
}

pub(crate) fn sha256_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}

fn now_seconds() -> f64 {
    Utc::now().timestamp_micros() as f64 / 1_000_000.0
}
