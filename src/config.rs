use std::env;
use std::str::FromStr;

use crate::blockchain::ProofSearch;
use crate::error::{LedgerError, Result};

pub const DEFAULT_BLOCKS: u64 = 3;

/// Settings for the local mining driver, read from the environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MinerConfig {
    /// `LEDGER_BLOCKS`: how many blocks to mine.
    pub blocks: u64,
    /// `LEDGER_MAX_ITERATIONS`: optional cap on proof candidates per block.
    pub max_iterations: Option<u64>,
}

impl Default for MinerConfig {
    fn default() -> Self {
        Self {
            blocks: DEFAULT_BLOCKS,
            max_iterations: None,
        }
    }
}

impl MinerConfig {
    /// Load `.env` (if any) and read the process environment.
    pub fn from_env() -> Result<Self> {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let blocks = parse_var(&lookup, "LEDGER_BLOCKS")?.unwrap_or(DEFAULT_BLOCKS);
        let max_iterations = parse_var(&lookup, "LEDGER_MAX_ITERATIONS")?;
        Ok(Self {
            blocks,
            max_iterations,
        })
    }

    pub fn proof_search(&self) -> ProofSearch {
        match self.max_iterations {
            Some(cap) => ProofSearch::new().max_iterations(cap),
            None => ProofSearch::new(),
        }
    }
}

fn parse_var<T, F>(lookup: &F, key: &str) -> Result<Option<T>>
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| LedgerError::Config(format!("{key}={raw:?} is not a valid number"))),
        _ => Ok(None),
    }
}
