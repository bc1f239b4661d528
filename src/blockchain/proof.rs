use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use log::debug;

use super::POW_PREFIX;
use super::block::sha256_hex;
use crate::error::{LedgerError, Result};

/// How many candidates are tried between two reads of the cancel flag.
pub const CANCEL_CHECK_INTERVAL: u64 = 1024;

/// True when SHA-256 of `"{proof}{last_proof}"` starts with [`POW_PREFIX`].
/// The candidate comes first in the preimage.
pub fn is_valid_proof(last_proof: u64, proof: u64) -> bool {
    let guess = format!("{proof}{last_proof}");
    sha256_hex(guess.as_bytes()).starts_with(POW_PREFIX)
}

/// Smallest proof valid against `last_proof`. Blocks until found.
pub fn proof_of_work_search(last_proof: u64) -> u64 {
    let mut proof = 0u64;
    while !is_valid_proof(last_proof, proof) {
        proof += 1;
    }
    debug!("POW - found proof {proof} for last_proof {last_proof}");
    proof
}

/// Shared flag used to abort a running [`ProofSearch`] from another thread.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Proof search with an optional iteration cap and cancel token.
/// Without either it is equivalent to [`proof_of_work_search`].
#[derive(Debug, Clone, Default)]
pub struct ProofSearch {
    max_iterations: Option<u64>,
    cancel: Option<CancelToken>,
}

impl ProofSearch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn max_iterations(mut self, cap: u64) -> Self {
        self.max_iterations = Some(cap);
        self
    }

    pub fn cancel_token(mut self, token: CancelToken) -> Self {
        self.cancel = Some(token);
        self
    }

    /// Run the search from proof 0 upwards.
    pub fn run(&self, last_proof: u64) -> Result<u64> {
        let mut proof = 0u64;
        loop {
            if let Some(cap) = self.max_iterations {
                if proof >= cap {
                    debug!("POW - gave up after {proof} attempts (last_proof {last_proof})");
                    return Err(LedgerError::SearchExhausted { tried: proof });
                }
            }
            if proof % CANCEL_CHECK_INTERVAL == 0 {
                if let Some(token) = &self.cancel {
                    if token.is_cancelled() {
                        debug!("POW - cancelled after {proof} attempts");
                        return Err(LedgerError::SearchCancelled { tried: proof });
                    }
                }
            }
            if is_valid_proof(last_proof, proof) {
                debug!("POW - found proof {proof} for last_proof {last_proof}");
                return Ok(proof);
            }
            proof += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{CancelToken, ProofSearch, is_valid_proof, proof_of_work_search};
    use crate::blockchain::block::sha256_hex;
    use crate::error::LedgerError;

    #[test]
    fn predicate_matches_digest_prefix() {
        for proof in 0..2_000u64 {
            let digest = sha256_hex(format!("{proof}100").as_bytes());
            assert_eq!(is_valid_proof(100, proof), digest.starts_with("0000"));
        }
    }

    #[test]
    fn search_returns_smallest_valid_proof() {
        let proof = proof_of_work_search(100);
        assert!(is_valid_proof(100, proof));
        assert!((0..proof).all(|p| !is_valid_proof(100, p)));
        let digest = sha256_hex(format!("{proof}100").as_bytes());
        assert!(digest.starts_with("0000"));
    }

    #[test]
    fn search_from_genesis_proof_has_known_answer() {
        // sha256("52838100") = 00001c37...; the swapped "10035293" order gives 35293.
        assert_eq!(proof_of_work_search(100), 52838);
        assert!(!is_valid_proof(100, 35293));
    }

    #[test]
    fn unbounded_search_matches_plain_search() {
        assert_eq!(ProofSearch::new().run(7).unwrap(), proof_of_work_search(7));
    }

    #[test]
    fn capped_search_is_exhausted_below_the_answer() {
        let answer = proof_of_work_search(100);
        let err = ProofSearch::new().max_iterations(answer).run(100).unwrap_err();
        assert_eq!(err, LedgerError::SearchExhausted { tried: answer });
        assert_eq!(
            ProofSearch::new().max_iterations(answer + 1).run(100),
            Ok(answer)
        );
    }

    #[test]
    fn cancelled_search_stops() {
        let token = CancelToken::new();
        token.cancel();
        let err = ProofSearch::new().cancel_token(token).run(100).unwrap_err();
        assert_eq!(err, LedgerError::SearchCancelled { tried: 0 });
    }
}
