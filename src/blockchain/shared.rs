use std::sync::{Arc, Mutex, MutexGuard};

use log::{debug, info};

use super::{Block, Blockchain, ProofSearch};
use crate::error::{LedgerError, Result};
use crate::transaction::Amount;

/// Thread-safe handle to a [`Blockchain`].
///
/// Pool and chain mutations happen under one lock. Proof search runs with
/// the lock released.
#[derive(Debug, Clone, Default)]
pub struct SharedBlockchain {
    inner: Arc<Mutex<Blockchain>>,
}

impl SharedBlockchain {
    pub fn new(blockchain: Blockchain) -> Self {
        Self {
            inner: Arc::new(Mutex::new(blockchain)),
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, Blockchain>> {
        self.inner.lock().map_err(|_| LedgerError::LockPoisoned)
    }

    pub fn submit_transaction(
        &self,
        sender: impl Into<String>,
        recipient: impl Into<String>,
        amount: impl Into<Amount>,
    ) -> Result<u64> {
        self.lock()?.submit_transaction(sender, recipient, amount)
    }

    /// Mint with a caller-supplied proof. Returns a copy of the new block.
    pub fn mint_block(&self, proof: u64, previous_hash: String) -> Result<Block> {
        Ok(self.lock()?.mint_block(proof, previous_hash).clone())
    }

    /// Mine one block against the current tip.
    ///
    /// The tip is snapshotted, the search runs unlocked, and the block is
    /// minted only if the tip did not move meanwhile. Otherwise the search
    /// restarts on the new tip.
    pub fn mine(&self, search: &ProofSearch) -> Result<Block> {
        loop {
            let (tip_index, last_proof, previous_hash) = {
                let bc = self.lock()?;
                let last = bc.last_block()?;
                (last.index, last.proof, last.hash()?)
            };

            let proof = search.run(last_proof)?;

            let mut bc = self.lock()?;
            if bc.last_block()?.index != tip_index {
                debug!("MINER - tip moved past #{tip_index} during search, retrying");
                continue;
            }
            let block = bc.mint_block(proof, previous_hash).clone();
            info!(
                "MINER - mined block #{} (proof={}, txs={})",
                block.index,
                block.proof,
                block.transactions.len()
            );
            return Ok(block);
        }
    }

    pub fn snapshot(&self) -> Result<Vec<Block>> {
        Ok(self.lock()?.chain().to_vec())
    }

    pub fn pending_len(&self) -> Result<usize> {
        Ok(self.lock()?.pending().len())
    }

    pub fn len(&self) -> Result<usize> {
        Ok(self.lock()?.len())
    }

    pub fn validate_chain(&self) -> Result<()> {
        self.lock()?.validate_chain()
    }
}

#[cfg(test)]
mod tests {
    use std::thread;

    use super::SharedBlockchain;
    use crate::blockchain::ProofSearch;
    use crate::transaction::Amount;

    #[test]
    fn concurrent_submits_are_committed_once() {
        let shared = SharedBlockchain::default();
        let handles: Vec<_> = (0..4)
            .map(|t| {
                let shared = shared.clone();
                thread::spawn(move || {
                    for i in 0..25 {
                        shared
                            .submit_transaction(format!("t{t}"), format!("r{i}"), i)
                            .unwrap();
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }

        assert_eq!(shared.pending_len().unwrap(), 100);
        let block = shared.mine(&ProofSearch::new()).unwrap();
        assert_eq!(block.index, 2);
        assert_eq!(block.transactions.len(), 100);
        assert_eq!(shared.pending_len().unwrap(), 0);
        assert!(shared.validate_chain().is_ok());
    }

    #[test]
    fn interleaved_writers_keep_per_sender_order() {
        let shared = SharedBlockchain::default();
        let writers: Vec<_> = (0..4)
            .map(|w| {
                let shared = shared.clone();
                thread::spawn(move || {
                    for i in 0..50i32 {
                        shared.submit_transaction(format!("w{w}"), "r", i).unwrap();
                    }
                })
            })
            .collect();
        for h in writers {
            h.join().unwrap();
        }

        let block = shared.mine(&ProofSearch::new()).unwrap();
        assert_eq!(block.transactions.len(), 200);
        for w in 0..4 {
            let sender = format!("w{w}");
            let amounts: Vec<_> = block
                .transactions
                .iter()
                .filter(|t| t.sender == sender)
                .map(|t| t.amount)
                .collect();
            let expected: Vec<_> = (0..50i32).map(Amount::from).collect();
            assert_eq!(amounts, expected, "order of {sender}");
        }
    }

    #[test]
    fn concurrent_miners_never_share_a_parent() {
        let threads = 4;
        let rounds = 3;
        let shared = SharedBlockchain::default();
        let miners: Vec<_> = (0..threads)
            .map(|m| {
                let shared = shared.clone();
                thread::spawn(move || {
                    for r in 0..rounds {
                        shared
                            .submit_transaction(format!("m{m}"), format!("r{r}"), r as i64)
                            .unwrap();
                        shared.mine(&ProofSearch::new()).unwrap();
                    }
                })
            })
            .collect();
        for h in miners {
            h.join().unwrap();
        }

        let chain = shared.snapshot().unwrap();
        assert_eq!(chain.len(), threads * rounds + 1);
        assert!(shared.validate_chain().is_ok());
        for (pos, block) in chain.iter().enumerate() {
            assert_eq!(block.index, pos as u64 + 1);
        }
        let committed: usize = chain.iter().map(|b| b.transactions.len()).sum();
        assert_eq!(committed, threads * rounds);
        assert_eq!(shared.pending_len().unwrap(), 0);
    }

    #[test]
    fn mining_twice_extends_the_chain() {
        let shared = SharedBlockchain::default();
        shared.mine(&ProofSearch::new()).unwrap();
        shared.mine(&ProofSearch::new()).unwrap();
        assert_eq!(shared.len().unwrap(), 3);
        assert_eq!(shared.snapshot().unwrap().len(), 3);
        assert!(shared.validate_chain().is_ok());
    }
}
