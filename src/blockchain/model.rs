use log::{debug, info};

use super::proof::{self, ProofSearch};
use super::{Block, GENESIS_PROOF, PreviousHash};
use crate::error::{LedgerError, Result};
use crate::transaction::{Amount, Transaction};

/// In-memory ledger: the chain plus the pool of pending transactions.
#[derive(Debug, Clone)]
pub struct Blockchain {
    chain: Vec<Block>,
    pending: Vec<Transaction>,
}

impl Default for Blockchain {
    fn default() -> Self {
        Self::new()
    }
}

impl Blockchain {
    /// Initialize a new ledger with the genesis block.
    pub fn new() -> Self {
        let mut bc = Self {
            chain: Vec::new(),
            pending: Vec::new(),
        };
        bc.chain.push(Block::genesis());
        bc
    }

    /// Queue a transaction for the next block.
    ///
    /// Returns the index of the block it is expected to land in. This is a
    /// hint: nothing is reserved.
    pub fn submit_transaction(
        &mut self,
        sender: impl Into<String>,
        recipient: impl Into<String>,
        amount: impl Into<Amount>,
    ) -> Result<u64> {
        let amount = amount.into().ensure_finite()?;
        let next = self.last_block()?.index + 1;
        self.pending.push(Transaction::new(sender, recipient, amount));
        debug!(
            "POOL - queued tx for block #{next} (pending={})",
            self.pending.len()
        );
        Ok(next)
    }

    /// Append a block holding the whole pending pool. The proof is trusted;
    /// use [`Blockchain::validate_chain`] to check it.
    pub fn mint_block(&mut self, proof: u64, previous_hash: impl Into<PreviousHash>) -> &Block {
        let index = self.chain.len() as u64 + 1;
        let transactions = std::mem::take(&mut self.pending);
        let block = Block::new(index, proof, previous_hash.into(), transactions);
        info!(
            "LEDGER - sealed block #{} (proof={}, txs={})",
            block.index,
            block.proof,
            block.transactions.len()
        );
        self.chain.push(block);
        &self.chain[self.chain.len() - 1]
    }

    /// Return the last block in the chain.
    pub fn last_block(&self) -> Result<&Block> {
        self.chain.last().ok_or(LedgerError::EmptyChain)
    }

    pub fn last_proof(&self) -> Result<u64> {
        Ok(self.last_block()?.proof)
    }

    /// Canonical SHA-256 digest of a block.
    pub fn canonical_hash(block: &Block) -> Result<String> {
        block.hash()
    }

    pub fn is_valid_proof(last_proof: u64, proof: u64) -> bool {
        proof::is_valid_proof(last_proof, proof)
    }

    pub fn proof_of_work_search(last_proof: u64) -> u64 {
        proof::proof_of_work_search(last_proof)
    }

    /// Search a proof against the tip, link to its hash and mint.
    pub fn mine_next_block(&mut self) -> Result<&Block> {
        self.mine_next_block_with(&ProofSearch::new())
    }

    /// Same as [`Blockchain::mine_next_block`] with a bounded search.
    /// On error nothing is changed.
    pub fn mine_next_block_with(&mut self, search: &ProofSearch) -> Result<&Block> {
        let last = self.last_block()?;
        let last_proof = last.proof;
        let previous_hash = last.hash()?;
        let proof = search.run(last_proof)?;
        Ok(self.mint_block(proof, previous_hash))
    }

    /// Check genesis sentinels, index sequencing, hash linkage and proofs.
    pub fn validate_chain(&self) -> Result<()> {
        validate_blocks(&self.chain)
    }

    pub fn is_valid_chain(&self) -> bool {
        self.validate_chain().is_ok()
    }

    pub fn chain(&self) -> &[Block] {
        &self.chain
    }

    pub fn pending(&self) -> &[Transaction] {
        &self.pending
    }

    pub fn len(&self) -> usize {
        self.chain.len()
    }

    /// Always false once constructed.
    pub fn is_empty(&self) -> bool {
        self.chain.is_empty()
    }

    #[cfg(test)]
    pub(crate) fn chain_mut(&mut self) -> &mut Vec<Block> {
        &mut self.chain
    }
}

/// Validate an arbitrary sequence of blocks as a chain.
pub fn validate_blocks(chain: &[Block]) -> Result<()> {
    let genesis = chain.first().ok_or(LedgerError::EmptyChain)?;
    if genesis.index != 1 {
        return Err(invalid(genesis, "genesis index must be 1"));
    }
    if !genesis.previous_hash.is_genesis() {
        return Err(invalid(genesis, "genesis previous_hash is not the sentinel"));
    }
    if genesis.proof != GENESIS_PROOF {
        return Err(invalid(genesis, "genesis proof is not the sentinel"));
    }

    for pair in chain.windows(2) {
        let (prev, current) = (&pair[0], &pair[1]);

        if current.index != prev.index + 1 {
            return Err(invalid(current, "index is not sequential"));
        }

        let expected = PreviousHash::Digest(prev.hash()?);
        if current.previous_hash != expected {
            return Err(invalid(current, "previous_hash does not match parent digest"));
        }

        if !proof::is_valid_proof(prev.proof, current.proof) {
            return Err(invalid(current, "proof does not satisfy the work target"));
        }
    }

    Ok(())
}

fn invalid(block: &Block, reason: &str) -> LedgerError {
    LedgerError::InvalidBlock {
        index: block.index,
        reason: reason.to_string(),
    }
}
