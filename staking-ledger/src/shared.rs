//! A [`StakingLedger`] behind one exclusive lock, for hosts that submit
//! operations from several threads.  Operations are serialized in lock
//! acquisition order.

use {
    crate::{
        clock::Clock,
        custodian::TokenCustodian,
        error::StakingError,
        instruction::{process_instruction, InstructionOutcome},
        processor::StakingLedger,
        state::{GlobalState, LedgerState},
    },
    parking_lot::Mutex,
    solana_pubkey::Pubkey,
    std::sync::Arc,
};

pub struct SharedStakingLedger<C, K> {
    inner: Arc<Mutex<StakingLedger<C, K>>>,
}

impl<C, K> Clone for SharedStakingLedger<C, K> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<C: TokenCustodian, K: Clock> SharedStakingLedger<C, K> {
    pub fn new(ledger: StakingLedger<C, K>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(ledger)),
        }
    }

    /// Runs `f` with exclusive access to the ledger.
    pub fn with<R>(&self, f: impl FnOnce(&mut StakingLedger<C, K>) -> R) -> R {
        let mut ledger = self.inner.lock();
        f(&mut *ledger)
    }

    pub fn process_instruction(
        &self,
        caller: &Pubkey,
        data: &[u8],
    ) -> Result<InstructionOutcome, StakingError> {
        let mut ledger = self.inner.lock();
        process_instruction(&mut *ledger, caller, data)
    }

    pub fn globals(&self) -> GlobalState {
        self.inner.lock().globals()
    }

    pub fn snapshot(&self) -> LedgerState {
        self.inner.lock().snapshot()
    }
}
