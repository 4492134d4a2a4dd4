//! ShareStake Property-Based Invariant Tests
//!
//! Uses proptest to verify critical ledger invariants across:
//! - Share, principal and token accounting over random operation histories
//! - Penalty, disposition and bonus arithmetic

pub mod ledger_invariants;
pub mod penalty_invariants;
