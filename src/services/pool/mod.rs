// SPDX-License-Identifier: MIT

pub mod calls;
pub mod governance;
pub mod vault;

pub use governance::{Proposal, VoteOutcome};
pub use vault::{DepositReceipt, Membership, RoundLedger, VaultAccount};
