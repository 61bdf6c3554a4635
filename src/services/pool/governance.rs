// SPDX-License-Identifier: MIT

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::domain::error::VacuumError;
use crate::services::pool::vault::Membership;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VoteOutcome {
    Passing,
    Failing,
    Tied,
}

/// A governance proposal with share-weighted tallies. Voting is open
/// within `[start_ms, end_ms)`; one vote per member, weight locked to
/// the member's lifetime shares at vote time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Proposal {
    pub id: u64,
    pub title: String,
    pub votes_for: u64,
    pub votes_against: u64,
    pub start_ms: u64,
    pub end_ms: u64,
    voted: BTreeSet<String>,
}

impl Proposal {
    pub fn new(id: u64, title: String, start_ms: u64, end_ms: u64) -> Self {
        Self {
            id,
            title,
            votes_for: 0,
            votes_against: 0,
            start_ms,
            end_ms,
            voted: BTreeSet::new(),
        }
    }

    pub fn is_active(&self, now_ms: u64) -> bool {
        now_ms >= self.start_ms && now_ms < self.end_ms
    }

    pub fn has_voted(&self, member: &str) -> bool {
        self.voted.contains(member)
    }

    pub fn vote(
        &mut self,
        membership: &Membership,
        vote_for: bool,
        now_ms: u64,
    ) -> Result<(), VacuumError> {
        if !self.is_active(now_ms) {
            return Err(VacuumError::Validation {
                field: "proposal".into(),
                message: format!("proposal {} is not open for voting", self.id),
            });
        }
        if self.has_voted(&membership.member) {
            return Err(VacuumError::Validation {
                field: "proposal".into(),
                message: format!("{} already voted on proposal {}", membership.member, self.id),
            });
        }
        if membership.lifetime_shares == 0 {
            return Err(VacuumError::Validation {
                field: "membership".into(),
                message: "zero lifetime shares carries no voting weight".into(),
            });
        }

        if vote_for {
            self.votes_for = self.votes_for.saturating_add(membership.lifetime_shares);
        } else {
            self.votes_against = self
                .votes_against
                .saturating_add(membership.lifetime_shares);
        }
        self.voted.insert(membership.member.clone());
        tracing::debug!(
            target: "pool",
            proposal = self.id,
            member = %membership.member,
            weight = membership.lifetime_shares,
            vote_for,
            "Vote recorded"
        );
        Ok(())
    }

    pub fn outcome(&self) -> VoteOutcome {
        match self.votes_for.cmp(&self.votes_against) {
            std::cmp::Ordering::Greater => VoteOutcome::Passing,
            std::cmp::Ordering::Less => VoteOutcome::Failing,
            std::cmp::Ordering::Equal => VoteOutcome::Tied,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn member(name: &str, shares: u64) -> Membership {
        Membership {
            member: name.into(),
            lifetime_shares: shares,
            ..Membership::default()
        }
    }

    #[test]
    fn votes_are_weighted_by_lifetime_shares() {
        let mut proposal = Proposal::new(1, "raise target".into(), 100, 200);
        proposal.vote(&member("alice", 750_000), true, 150).unwrap();
        proposal.vote(&member("bob", 250_000), false, 150).unwrap();

        assert_eq!(proposal.votes_for, 750_000);
        assert_eq!(proposal.votes_against, 250_000);
        assert_eq!(proposal.outcome(), VoteOutcome::Passing);
    }

    #[test]
    fn inactive_duplicate_and_weightless_votes_are_rejected() {
        let mut proposal = Proposal::new(1, "x".into(), 100, 200);
        let alice = member("alice", 10);

        // Before start and at end are both inactive.
        assert!(proposal.vote(&alice, true, 50).is_err());
        assert!(proposal.vote(&alice, true, 200).is_err());

        proposal.vote(&alice, true, 150).unwrap();
        assert!(proposal.vote(&alice, false, 150).is_err());

        assert!(proposal.vote(&member("ghost", 0), true, 150).is_err());
        assert_eq!(proposal.votes_for, 10);
        assert_eq!(proposal.votes_against, 0);
    }
}
