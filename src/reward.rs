//! Mining reward policies.
//!
//! The chain asks a [`RewardPolicy`] how much to pay the miner of the next
//! block; a zero answer means no reward transaction is added.

use crate::config::MinerConfig;
use crate::transaction::Transaction;

pub trait RewardPolicy {
    fn decide_reward(&self, pending: &[Transaction]) -> u64;
}

impl<F> RewardPolicy for F
where
    F: Fn(&[Transaction]) -> u64,
{
    fn decide_reward(&self, pending: &[Transaction]) -> u64 {
        self(pending)
    }
}

/// Same reward for every block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedReward(pub u64);

impl RewardPolicy for FixedReward {
    fn decide_reward(&self, _pending: &[Transaction]) -> u64 {
        self.0
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NoReward;

impl RewardPolicy for NoReward {
    fn decide_reward(&self, _pending: &[Transaction]) -> u64 {
        0
    }
}

/// Pays `full` when the miner solved the bonus challenge, `reduced` otherwise.
/// How the challenge is posed and judged is up to the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChallengeReward {
    pub solved: bool,
    pub full: u64,
    pub reduced: u64,
}

impl ChallengeReward {
    pub fn from_config(config: &MinerConfig, solved: bool) -> Self {
        Self {
            solved,
            full: config.bonus_reward,
            reduced: config.reward,
        }
    }
}

impl RewardPolicy for ChallengeReward {
    fn decide_reward(&self, _pending: &[Transaction]) -> u64 {
        if self.solved {
            self.full
        } else {
            self.reduced
        }
    }
}
