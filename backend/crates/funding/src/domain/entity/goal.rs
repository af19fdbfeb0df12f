//! Donation Goal Entity
//!
//! A creator's open fundraising target. At most one goal per creator is
//! active-and-not-reached at a time; the partial unique index on the
//! goals table enforces this, the application surfaces it as a conflict.

use chrono::{DateTime, Utc};
use kernel::amount::Amount;
use kernel::id::{CreatorId, GoalId};

/// Donation goal
#[derive(Debug, Clone)]
pub struct DonationGoal {
    pub id: GoalId,
    pub creator_id: CreatorId,
    pub title: String,
    pub description: Option<String>,
    /// Target in minor units
    pub target: Amount,
    /// Accumulated progress in minor units; only confirmed donations add
    /// to it and it never decreases
    pub progress_minor: i64,
    pub is_active: bool,
    pub is_reached: bool,
    pub created_at: DateTime<Utc>,
}

impl DonationGoal {
    /// Open a new goal with zero progress
    pub fn open(
        creator_id: CreatorId,
        title: String,
        description: Option<String>,
        target: Amount,
    ) -> Self {
        Self {
            id: GoalId::new(),
            creator_id,
            title,
            description,
            target,
            progress_minor: 0,
            is_active: true,
            is_reached: false,
            created_at: Utc::now(),
        }
    }

    /// Apply a confirmed donation to the goal's progress
    ///
    /// Progress is monotonic; once reached the flag stays set even if the
    /// target would later be edited upwards.
    pub fn apply_donation(&mut self, amount: Amount) {
        self.progress_minor = self.progress_minor.saturating_add(amount.minor());
        if self.progress_minor >= self.target.minor() {
            self.is_reached = true;
        }
    }
}
