//! Donation Goal Use Cases

use std::sync::Arc;

use kernel::amount::Amount;
use kernel::id::CreatorId;

use crate::domain::entity::goal::DonationGoal;
use crate::domain::repository::{CreatorRepository, GoalRepository};
use crate::error::{FundingError, FundingResult};

/// Create goal input
pub struct CreateGoalInput {
    pub creator_id: CreatorId,
    pub title: String,
    pub description: Option<String>,
    /// Target in major currency units
    pub target_units: i64,
}

/// Goal use case
pub struct GoalUseCase<S>
where
    S: CreatorRepository + GoalRepository,
{
    store: Arc<S>,
}

impl<S> GoalUseCase<S>
where
    S: CreatorRepository + GoalRepository,
{
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Open a goal for a creator
    ///
    /// At most one active-and-not-reached goal per creator; a second open
    /// goal fails with `ActiveGoalExists`.
    pub async fn create(&self, input: CreateGoalInput) -> FundingResult<DonationGoal> {
        self.store
            .find_by_id(&input.creator_id)
            .await?
            .ok_or(FundingError::CreatorNotFound)?;

        let title = input.title.trim();
        if title.is_empty() {
            return Err(FundingError::InvalidInput(
                "Goal title is required".to_string(),
            ));
        }

        let target = Amount::from_units(input.target_units)
            .map_err(|e| FundingError::InvalidInput(e.to_string()))?;

        let goal = DonationGoal::open(
            input.creator_id,
            title.to_string(),
            input.description,
            target,
        );

        GoalRepository::create(&*self.store, &goal).await?;

        tracing::info!(goal_id = %goal.id, creator_id = %goal.creator_id, "Goal opened");

        Ok(goal)
    }

    /// The creator's active-and-not-reached goal
    pub async fn active_for_creator(&self, creator_id: &CreatorId) -> FundingResult<DonationGoal> {
        self.store
            .find_active_by_creator(creator_id)
            .await?
            .ok_or(FundingError::GoalNotFound)
    }
}
