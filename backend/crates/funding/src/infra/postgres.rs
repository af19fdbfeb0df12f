//! PostgreSQL Repository Implementations
//!
//! The reconciliation operations run in a single transaction with the
//! unique index on `payments.gateway_ref` as the serialization point:
//! when two verifications race on the same gateway transaction id, one
//! commits and the other hits the unique violation, which is mapped to
//! `AlreadyProcessed` rather than surfaced as a raw database error.

use chrono::{DateTime, Utc};
use kernel::amount::Amount;
use kernel::id::{CreatorId, MembershipId, UserId};
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::entity::{
    creator::Creator, donation::Donation, enrollment::Enrollment, goal::DonationGoal,
    membership::Membership, payment::Payment,
};
use crate::domain::repository::{
    CreatorRepository, DonationRepository, GoalRepository, MembershipRepository,
    ReconciliationStore,
};
use crate::error::{FundingError, FundingResult};

/// PostgreSQL-backed funding repository
#[derive(Clone)]
pub struct PgFundingRepository {
    pool: PgPool,
}

impl PgFundingRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// True when the error is a Postgres unique-index violation
fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db) if db.is_unique_violation())
}

// ============================================================================
// Creator Repository Implementation
// ============================================================================

impl CreatorRepository for PgFundingRepository {
    async fn create(&self, creator: &Creator) -> FundingResult<()> {
        sqlx::query(
            r#"
            INSERT INTO creators (id, user_id, bio, description, created_at)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(creator.id.as_uuid())
        .bind(creator.user_id.as_uuid())
        .bind(&creator.bio)
        .bind(&creator.description)
        .bind(creator.created_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn find_by_id(&self, creator_id: &CreatorId) -> FundingResult<Option<Creator>> {
        let row = sqlx::query_as::<_, CreatorRow>(
            "SELECT id, user_id, bio, description, created_at FROM creators WHERE id = $1",
        )
        .bind(creator_id.as_uuid())
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|r| r.into_creator()))
    }

    async fn find_by_user_id(&self, user_id: &UserId) -> FundingResult<Option<Creator>> {
        let row = sqlx::query_as::<_, CreatorRow>(
            "SELECT id, user_id, bio, description, created_at FROM creators WHERE user_id = $1",
        )
        .bind(user_id.as_uuid())
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|r| r.into_creator()))
    }
}

// ============================================================================
// Donation Repository Implementation
// ============================================================================

impl DonationRepository for PgFundingRepository {
    async fn list_by_creator(&self, creator_id: &CreatorId) -> FundingResult<Vec<Donation>> {
        let rows = sqlx::query_as::<_, DonationRow>(
            r#"
            SELECT id, creator_id, donor_user_id, amount_minor, message, payment_id, created_at
            FROM donations
            WHERE creator_id = $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(creator_id.as_uuid())
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(|r| r.into_donation()).collect()
    }
}

// ============================================================================
// Goal Repository Implementation
// ============================================================================

const GOAL_COLUMNS: &str = r#"
    id,
    creator_id,
    title,
    description,
    target_minor,
    progress_minor,
    is_active,
    is_reached,
    created_at
"#;

impl GoalRepository for PgFundingRepository {
    async fn create(&self, goal: &DonationGoal) -> FundingResult<()> {
        sqlx::query(
            r#"
            INSERT INTO donation_goals (
                id,
                creator_id,
                title,
                description,
                target_minor,
                progress_minor,
                is_active,
                is_reached,
                created_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(goal.id.as_uuid())
        .bind(goal.creator_id.as_uuid())
        .bind(&goal.title)
        .bind(&goal.description)
        .bind(goal.target.minor())
        .bind(goal.progress_minor)
        .bind(goal.is_active)
        .bind(goal.is_reached)
        .bind(goal.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                // The partial unique index on active goals fired
                FundingError::ActiveGoalExists
            } else {
                FundingError::Database(e)
            }
        })?;

        Ok(())
    }

    async fn find_active_by_creator(
        &self,
        creator_id: &CreatorId,
    ) -> FundingResult<Option<DonationGoal>> {
        let row = sqlx::query_as::<_, GoalRow>(&format!(
            r#"
            SELECT {GOAL_COLUMNS} FROM donation_goals
            WHERE creator_id = $1 AND is_active AND NOT is_reached
            "#
        ))
        .bind(creator_id.as_uuid())
        .fetch_optional(&self.pool)
        .await?;

        row.map(|r| r.into_goal()).transpose()
    }
}

// ============================================================================
// Membership Repository Implementation
// ============================================================================

const MEMBERSHIP_COLUMNS: &str = r#"
    id,
    creator_id,
    name,
    tier,
    amount_minor,
    benefits,
    is_deleted,
    created_at
"#;

const ENROLLMENT_COLUMNS: &str = r#"
    id,
    user_id,
    membership_id,
    enrolled_at,
    expires_at,
    is_active,
    payment_id
"#;

impl MembershipRepository for PgFundingRepository {
    async fn create(&self, membership: &Membership) -> FundingResult<()> {
        sqlx::query(
            r#"
            INSERT INTO memberships (
                id,
                creator_id,
                name,
                tier,
                amount_minor,
                benefits,
                is_deleted,
                created_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(membership.id.as_uuid())
        .bind(membership.creator_id.as_uuid())
        .bind(&membership.name)
        .bind(membership.tier)
        .bind(membership.amount.minor())
        .bind(&membership.benefits)
        .bind(membership.is_deleted)
        .bind(membership.created_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn find_by_id(
        &self,
        membership_id: &MembershipId,
    ) -> FundingResult<Option<Membership>> {
        let row = sqlx::query_as::<_, MembershipRow>(&format!(
            "SELECT {MEMBERSHIP_COLUMNS} FROM memberships WHERE id = $1"
        ))
        .bind(membership_id.as_uuid())
        .fetch_optional(&self.pool)
        .await?;

        row.map(|r| r.into_membership()).transpose()
    }

    async fn list_by_creator(&self, creator_id: &CreatorId) -> FundingResult<Vec<Membership>> {
        let rows = sqlx::query_as::<_, MembershipRow>(&format!(
            r#"
            SELECT {MEMBERSHIP_COLUMNS} FROM memberships
            WHERE creator_id = $1 AND NOT is_deleted
            ORDER BY tier ASC
            "#
        ))
        .bind(creator_id.as_uuid())
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(|r| r.into_membership()).collect()
    }

    async fn find_active_enrollment(
        &self,
        user_id: &UserId,
        creator_id: &CreatorId,
    ) -> FundingResult<Option<(Enrollment, Membership)>> {
        let row = sqlx::query_as::<_, EnrollmentWithMembershipRow>(
            r#"
            SELECT
                e.id,
                e.user_id,
                e.membership_id,
                e.enrolled_at,
                e.expires_at,
                e.is_active,
                e.payment_id,
                m.id AS m_id,
                m.creator_id AS m_creator_id,
                m.name AS m_name,
                m.tier AS m_tier,
                m.amount_minor AS m_amount_minor,
                m.benefits AS m_benefits,
                m.is_deleted AS m_is_deleted,
                m.created_at AS m_created_at
            FROM enrollments e
            JOIN memberships m ON m.id = e.membership_id
            WHERE e.user_id = $1 AND m.creator_id = $2 AND e.is_active
            "#,
        )
        .bind(user_id.as_uuid())
        .bind(creator_id.as_uuid())
        .fetch_optional(&self.pool)
        .await?;

        row.map(|r| r.into_pair()).transpose()
    }

    async fn list_enrollments_by_user(&self, user_id: &UserId) -> FundingResult<Vec<Enrollment>> {
        let rows = sqlx::query_as::<_, EnrollmentRow>(&format!(
            r#"
            SELECT {ENROLLMENT_COLUMNS} FROM enrollments
            WHERE user_id = $1
            ORDER BY enrolled_at DESC
            "#
        ))
        .bind(user_id.as_uuid())
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(|r| r.into_enrollment()).collect())
    }
}

// ============================================================================
// Reconciliation Store Implementation
// ============================================================================

impl ReconciliationStore for PgFundingRepository {
    async fn find_payment_by_gateway_ref(
        &self,
        gateway_ref: &str,
    ) -> FundingResult<Option<Payment>> {
        let row = sqlx::query_as::<_, PaymentRow>(
            r#"
            SELECT id, gateway_ref, amount_minor, status, created_at
            FROM payments
            WHERE gateway_ref = $1
            "#,
        )
        .bind(gateway_ref)
        .fetch_optional(&self.pool)
        .await?;

        row.map(|r| r.into_payment()).transpose()
    }

    async fn record_donation(
        &self,
        payment: &Payment,
        donation: &Donation,
    ) -> FundingResult<Option<DonationGoal>> {
        let mut tx = self.pool.begin().await?;

        insert_payment(&mut tx, payment).await?;

        sqlx::query(
            r#"
            INSERT INTO donations (
                id,
                creator_id,
                donor_user_id,
                amount_minor,
                message,
                payment_id,
                created_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(donation.id.as_uuid())
        .bind(donation.creator_id.as_uuid())
        .bind(donation.donor_user_id.as_ref().map(|id| *id.as_uuid()))
        .bind(donation.amount.minor())
        .bind(&donation.message)
        .bind(donation.payment_id.as_ref().map(|id| *id.as_uuid()))
        .bind(donation.created_at)
        .execute(&mut *tx)
        .await?;

        // Lock the creator's open goal so concurrent donations serialize
        // their progress updates
        let goal_row = sqlx::query_as::<_, GoalRow>(&format!(
            r#"
            SELECT {GOAL_COLUMNS} FROM donation_goals
            WHERE creator_id = $1 AND is_active AND NOT is_reached
            FOR UPDATE
            "#
        ))
        .bind(donation.creator_id.as_uuid())
        .fetch_optional(&mut *tx)
        .await?;

        let goal = match goal_row {
            Some(row) => {
                let mut goal = row.into_goal()?;
                goal.apply_donation(donation.amount);

                sqlx::query(
                    r#"
                    UPDATE donation_goals
                    SET progress_minor = $2, is_reached = $3
                    WHERE id = $1
                    "#,
                )
                .bind(goal.id.as_uuid())
                .bind(goal.progress_minor)
                .bind(goal.is_reached)
                .execute(&mut *tx)
                .await?;

                Some(goal)
            }
            None => None,
        };

        tx.commit().await?;

        Ok(goal)
    }

    async fn record_enrollment(
        &self,
        payment: &Payment,
        enrollment: &Enrollment,
        end_previous: Option<&Enrollment>,
    ) -> FundingResult<()> {
        let mut tx = self.pool.begin().await?;

        insert_payment(&mut tx, payment).await?;

        if let Some(previous) = end_previous {
            sqlx::query(
                r#"
                UPDATE enrollments
                SET is_active = FALSE, expires_at = $2
                WHERE id = $1
                "#,
            )
            .bind(previous.id.as_uuid())
            .bind(previous.expires_at)
            .execute(&mut *tx)
            .await?;
        }

        sqlx::query(
            r#"
            INSERT INTO enrollments (
                id,
                user_id,
                membership_id,
                enrolled_at,
                expires_at,
                is_active,
                payment_id
            ) VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(enrollment.id.as_uuid())
        .bind(enrollment.user_id.as_uuid())
        .bind(enrollment.membership_id.as_uuid())
        .bind(enrollment.enrolled_at)
        .bind(enrollment.expires_at)
        .bind(enrollment.is_active)
        .bind(enrollment.payment_id.as_ref().map(|id| *id.as_uuid()))
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(())
    }
}

/// Insert the payment row, mapping the gateway-ref unique violation
///
/// The violation is the expected signal when concurrent verifications race
/// on the same transaction id; the losing writer's whole transaction rolls
/// back, so no partial effect survives.
async fn insert_payment(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    payment: &Payment,
) -> FundingResult<()> {
    sqlx::query(
        r#"
        INSERT INTO payments (id, gateway_ref, amount_minor, status, created_at)
        VALUES ($1, $2, $3, $4, $5)
        "#,
    )
    .bind(payment.id.as_uuid())
    .bind(&payment.gateway_ref)
    .bind(payment.amount.minor())
    .bind(&payment.status)
    .bind(payment.created_at)
    .execute(&mut **tx)
    .await
    .map_err(|e| {
        if is_unique_violation(&e) {
            FundingError::AlreadyProcessed
        } else {
            FundingError::Database(e)
        }
    })?;

    Ok(())
}

// ============================================================================
// Row Types for sqlx mapping
// ============================================================================

fn amount_from_minor(minor: i64, what: &str) -> FundingResult<Amount> {
    Amount::from_minor(minor)
        .map_err(|e| FundingError::Internal(format!("Invalid stored {what} amount: {e}")))
}

#[derive(sqlx::FromRow)]
struct CreatorRow {
    id: Uuid,
    user_id: Uuid,
    bio: Option<String>,
    description: Option<String>,
    created_at: DateTime<Utc>,
}

impl CreatorRow {
    fn into_creator(self) -> Creator {
        Creator {
            id: self.id.into(),
            user_id: UserId::from_uuid(self.user_id),
            bio: self.bio,
            description: self.description,
            created_at: self.created_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct PaymentRow {
    id: Uuid,
    gateway_ref: String,
    amount_minor: i64,
    status: String,
    created_at: DateTime<Utc>,
}

impl PaymentRow {
    fn into_payment(self) -> FundingResult<Payment> {
        Ok(Payment {
            id: self.id.into(),
            gateway_ref: self.gateway_ref,
            amount: amount_from_minor(self.amount_minor, "payment")?,
            status: self.status,
            created_at: self.created_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct DonationRow {
    id: Uuid,
    creator_id: Uuid,
    donor_user_id: Option<Uuid>,
    amount_minor: i64,
    message: Option<String>,
    payment_id: Option<Uuid>,
    created_at: DateTime<Utc>,
}

impl DonationRow {
    fn into_donation(self) -> FundingResult<Donation> {
        Ok(Donation {
            id: self.id.into(),
            creator_id: CreatorId::from_uuid(self.creator_id),
            donor_user_id: self.donor_user_id.map(UserId::from_uuid),
            amount: amount_from_minor(self.amount_minor, "donation")?,
            message: self.message,
            payment_id: self.payment_id.map(Into::into),
            created_at: self.created_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct GoalRow {
    id: Uuid,
    creator_id: Uuid,
    title: String,
    description: Option<String>,
    target_minor: i64,
    progress_minor: i64,
    is_active: bool,
    is_reached: bool,
    created_at: DateTime<Utc>,
}

impl GoalRow {
    fn into_goal(self) -> FundingResult<DonationGoal> {
        Ok(DonationGoal {
            id: self.id.into(),
            creator_id: CreatorId::from_uuid(self.creator_id),
            title: self.title,
            description: self.description,
            target: amount_from_minor(self.target_minor, "goal target")?,
            progress_minor: self.progress_minor,
            is_active: self.is_active,
            is_reached: self.is_reached,
            created_at: self.created_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct MembershipRow {
    id: Uuid,
    creator_id: Uuid,
    name: String,
    tier: i16,
    amount_minor: i64,
    benefits: String,
    is_deleted: bool,
    created_at: DateTime<Utc>,
}

impl MembershipRow {
    fn into_membership(self) -> FundingResult<Membership> {
        Ok(Membership {
            id: self.id.into(),
            creator_id: CreatorId::from_uuid(self.creator_id),
            name: self.name,
            tier: self.tier,
            amount: amount_from_minor(self.amount_minor, "membership")?,
            benefits: self.benefits,
            is_deleted: self.is_deleted,
            created_at: self.created_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct EnrollmentRow {
    id: Uuid,
    user_id: Uuid,
    membership_id: Uuid,
    enrolled_at: DateTime<Utc>,
    expires_at: DateTime<Utc>,
    is_active: bool,
    payment_id: Option<Uuid>,
}

impl EnrollmentRow {
    fn into_enrollment(self) -> Enrollment {
        Enrollment {
            id: self.id.into(),
            user_id: UserId::from_uuid(self.user_id),
            membership_id: MembershipId::from_uuid(self.membership_id),
            enrolled_at: self.enrolled_at,
            expires_at: self.expires_at,
            is_active: self.is_active,
            payment_id: self.payment_id.map(Into::into),
        }
    }
}

#[derive(sqlx::FromRow)]
struct EnrollmentWithMembershipRow {
    id: Uuid,
    user_id: Uuid,
    membership_id: Uuid,
    enrolled_at: DateTime<Utc>,
    expires_at: DateTime<Utc>,
    is_active: bool,
    payment_id: Option<Uuid>,
    m_id: Uuid,
    m_creator_id: Uuid,
    m_name: String,
    m_tier: i16,
    m_amount_minor: i64,
    m_benefits: String,
    m_is_deleted: bool,
    m_created_at: DateTime<Utc>,
}

impl EnrollmentWithMembershipRow {
    fn into_pair(self) -> FundingResult<(Enrollment, Membership)> {
        let enrollment = Enrollment {
            id: self.id.into(),
            user_id: UserId::from_uuid(self.user_id),
            membership_id: MembershipId::from_uuid(self.membership_id),
            enrolled_at: self.enrolled_at,
            expires_at: self.expires_at,
            is_active: self.is_active,
            payment_id: self.payment_id.map(Into::into),
        };

        let membership = Membership {
            id: self.m_id.into(),
            creator_id: CreatorId::from_uuid(self.m_creator_id),
            name: self.m_name,
            tier: self.m_tier,
            amount: amount_from_minor(self.m_amount_minor, "membership")?,
            benefits: self.m_benefits,
            is_deleted: self.m_is_deleted,
            created_at: self.m_created_at,
        };

        Ok((enrollment, membership))
    }
}
