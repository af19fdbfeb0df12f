//! API DTOs (Data Transfer Objects)
//!
//! Requests carry money in major currency units; views echo the stored
//! minor units so nothing is lost to rounding.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::entity::{
    donation::Donation, enrollment::Enrollment, goal::DonationGoal, membership::Membership,
};

// ============================================================================
// Charges (shared by donations and memberships)
// ============================================================================

/// Response of a successful charge initiation
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InitiateChargeResponse {
    /// The gateway's reference for this charge
    pub pidx: String,
    /// Where to redirect the payer
    pub payment_url: String,
    /// Opaque order reference; must be echoed back to the verify endpoint
    pub order_ref: String,
}

/// Verify request (donations and memberships alike)
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyPaymentRequest {
    pub pidx: String,
    pub order_ref: String,
}

// ============================================================================
// Donations
// ============================================================================

/// Initiate donation request
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InitiateDonationRequest {
    pub creator_id: String,
    /// Amount in major currency units
    pub amount: i64,
    pub message: Option<String>,
}

/// Donation projection
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DonationView {
    pub donation_id: String,
    pub creator_id: String,
    pub donor_user_id: Option<String>,
    pub amount_minor: i64,
    pub message: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<&Donation> for DonationView {
    fn from(donation: &Donation) -> Self {
        Self {
            donation_id: donation.id.to_string(),
            creator_id: donation.creator_id.to_string(),
            donor_user_id: donation.donor_user_id.map(|id| id.to_string()),
            amount_minor: donation.amount.minor(),
            message: donation.message.clone(),
            created_at: donation.created_at,
        }
    }
}

/// Verify donation response
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyDonationResponse {
    pub donation: DonationView,
    /// Present when the donation advanced an open goal
    #[serde(skip_serializing_if = "Option::is_none")]
    pub goal: Option<GoalView>,
}

// ============================================================================
// Goals
// ============================================================================

/// Create goal request
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateGoalRequest {
    pub creator_id: String,
    pub title: String,
    pub description: Option<String>,
    /// Target in major currency units
    pub target: i64,
}

/// Goal projection
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GoalView {
    pub goal_id: String,
    pub creator_id: String,
    pub title: String,
    pub description: Option<String>,
    pub target_minor: i64,
    pub progress_minor: i64,
    pub is_active: bool,
    pub is_reached: bool,
}

impl From<&DonationGoal> for GoalView {
    fn from(goal: &DonationGoal) -> Self {
        Self {
            goal_id: goal.id.to_string(),
            creator_id: goal.creator_id.to_string(),
            title: goal.title.clone(),
            description: goal.description.clone(),
            target_minor: goal.target.minor(),
            progress_minor: goal.progress_minor,
            is_active: goal.is_active,
            is_reached: goal.is_reached,
        }
    }
}

// ============================================================================
// Memberships
// ============================================================================

/// Create membership tier request
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateMembershipRequest {
    pub creator_id: String,
    pub name: String,
    pub tier: i16,
    /// Monthly price in major currency units
    pub amount: i64,
    pub benefits: String,
}

/// Membership tier projection
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MembershipView {
    pub membership_id: String,
    pub creator_id: String,
    pub name: String,
    pub tier: i16,
    pub amount_minor: i64,
    pub benefits: String,
}

impl From<&Membership> for MembershipView {
    fn from(membership: &Membership) -> Self {
        Self {
            membership_id: membership.id.to_string(),
            creator_id: membership.creator_id.to_string(),
            name: membership.name.clone(),
            tier: membership.tier,
            amount_minor: membership.amount.minor(),
            benefits: membership.benefits.clone(),
        }
    }
}

/// Initiate enrollment request
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InitiateEnrollmentRequest {
    pub membership_id: String,
    /// True when replacing the current enrollment with another tier
    #[serde(default)]
    pub change: bool,
}

/// Enrollment projection
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EnrollmentView {
    pub enrollment_id: String,
    pub user_id: String,
    pub membership_id: String,
    pub enrolled_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub is_active: bool,
}

impl From<&Enrollment> for EnrollmentView {
    fn from(enrollment: &Enrollment) -> Self {
        Self {
            enrollment_id: enrollment.id.to_string(),
            user_id: enrollment.user_id.to_string(),
            membership_id: enrollment.membership_id.to_string(),
            enrolled_at: enrollment.enrolled_at,
            expires_at: enrollment.expires_at,
            is_active: enrollment.is_active,
        }
    }
}

/// Verify enrollment response
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyEnrollmentResponse {
    pub enrollment: EnrollmentView,
    /// True when a previous enrollment was end-dated by this change
    pub ended_previous: bool,
}
