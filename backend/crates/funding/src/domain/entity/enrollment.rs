//! Enrollment Entity
//!
//! A user's time-bounded subscription to one of a creator's membership
//! tiers. One active enrollment per creator per user; a tier change ends
//! the old row (inactive, expiry = now) and inserts a fresh one, so the
//! history of terms is preserved.

use chrono::{DateTime, Months, Utc};
use kernel::id::{EnrollmentId, MembershipId, PaymentId, UserId};

/// Enrollment record
#[derive(Debug, Clone)]
pub struct Enrollment {
    pub id: EnrollmentId,
    pub user_id: UserId,
    pub membership_id: MembershipId,
    pub enrolled_at: DateTime<Utc>,
    /// End of the current term (or the moment the enrollment was ended)
    pub expires_at: DateTime<Utc>,
    pub is_active: bool,
    /// The payment that funded this term
    pub payment_id: Option<PaymentId>,
}

impl Enrollment {
    /// Start a one-month term funded by a confirmed payment
    pub fn start(user_id: UserId, membership_id: MembershipId, payment_id: PaymentId) -> Self {
        let now = Utc::now();
        Self {
            id: EnrollmentId::new(),
            user_id,
            membership_id,
            enrolled_at: now,
            expires_at: now
                .checked_add_months(Months::new(1))
                .unwrap_or(now),
            is_active: true,
            payment_id: Some(payment_id),
        }
    }

    /// End the enrollment now (tier change or cancellation)
    pub fn end_now(&mut self) {
        self.is_active = false;
        self.expires_at = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_start_opens_one_month_term() {
        let enrollment = Enrollment::start(UserId::new(), MembershipId::new(), PaymentId::new());

        assert!(enrollment.is_active);
        let term = enrollment.expires_at - enrollment.enrolled_at;
        assert!(term >= Duration::days(28) && term <= Duration::days(31));
    }

    #[test]
    fn test_end_now() {
        let mut enrollment =
            Enrollment::start(UserId::new(), MembershipId::new(), PaymentId::new());
        enrollment.end_now();

        assert!(!enrollment.is_active);
        assert!(enrollment.expires_at <= Utc::now());
    }
}
