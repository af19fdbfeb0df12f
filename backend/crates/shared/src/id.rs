//! Common ID Types
//!
//! Type-safe ID wrappers for domain entities.

use std::fmt;
use std::marker::PhantomData;
use uuid::Uuid;

/// Generic typed ID wrapper
///
/// Usage:
/// ```
/// use kernel::id::{Id, markers};
/// type UserId = Id<markers::User>;
/// ```
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Id<T> {
    value: uuid::Uuid,
    _marker: PhantomData<T>,
}

impl<T> Id<T> {
    /// Create a new random ID (UUID v4)
    pub fn new() -> Self {
        Self {
            value: Uuid::new_v4(),
            _marker: PhantomData,
        }
    }

    /// Create from an existing UUID
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self {
            value: uuid,
            _marker: PhantomData,
        }
    }

    /// Get the underlying UUID
    pub fn as_uuid(&self) -> &Uuid {
        &self.value
    }

    /// Convert to UUID
    pub fn into_uuid(self) -> Uuid {
        self.value
    }
}

impl<T> Default for Id<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for Id<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Id({})", self.value)
    }
}

impl<T> fmt::Display for Id<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.value)
    }
}

impl<T> From<Uuid> for Id<T> {
    fn from(uuid: Uuid) -> Self {
        Self::from_uuid(uuid)
    }
}

impl<T> From<Id<T>> for Uuid {
    fn from(id: Id<T>) -> Self {
        id.value
    }
}

impl<T> std::str::FromStr for Id<T> {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::from_uuid(Uuid::parse_str(s)?))
    }
}

/// Marker types for different entity IDs
pub mod markers {
    /// Marker for User IDs
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct User;

    /// Marker for Creator profile IDs
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Creator;

    /// Marker for Refresh Token IDs
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct RefreshToken;

    /// Marker for Payment IDs
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Payment;

    /// Marker for Donation IDs
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Donation;

    /// Marker for Donation Goal IDs
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Goal;

    /// Marker for Membership tier IDs
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Membership;

    /// Marker for Enrollment IDs
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Enrollment;
}

/// Type aliases for common IDs
pub type UserId = Id<markers::User>;
pub type CreatorId = Id<markers::Creator>;
pub type RefreshTokenId = Id<markers::RefreshToken>;
pub type PaymentId = Id<markers::Payment>;
pub type DonationId = Id<markers::Donation>;
pub type GoalId = Id<markers::Goal>;
pub type MembershipId = Id<markers::Membership>;
pub type EnrollmentId = Id<markers::Enrollment>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id_type_safety() {
        let user_id: UserId = Id::new();
        let payment_id: PaymentId = Id::new();

        // These are different types, cannot be mixed
        let _u: Uuid = user_id.into_uuid();
        let _p: Uuid = payment_id.into_uuid();
    }

    #[test]
    fn test_id_from_uuid() {
        let uuid = Uuid::new_v4();
        let id: UserId = Id::from_uuid(uuid);
        assert_eq!(id.as_uuid(), &uuid);
    }

    #[test]
    fn test_id_parse_roundtrip() {
        let id: CreatorId = Id::new();
        let parsed: CreatorId = id.to_string().parse().unwrap();
        assert_eq!(id, parsed);
    }
}
