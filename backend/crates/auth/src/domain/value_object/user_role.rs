use serde::{Deserialize, Serialize};
use std::fmt;

/// Role claim carried in access tokens
///
/// `Creator` is a regular user who also owns a creator profile; `Admin`
/// can manage any resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(i16)]
pub enum UserRole {
    #[default]
    User = 0,
    Creator = 1,
    Admin = 2,
}

impl UserRole {
    #[inline]
    pub const fn id(&self) -> i16 {
        *self as i16
    }

    #[inline]
    pub const fn code(&self) -> &'static str {
        use UserRole::*;
        match self {
            User => "user",
            Creator => "creator",
            Admin => "admin",
        }
    }

    #[inline]
    pub const fn is_admin(&self) -> bool {
        matches!(self, UserRole::Admin)
    }

    #[inline]
    pub const fn is_creator_or_higher(&self) -> bool {
        use UserRole::*;
        matches!(self, Creator | Admin)
    }

    #[inline]
    pub fn from_id(id: i16) -> Option<Self> {
        use UserRole::*;
        match id {
            0 => Some(User),
            1 => Some(Creator),
            2 => Some(Admin),
            _ => None,
        }
    }

    #[inline]
    pub fn from_code(code: &str) -> Option<Self> {
        use UserRole::*;
        match code {
            "user" => Some(User),
            "creator" => Some(Creator),
            "admin" => Some(Admin),
            _ => None,
        }
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_role_roundtrip() {
        for role in [UserRole::User, UserRole::Creator, UserRole::Admin] {
            assert_eq!(UserRole::from_id(role.id()), Some(role));
            assert_eq!(UserRole::from_code(role.code()), Some(role));
        }
        assert_eq!(UserRole::from_id(99), None);
        assert_eq!(UserRole::from_code("root"), None);
    }

    #[test]
    fn test_user_role_checks() {
        assert!(!UserRole::User.is_creator_or_higher());
        assert!(UserRole::Creator.is_creator_or_higher());
        assert!(UserRole::Admin.is_creator_or_higher());
        assert!(!UserRole::Creator.is_admin());
        assert!(UserRole::Admin.is_admin());
    }

    #[test]
    fn test_user_role_display() {
        assert_eq!(UserRole::User.to_string(), "user");
        assert_eq!(UserRole::Creator.to_string(), "creator");
        assert_eq!(UserRole::Admin.to_string(), "admin");
    }
}
