//! Creator Profile Entity

use chrono::{DateTime, Utc};
use kernel::id::{CreatorId, UserId};

/// A user's creator profile
///
/// The payee side of every donation and membership. Ownership checks for
/// creator-scoped resources resolve through `user_id`.
#[derive(Debug, Clone)]
pub struct Creator {
    pub id: CreatorId,
    pub user_id: UserId,
    pub bio: Option<String>,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Creator {
    pub fn new(user_id: UserId, bio: Option<String>, description: Option<String>) -> Self {
        Self {
            id: CreatorId::new(),
            user_id,
            bio,
            description,
            created_at: Utc::now(),
        }
    }
}
