use serde::{Deserialize, Serialize};
use surrealdb::{sql::Thing, Datetime};

use crate::helpers::thing_helpers::thing_id;

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Default,
    Serialize,
    Deserialize,
    strum_macros::Display,
    strum_macros::AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Role {
    #[default]
    Fan,
    Artist,
    Admin,
}

impl Role {
    /// Roles a user may pick for themselves. Admins are only promoted by an admin.
    pub fn is_self_assignable(&self) -> bool {
        matches!(self, Role::Fan | Role::Artist)
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct UserRecord {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<Thing>,
    pub name: String,
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub role: Role,
    #[serde(default)]
    pub role_set: bool,
    #[serde(default)]
    pub library: Vec<Thing>,
    #[serde(default)]
    pub followers: Vec<Thing>,
    pub avatar: Option<String>,
    pub google_id: Option<String>,

    pub referral_code: String,
    pub referred_by: Option<String>,
    #[serde(default)]
    pub points: u32,

    pub reset_password_token: Option<String>,
    pub reset_password_expires: Option<Datetime>,

    pub created_at: Datetime,
    pub updated_at: Datetime,
}

impl UserRecord {
    pub fn owns(&self, music: &Thing) -> bool {
        self.library.contains(music)
    }
}

/// A user as exposed by the API: no password, no reset token, ids flattened.
#[derive(Debug, Serialize, Clone)]
pub struct UserView {
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub role_set: bool,
    pub avatar: Option<String>,
    pub library: Vec<String>,
    pub followers: usize,
    pub referral_code: String,
    pub points: u32,
    pub created_at: Datetime,
}

impl From<UserRecord> for UserView {
    fn from(user: UserRecord) -> Self {
        Self {
            id: user.id.as_ref().map(thing_id).unwrap_or_default(),
            name: user.name,
            email: user.email,
            role: user.role,
            role_set: user.role_set,
            avatar: user.avatar,
            library: user.library.iter().map(thing_id).collect(),
            followers: user.followers.len(),
            referral_code: user.referral_code,
            points: user.points,
            created_at: user.created_at,
        }
    }
}

/// What anyone may see of a user: no email, library or referral data.
#[derive(Debug, Serialize, Clone)]
pub struct PublicProfile {
    pub id: String,
    pub name: String,
    pub role: Role,
    pub avatar: Option<String>,
    pub followers: usize,
    pub created_at: Datetime,
    pub music_count: u64,
}

impl PublicProfile {
    pub fn new(user: UserRecord, music_count: u64) -> Self {
        Self {
            id: user.id.as_ref().map(thing_id).unwrap_or_default(),
            name: user.name,
            role: user.role,
            avatar: user.avatar,
            followers: user.followers.len(),
            created_at: user.created_at,
            music_count,
        }
    }
}

/// Name and avatar of a user, as listed among an artist's followers.
#[derive(Debug, Deserialize, Clone)]
pub struct UserSummaryRecord {
    pub id: Thing,
    pub name: String,
    pub avatar: Option<String>,
    #[serde(default)]
    pub role: Role,
}

#[derive(Debug, Serialize, Clone)]
pub struct UserSummary {
    pub id: String,
    pub name: String,
    pub avatar: Option<String>,
    pub role: Role,
}

impl From<UserSummaryRecord> for UserSummary {
    fn from(user: UserSummaryRecord) -> Self {
        Self {
            id: thing_id(&user.id),
            name: user.name,
            avatar: user.avatar,
            role: user.role,
        }
    }
}

#[derive(Debug, Serialize, Clone)]
pub struct FollowersView {
    pub followers: usize,
    pub users: Vec<UserSummary>,
}

#[derive(Debug, Serialize, Clone, Copy, PartialEq, Eq)]
pub struct FollowToggle {
    pub following: bool,
    pub followers: usize,
}

#[derive(Debug, Deserialize)]
pub struct UpdateProfilePayload {
    pub name: Option<String>,
    pub email: Option<String>,
    pub avatar: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ChangeRolePayload {
    pub role: Role,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_serde_is_lowercase() {
        assert_eq!(serde_json::to_string(&Role::Artist).unwrap(), "\"artist\"");
        let role: Role = serde_json::from_str("\"admin\"").unwrap();
        assert_eq!(role, Role::Admin);
        assert!(serde_json::from_str::<Role>("\"superuser\"").is_err());
        assert_eq!(Role::default(), Role::Fan);
        assert_eq!(Role::Fan.to_string(), "fan");
    }

    #[test]
    fn test_self_assignable_roles() {
        assert!(Role::Fan.is_self_assignable());
        assert!(Role::Artist.is_self_assignable());
        assert!(!Role::Admin.is_self_assignable());
    }
}
