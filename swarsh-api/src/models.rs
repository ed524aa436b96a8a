use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::schema::{matches, messages, photos, refresh_tokens, swipes, users};

// --- User ---

/// Full user row. Deliberately not Serialize: it carries the password hash
/// and the live pairing token. API responses go through [`PublicUser`] or
/// [`OwnProfile`].
#[derive(Debug, Queryable, Identifiable, Clone)]
#[diesel(table_name = users)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub name: Option<String>,
    pub age: Option<i32>,
    pub bio: Option<String>,
    pub profile_photo_url: Option<String>,
    pub preferences: serde_json::Value,
    pub settings: serde_json::Value,
    pub pair_token: Option<String>,
    pub paired_with: Option<Uuid>,
    pub is_online: bool,
    pub last_seen_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = users)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password_hash: String,
}

#[derive(Debug, AsChangeset, Deserialize, Default)]
#[diesel(table_name = users)]
pub struct UpdateProfile {
    pub name: Option<String>,
    pub age: Option<i32>,
    pub bio: Option<String>,
    pub profile_photo_url: Option<String>,
}

/// Free-text favourites record, stored as jsonb.
#[derive(Debug, Serialize, Deserialize, Default, Clone, PartialEq)]
pub struct Preferences {
    pub food: Option<String>,
    pub song: Option<String>,
    pub movie: Option<String>,
    pub about: Option<String>,
}

/// Notification/theme record, stored as jsonb.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct UserSettings {
    pub notifications: bool,
    pub theme: String,
}

impl Default for UserSettings {
    fn default() -> Self {
        Self {
            notifications: true,
            theme: "light".into(),
        }
    }
}

/// Reference view of another user: bare profile fields only.
#[derive(Debug, Serialize, Clone)]
pub struct PublicUser {
    pub id: Uuid,
    pub username: String,
    pub name: Option<String>,
    pub age: Option<i32>,
    pub bio: Option<String>,
    pub profile_photo_url: Option<String>,
    pub is_online: bool,
    pub last_seen_at: Option<DateTime<Utc>>,
}

impl From<&User> for PublicUser {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
            name: user.name.clone(),
            age: user.age,
            bio: user.bio.clone(),
            profile_photo_url: user.profile_photo_url.clone(),
            is_online: user.is_online,
            last_seen_at: user.last_seen_at,
        }
    }
}

/// The caller's own profile, with the private fields a user may see about
/// themselves (email, pairing state, current invite token).
#[derive(Debug, Serialize)]
pub struct OwnProfile {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub name: Option<String>,
    pub age: Option<i32>,
    pub bio: Option<String>,
    pub profile_photo_url: Option<String>,
    pub preferences: Preferences,
    pub settings: UserSettings,
    pub pair_token: Option<String>,
    pub paired_with: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

impl From<&User> for OwnProfile {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
            email: user.email.clone(),
            name: user.name.clone(),
            age: user.age,
            bio: user.bio.clone(),
            profile_photo_url: user.profile_photo_url.clone(),
            preferences: serde_json::from_value(user.preferences.clone()).unwrap_or_default(),
            settings: serde_json::from_value(user.settings.clone()).unwrap_or_default(),
            pair_token: user.pair_token.clone(),
            paired_with: user.paired_with,
            created_at: user.created_at,
        }
    }
}

// --- Photo ---

#[derive(Debug, Queryable, Identifiable, Serialize, Clone)]
#[diesel(table_name = photos)]
pub struct Photo {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub url: String,
    pub caption: Option<String>,
    pub tags: serde_json::Value,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = photos)]
pub struct NewPhoto {
    pub owner_id: Uuid,
    pub url: String,
    pub caption: Option<String>,
    pub tags: serde_json::Value,
}

// --- Swipe ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SwipeDirection {
    Like,
    Pass,
}

impl std::fmt::Display for SwipeDirection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SwipeDirection::Like => write!(f, "like"),
            SwipeDirection::Pass => write!(f, "pass"),
        }
    }
}

impl std::str::FromStr for SwipeDirection {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "like" => Ok(SwipeDirection::Like),
            "pass" => Ok(SwipeDirection::Pass),
            _ => Err(format!("unknown swipe direction: {s}")),
        }
    }
}

#[derive(Debug, Queryable, Identifiable, Serialize, Clone)]
#[diesel(table_name = swipes)]
pub struct Swipe {
    pub id: Uuid,
    pub swiper_id: Uuid,
    pub photo_id: Uuid,
    pub photo_owner_id: Uuid,
    pub direction: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = swipes)]
pub struct NewSwipe {
    pub swiper_id: Uuid,
    pub photo_id: Uuid,
    pub photo_owner_id: Uuid,
    pub direction: String,
}

// --- Match ---

/// The user pair is stored normalized (user_lo < user_hi) so the unordered
/// pair is a single key backed by a unique index.
#[derive(Debug, Queryable, Identifiable, Serialize, Clone)]
#[diesel(table_name = matches)]
pub struct Match {
    pub id: Uuid,
    pub photo_id: Uuid,
    pub user_lo: Uuid,
    pub user_hi: Uuid,
    pub created_at: DateTime<Utc>,
}

impl Match {
    /// The participant that is not `user_id`.
    pub fn other_user(&self, user_id: Uuid) -> Uuid {
        if self.user_lo == user_id {
            self.user_hi
        } else {
            self.user_lo
        }
    }
}

#[derive(Debug, Insertable)]
#[diesel(table_name = matches)]
pub struct NewMatch {
    pub photo_id: Uuid,
    pub user_lo: Uuid,
    pub user_hi: Uuid,
}

// --- Message ---

#[derive(Debug, Queryable, Identifiable, Serialize, Clone)]
#[diesel(table_name = messages)]
pub struct Message {
    pub id: Uuid,
    pub sender_id: Uuid,
    pub receiver_id: Uuid,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = messages)]
pub struct NewMessage {
    pub sender_id: Uuid,
    pub receiver_id: Uuid,
    pub content: String,
}

// --- RefreshToken ---

#[derive(Debug, Queryable, Identifiable, Clone)]
#[diesel(table_name = refresh_tokens)]
pub struct RefreshToken {
    pub id: Uuid,
    pub user_id: Uuid,
    pub token_hash: String,
    pub expires_at: DateTime<Utc>,
    pub revoked_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = refresh_tokens)]
pub struct NewRefreshToken {
    pub user_id: Uuid,
    pub token_hash: String,
    pub expires_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn direction_roundtrip() {
        assert_eq!("like".parse::<SwipeDirection>().unwrap(), SwipeDirection::Like);
        assert_eq!(SwipeDirection::Pass.to_string(), "pass");
        assert!("LIKE".parse::<SwipeDirection>().is_err());
        assert!("superlike".parse::<SwipeDirection>().is_err());
    }

    #[test]
    fn direction_serde_is_lowercase() {
        let json = serde_json::to_string(&SwipeDirection::Like).unwrap();
        assert_eq!(json, "\"like\"");
        let parsed: SwipeDirection = serde_json::from_str("\"pass\"").unwrap();
        assert_eq!(parsed, SwipeDirection::Pass);
    }

    #[test]
    fn match_other_user_picks_the_partner() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let (lo, hi) = if a < b { (a, b) } else { (b, a) };
        let m = Match {
            id: Uuid::new_v4(),
            photo_id: Uuid::new_v4(),
            user_lo: lo,
            user_hi: hi,
            created_at: Utc::now(),
        };
        assert_eq!(m.other_user(a), b);
        assert_eq!(m.other_user(b), a);
    }

    #[test]
    fn settings_default_is_light_with_notifications() {
        let settings = UserSettings::default();
        assert!(settings.notifications);
        assert_eq!(settings.theme, "light");
    }
}
