use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::auth::{AuthUser, OwnedObject};
use crate::core::Searchable;

/// A registered user. The email doubles as the login name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserProfile {
	pub id: i64,
	pub email: String,
	pub name: String,
	/// Argon2 PHC string.
	pub password: String,
	pub is_active: bool,
	pub is_staff: bool,
}

impl UserProfile {
	pub fn to_auth_user(&self) -> AuthUser {
		AuthUser {
			id: self.id,
			username: self.email.clone(),
			password_hash: self.password.clone(),
			is_active: self.is_active,
			is_staff: self.is_staff,
		}
	}
}

impl OwnedObject for UserProfile {
	fn owner_id(&self) -> i64 {
		self.id
	}
}

impl Searchable for UserProfile {
	fn searchable_fields() -> &'static [&'static str] {
		&["name", "email"]
	}

	fn field_value(&self, field: &str) -> Option<&str> {
		match field {
			"name" => Some(&self.name),
			"email" => Some(&self.email),
			_ => None,
		}
	}
}

/// Status update posted by a profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileFeedItem {
	pub id: i64,
	/// Owning profile id.
	pub user_profile: i64,
	pub status_text: String,
	pub created_on: DateTime<Utc>,
}

impl OwnedObject for ProfileFeedItem {
	fn owner_id(&self) -> i64 {
		self.user_profile
	}
}
