//! Credential checking against a user repository.

use std::sync::Arc;

use async_trait::async_trait;

use super::hasher::PasswordHasher;
use crate::core::Result;

/// The parts of a user record authentication cares about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthUser {
	pub id: i64,
	pub username: String,
	pub password_hash: String,
	pub is_active: bool,
	pub is_staff: bool,
}

/// Lookup of users by id or username.
#[async_trait]
pub trait UserRepository: Send + Sync {
	async fn get_user(&self, user_id: i64) -> Option<AuthUser>;

	async fn get_by_username(&self, username: &str) -> Option<AuthUser>;
}

/// Username/password authentication backend.
#[derive(Clone)]
pub struct ModelBackend {
	users: Arc<dyn UserRepository>,
	hasher: Arc<dyn PasswordHasher>,
}

impl ModelBackend {
	pub fn new(users: Arc<dyn UserRepository>, hasher: Arc<dyn PasswordHasher>) -> Self {
		Self { users, hasher }
	}

	/// Returns the user when the password matches and the account is active.
	///
	/// An unknown username still costs one password hash, so response timing
	/// does not reveal which usernames exist.
	pub async fn authenticate(&self, username: &str, password: &str) -> Result<Option<AuthUser>> {
		let Some(user) = self.users.get_by_username(username).await else {
			self.hasher.hash(password)?;
			tracing::debug!("login attempt for unknown user");
			return Ok(None);
		};

		if !self.hasher.verify(password, &user.password_hash)? {
			tracing::debug!(user_id = user.id, "login attempt with wrong password");
			return Ok(None);
		}

		if !user.is_active {
			tracing::debug!(user_id = user.id, "login attempt for inactive user");
			return Ok(None);
		}

		Ok(Some(user))
	}
}
