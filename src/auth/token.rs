//! Token storage for bearer-token authentication.
//!
//! Each user owns at most one token. Logging in again returns the existing
//! token; tokens never expire.

use std::collections::HashMap;
use std::fmt::Write as _;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rand::RngCore;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

/// Number of random bytes in a token key; the key is their hex encoding.
const TOKEN_BYTES: usize = 20;

/// Stored token information
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredToken {
	/// The token value
	pub key: String,
	/// Associated user ID
	pub user_id: i64,
	pub created: DateTime<Utc>,
}

impl StoredToken {
	/// Issue a fresh token for `user_id`.
	///
	/// # Examples
	///
	/// ```
	/// use profiles_rest_api::auth::StoredToken;
	///
	/// let token = StoredToken::generate(42);
	/// assert_eq!(token.user_id, 42);
	/// assert_eq!(token.key.len(), 40);
	/// ```
	pub fn generate(user_id: i64) -> Self {
		Self {
			key: generate_key(),
			user_id,
			created: Utc::now(),
		}
	}
}

fn generate_key() -> String {
	let mut bytes = [0u8; TOKEN_BYTES];
	rand::thread_rng().fill_bytes(&mut bytes);

	bytes.iter().fold(String::with_capacity(TOKEN_BYTES * 2), |mut key, byte| {
		let _ = write!(key, "{byte:02x}");
		key
	})
}

/// Token storage backend trait
#[async_trait]
pub trait TokenStorage: Send + Sync {
	/// Returns the user's token, creating one if none exists.
	async fn get_or_create(&self, user_id: i64) -> StoredToken;

	/// Retrieve a token by its key
	async fn get(&self, key: &str) -> Option<StoredToken>;

	/// Delete all tokens for a user
	async fn delete_user_tokens(&self, user_id: i64) -> usize;
}

/// In-memory token storage
#[derive(Debug, Clone, Default)]
pub struct InMemoryTokenStorage {
	tokens: Arc<RwLock<HashMap<String, StoredToken>>>,
}

impl InMemoryTokenStorage {
	pub fn new() -> Self {
		Self::default()
	}
}

#[async_trait]
impl TokenStorage for InMemoryTokenStorage {
	async fn get_or_create(&self, user_id: i64) -> StoredToken {
		let mut tokens = self.tokens.write().await;
		if let Some(existing) = tokens.values().find(|t| t.user_id == user_id) {
			return existing.clone();
		}

		let token = StoredToken::generate(user_id);
		tokens.insert(token.key.clone(), token.clone());
		tracing::debug!(user_id, "issued new auth token");
		token
	}

	async fn get(&self, key: &str) -> Option<StoredToken> {
		self.tokens.read().await.get(key).cloned()
	}

	async fn delete_user_tokens(&self, user_id: i64) -> usize {
		let mut tokens = self.tokens.write().await;
		let before = tokens.len();
		tokens.retain(|_, token| token.user_id != user_id);
		before - tokens.len()
	}
}
