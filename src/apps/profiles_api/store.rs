//! In-process stores for profiles and feed items.
//!
//! Each operation takes one lock for its whole read-modify-write. Operations
//! spanning both tables lock profiles before feed items.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use super::models::{ProfileFeedItem, UserProfile};
use crate::auth::{AuthUser, UserRepository};
use crate::core::{Error, Result, SearchFilter};

pub const DUPLICATE_EMAIL: &str = "user profile with this email already exists.";

pub const OWNER_GONE: &str = "User inactive or deleted.";

/// Lower-cases the domain part of an address.
///
/// # Examples
///
/// ```
/// use profiles_rest_api::apps::profiles_api::store::normalize_email;
///
/// assert_eq!(normalize_email("Ada@Example.COM"), "Ada@example.com");
/// ```
pub fn normalize_email(email: &str) -> String {
	match email.rsplit_once('@') {
		Some((local, domain)) => format!("{local}@{}", domain.to_lowercase()),
		None => email.to_string(),
	}
}

/// Fields of a profile to be created.
#[derive(Debug, Clone)]
pub struct NewProfile {
	pub email: String,
	pub name: String,
	pub password_hash: String,
	pub is_staff: bool,
}

/// Fields to overwrite on an existing profile; `None` keeps the current value.
#[derive(Debug, Clone, Default)]
pub struct ProfileChanges {
	pub email: Option<String>,
	pub name: Option<String>,
	pub password_hash: Option<String>,
}

#[derive(Debug)]
struct Table<T> {
	last_id: i64,
	rows: BTreeMap<i64, T>,
}

impl<T> Default for Table<T> {
	fn default() -> Self {
		Self {
			last_id: 0,
			rows: BTreeMap::new(),
		}
	}
}

impl<T> Table<T> {
	fn next_id(&mut self) -> i64 {
		self.last_id += 1;
		self.last_id
	}
}

#[derive(Debug, Clone, Default)]
pub struct ProfileStore {
	table: Arc<RwLock<Table<UserProfile>>>,
}

impl ProfileStore {
	pub fn new() -> Self {
		Self::default()
	}

	pub async fn create(&self, profile: NewProfile) -> Result<UserProfile> {
		let email = normalize_email(&profile.email);
		let mut table = self.table.write().await;
		if table.rows.values().any(|p| p.email == email) {
			return Err(Error::field("email", DUPLICATE_EMAIL));
		}

		let id = table.next_id();
		let created = UserProfile {
			id,
			email,
			name: profile.name,
			password: profile.password_hash,
			is_active: true,
			is_staff: profile.is_staff,
		};
		table.rows.insert(id, created.clone());
		tracing::info!(profile_id = id, "profile created");
		Ok(created)
	}

	pub async fn get(&self, id: i64) -> Option<UserProfile> {
		self.table.read().await.rows.get(&id).cloned()
	}

	/// Profiles matching every search term, ordered by id.
	pub async fn search(&self, terms: &[String]) -> Vec<UserProfile> {
		self.table
			.read()
			.await
			.rows
			.values()
			.filter(|profile| SearchFilter::matches(*profile, terms))
			.cloned()
			.collect()
	}

	pub async fn update(&self, id: i64, changes: ProfileChanges) -> Result<UserProfile> {
		let mut table = self.table.write().await;
		let email = changes.email.as_deref().map(normalize_email);
		if let Some(email) = &email
			&& table.rows.values().any(|p| p.id != id && &p.email == email)
		{
			return Err(Error::field("email", DUPLICATE_EMAIL));
		}

		let profile = table.rows.get_mut(&id).ok_or(Error::NotFound)?;
		if let Some(email) = email {
			profile.email = email;
		}
		if let Some(name) = changes.name {
			profile.name = name;
		}
		if let Some(password_hash) = changes.password_hash {
			profile.password = password_hash;
		}
		Ok(profile.clone())
	}

	pub async fn set_active(&self, id: i64, is_active: bool) -> Result<()> {
		let mut table = self.table.write().await;
		let profile = table.rows.get_mut(&id).ok_or(Error::NotFound)?;
		profile.is_active = is_active;
		Ok(())
	}

	/// Removes a profile together with its feed items, returning the profile
	/// and the number of items removed.
	///
	/// The profiles lock is held until the items are gone, so
	/// [`FeedStore::create`] cannot attach an item to the removed profile.
	pub async fn delete(&self, id: i64, feed: &FeedStore) -> Option<(UserProfile, usize)> {
		let mut profiles = self.table.write().await;
		let profile = profiles.rows.remove(&id)?;

		let mut items = feed.table.write().await;
		let before = items.rows.len();
		items.rows.retain(|_, item| item.user_profile != id);
		Some((profile, before - items.rows.len()))
	}
}

#[async_trait]
impl UserRepository for ProfileStore {
	async fn get_user(&self, user_id: i64) -> Option<AuthUser> {
		self.get(user_id).await.map(|p| p.to_auth_user())
	}

	async fn get_by_username(&self, username: &str) -> Option<AuthUser> {
		self.table
			.read()
			.await
			.rows
			.values()
			.find(|p| p.email == username)
			.map(UserProfile::to_auth_user)
	}
}

/// Feed items; every item belongs to a profile of the linked [`ProfileStore`].
#[derive(Debug, Clone)]
pub struct FeedStore {
	table: Arc<RwLock<Table<ProfileFeedItem>>>,
	profiles: Arc<RwLock<Table<UserProfile>>>,
}

impl FeedStore {
	pub fn new(profiles: &ProfileStore) -> Self {
		Self {
			table: Arc::default(),
			profiles: profiles.table.clone(),
		}
	}

	/// Adds an item owned by `user_profile`, which must still exist.
	pub async fn create(&self, user_profile: i64, status_text: String) -> Result<ProfileFeedItem> {
		let profiles = self.profiles.read().await;
		if !profiles.rows.contains_key(&user_profile) {
			return Err(Error::AuthenticationFailed(OWNER_GONE.to_string()));
		}

		let mut table = self.table.write().await;
		let id = table.next_id();
		let item = ProfileFeedItem {
			id,
			user_profile,
			status_text,
			created_on: Utc::now(),
		};
		table.rows.insert(id, item.clone());
		Ok(item)
	}

	pub async fn get(&self, id: i64) -> Option<ProfileFeedItem> {
		self.table.read().await.rows.get(&id).cloned()
	}

	/// All items ordered by id.
	pub async fn list(&self) -> Vec<ProfileFeedItem> {
		self.table.read().await.rows.values().cloned().collect()
	}

	pub async fn update(&self, id: i64, status_text: String) -> Result<ProfileFeedItem> {
		let mut table = self.table.write().await;
		let item = table.rows.get_mut(&id).ok_or(Error::NotFound)?;
		item.status_text = status_text;
		Ok(item.clone())
	}

	pub async fn delete(&self, id: i64) -> Option<ProfileFeedItem> {
		self.table.write().await.rows.remove(&id)
	}
}
