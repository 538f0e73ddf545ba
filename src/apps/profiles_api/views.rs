use std::sync::Arc;

use async_trait::async_trait;
use hyper::Method;
use serde_json::json;

use super::models::{ProfileFeedItem, UserProfile};
use super::permissions::{UpdateOwnProfile, UpdateOwnStatus};
use super::serializers::{
	AuthTokenSerializer, ProfileFeedItemSerializer, UserProfileResponse, UserProfileSerializer,
};
use super::store::{FeedStore, NewProfile, ProfileChanges, ProfileStore};
use crate::AppState;
use crate::auth::{
	IsAuthenticated, ModelBackend, PasswordHasher, TokenAuthentication, TokenStorage,
};
use crate::core::serializers::parse;
use crate::core::{
	ActionType, Error, Handler, NON_FIELD_ERRORS, Request, Response, Result, SearchFilter,
	ViewConfig, ViewSet, lookup_pk,
};

fn token_authentication(state: &AppState) -> Arc<TokenAuthentication> {
	Arc::new(TokenAuthentication::new(
		state.tokens.clone(),
		Arc::new(state.profiles.clone()),
	))
}

/// Profiles: anyone may register and read, only the owner may change.
pub struct ProfileViewSet {
	config: ViewConfig,
	profiles: ProfileStore,
	feed: FeedStore,
	tokens: Arc<dyn TokenStorage>,
	hasher: Arc<dyn PasswordHasher>,
	search: SearchFilter,
}

impl ProfileViewSet {
	pub fn new(state: &AppState) -> Self {
		Self {
			config: ViewConfig::new()
				.with_authenticator(token_authentication(state))
				.with_permission(Arc::new(UpdateOwnProfile)),
			profiles: state.profiles.clone(),
			feed: state.feed.clone(),
			tokens: state.tokens.clone(),
			hasher: state.hasher.clone(),
			search: SearchFilter::default(),
		}
	}

	async fn get_object(&self, request: &Request) -> Result<UserProfile> {
		let profile = self
			.profiles
			.get(lookup_pk(request)?)
			.await
			.ok_or(Error::NotFound)?;
		self.config
			.check_object_permissions(request, &profile)
			.await?;
		Ok(profile)
	}

	fn hash(&self, password: Option<String>) -> Result<Option<String>> {
		password
			.map(|password| self.hasher.hash(&password))
			.transpose()
	}

	async fn create(&self, request: Request) -> Result<Response> {
		let input = parse::<UserProfileSerializer>(request.data()?)?.clean(false)?;
		let password_hash = self.hash(input.password)?.unwrap_or_default();

		let profile = self
			.profiles
			.create(NewProfile {
				email: input.email.unwrap_or_default(),
				name: input.name.unwrap_or_default(),
				password_hash,
				is_staff: false,
			})
			.await?;

		Response::created().with_json(&UserProfileResponse::from(&profile))
	}

	async fn update(&self, request: Request, partial: bool) -> Result<Response> {
		let profile = self.get_object(&request).await?;
		let input = parse::<UserProfileSerializer>(request.data()?)?.clean(partial)?;

		let changes = ProfileChanges {
			email: input.email,
			name: input.name,
			password_hash: self.hash(input.password)?,
		};
		let updated = self.profiles.update(profile.id, changes).await?;

		Response::ok().with_json(&UserProfileResponse::from(&updated))
	}

	async fn destroy(&self, request: Request) -> Result<Response> {
		let profile = self.get_object(&request).await?;

		let items = self
			.profiles
			.delete(profile.id, &self.feed)
			.await
			.map_or(0, |(_, items)| items);
		let tokens = self.tokens.delete_user_tokens(profile.id).await;
		tracing::info!(
			profile_id = profile.id,
			feed_items = items,
			tokens,
			"profile deleted"
		);

		Ok(Response::no_content())
	}
}

#[async_trait]
impl ViewSet for ProfileViewSet {
	fn basename(&self) -> &str {
		"userprofile"
	}

	fn config(&self) -> &ViewConfig {
		&self.config
	}

	async fn dispatch(&self, request: Request, action: ActionType) -> Result<Response> {
		match action {
			ActionType::List => {
				let terms = self.search.terms(&request);
				let profiles: Vec<UserProfileResponse> = self
					.profiles
					.search(&terms)
					.await
					.iter()
					.map(UserProfileResponse::from)
					.collect();
				Response::ok().with_json(&profiles)
			}
			ActionType::Retrieve => {
				let profile = self.get_object(&request).await?;
				Response::ok().with_json(&UserProfileResponse::from(&profile))
			}
			ActionType::Create => self.create(request).await,
			ActionType::Update => self.update(request, false).await,
			ActionType::PartialUpdate => self.update(request, true).await,
			ActionType::Destroy => self.destroy(request).await,
		}
	}
}

/// Status feed: authenticated profiles read everything and post as
/// themselves.
pub struct FeedViewSet {
	config: ViewConfig,
	feed: FeedStore,
}

impl FeedViewSet {
	pub fn new(state: &AppState) -> Self {
		Self {
			config: ViewConfig::new()
				.with_authenticator(token_authentication(state))
				.with_permission(Arc::new(UpdateOwnStatus))
				.with_permission(Arc::new(IsAuthenticated)),
			feed: state.feed.clone(),
		}
	}

	async fn get_object(&self, request: &Request) -> Result<ProfileFeedItem> {
		let item = self
			.feed
			.get(lookup_pk(request)?)
			.await
			.ok_or(Error::NotFound)?;
		self.config.check_object_permissions(request, &item).await?;
		Ok(item)
	}

	async fn create(&self, request: Request) -> Result<Response> {
		let owner = request.auth().user_id.ok_or(Error::NotAuthenticated)?;
		let input = parse::<ProfileFeedItemSerializer>(request.data()?)?.clean(false)?;

		let item = self
			.feed
			.create(owner, input.status_text.unwrap_or_default())
			.await?;
		tracing::debug!(item_id = item.id, owner, "feed item created");

		Response::created().with_json(&item)
	}

	async fn update(&self, request: Request, partial: bool) -> Result<Response> {
		let item = self.get_object(&request).await?;
		let input = parse::<ProfileFeedItemSerializer>(request.data()?)?.clean(partial)?;

		let updated = match input.status_text {
			Some(status_text) => self.feed.update(item.id, status_text).await?,
			None => item,
		};

		Response::ok().with_json(&updated)
	}
}

#[async_trait]
impl ViewSet for FeedViewSet {
	fn basename(&self) -> &str {
		"profilefeeditem"
	}

	fn config(&self) -> &ViewConfig {
		&self.config
	}

	async fn dispatch(&self, request: Request, action: ActionType) -> Result<Response> {
		match action {
			ActionType::List => Response::ok().with_json(&self.feed.list().await),
			ActionType::Retrieve => {
				let item = self.get_object(&request).await?;
				Response::ok().with_json(&item)
			}
			ActionType::Create => self.create(request).await,
			ActionType::Update => self.update(request, false).await,
			ActionType::PartialUpdate => self.update(request, true).await,
			ActionType::Destroy => {
				let item = self.get_object(&request).await?;
				self.feed.delete(item.id).await;
				Ok(Response::no_content())
			}
		}
	}
}

/// `POST /login/`: exchanges an email and password for the profile's token.
pub struct ObtainAuthToken {
	backend: ModelBackend,
	tokens: Arc<dyn TokenStorage>,
}

impl ObtainAuthToken {
	pub const INVALID_CREDENTIALS: &'static str = "Unable to log in with provided credentials.";

	pub fn new(state: &AppState) -> Self {
		Self {
			backend: ModelBackend::new(Arc::new(state.profiles.clone()), state.hasher.clone()),
			tokens: state.tokens.clone(),
		}
	}
}

#[async_trait]
impl Handler for ObtainAuthToken {
	async fn handle(&self, request: Request) -> Result<Response> {
		if request.method != Method::POST {
			return Err(Error::MethodNotAllowed {
				method: request.method.clone(),
				allowed: vec![Method::POST],
			});
		}

		let (username, password) = parse::<AuthTokenSerializer>(request.data()?)?.clean()?;
		let user = self
			.backend
			.authenticate(&username, &password)
			.await?
			.ok_or_else(|| Error::field(NON_FIELD_ERRORS, Self::INVALID_CREDENTIALS))?;

		let token = self.tokens.get_or_create(user.id).await;
		Response::ok().with_json(&json!({ "token": token.key }))
	}
}
