//! # profiles-rest-api
//!
//! User profiles, a per-profile status feed and token login over a small
//! hyper-based HTTP stack.
//!
//! The crate is organised like a project of apps:
//!
//! - [`core`]: request/response types, routing, viewsets and the server
//! - [`auth`]: token authentication, password hashing and permissions
//! - [`apps`]: the `hello` demo endpoints and the `profiles_api` app
//! - [`config`]: layered settings and the URL table
//!
//! ```
//! use profiles_rest_api::{AppState, build_app};
//!
//! let app = build_app(AppState::new());
//! # let _ = app;
//! ```

pub mod apps;
pub mod auth;
pub mod config;
pub mod core;

use std::sync::Arc;

use crate::apps::profiles_api::store::{FeedStore, ProfileStore};
use crate::auth::{Argon2Hasher, InMemoryTokenStorage, PasswordHasher, TokenStorage};
use crate::core::{Handler, MiddlewareChain, RequestLoggingMiddleware};

/// Stores and services shared by every view.
#[derive(Clone)]
pub struct AppState {
	pub profiles: ProfileStore,
	pub feed: FeedStore,
	pub tokens: Arc<dyn TokenStorage>,
	pub hasher: Arc<dyn PasswordHasher>,
}

impl AppState {
	/// Empty in-memory stores with Argon2 password hashing.
	pub fn new() -> Self {
		let profiles = ProfileStore::new();
		Self {
			feed: FeedStore::new(&profiles),
			profiles,
			tokens: Arc::new(InMemoryTokenStorage::new()),
			hasher: Arc::new(Argon2Hasher::new()),
		}
	}
}

impl Default for AppState {
	fn default() -> Self {
		Self::new()
	}
}

/// The root handler: every URL pattern behind the request logging middleware.
pub fn build_app(state: AppState) -> Arc<dyn Handler> {
	let router = config::urls::url_patterns(&state);
	Arc::new(
		MiddlewareChain::new(Arc::new(router)).with_middleware(Arc::new(RequestLoggingMiddleware)),
	)
}
