//! Request authentication.
//!
//! Authenticators inspect a request and either identify a user, report that
//! no credentials were presented, or reject the request outright.

use std::sync::Arc;

use async_trait::async_trait;
use hyper::header::AUTHORIZATION;

use super::backend::UserRepository;
use super::token::TokenStorage;
use crate::core::{Error, Request, Result};

/// Authentication state stored in request extensions.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AuthState {
	/// `None` for anonymous requests.
	pub user_id: Option<i64>,

	/// Whether the user has admin/staff privileges.
	pub is_admin: bool,

	/// Whether the user's account is active.
	pub is_active: bool,
}

impl AuthState {
	pub fn authenticated(user_id: i64, is_admin: bool, is_active: bool) -> Self {
		Self {
			user_id: Some(user_id),
			is_admin,
			is_active,
		}
	}

	pub fn anonymous() -> Self {
		Self {
			user_id: None,
			is_admin: false,
			is_active: false,
		}
	}

	pub fn is_authenticated(&self) -> bool {
		self.user_id.is_some()
	}
}

/// An authentication scheme.
#[async_trait]
pub trait Authentication: Send + Sync {
	/// `Ok(None)` when the request carries no credentials for this scheme.
	async fn authenticate(&self, request: &Request) -> Result<Option<AuthState>>;
}

/// `Authorization: Token <key>` authentication.
pub struct TokenAuthentication {
	tokens: Arc<dyn TokenStorage>,
	users: Arc<dyn UserRepository>,
}

impl TokenAuthentication {
	pub const KEYWORD: &'static str = "Token";

	pub fn new(tokens: Arc<dyn TokenStorage>, users: Arc<dyn UserRepository>) -> Self {
		Self { tokens, users }
	}

	/// Extracts the key from an `Authorization` header value.
	///
	/// `Ok(None)` when the header uses another scheme.
	fn parse_header(value: &str) -> Result<Option<&str>> {
		let mut parts = value.split_whitespace();
		let keyword_matches = parts
			.next()
			.is_some_and(|keyword| keyword.eq_ignore_ascii_case(Self::KEYWORD));
		if !keyword_matches {
			return Ok(None);
		}

		match (parts.next(), parts.next()) {
			(None, _) => Err(Error::AuthenticationFailed(
				"Invalid token header. No credentials provided.".into(),
			)),
			(Some(_), Some(_)) => Err(Error::AuthenticationFailed(
				"Invalid token header. Token string should not contain spaces.".into(),
			)),
			(Some(key), None) => Ok(Some(key)),
		}
	}
}

#[async_trait]
impl Authentication for TokenAuthentication {
	async fn authenticate(&self, request: &Request) -> Result<Option<AuthState>> {
		let Some(header) = request.header(AUTHORIZATION.as_str()) else {
			return Ok(None);
		};
		let Some(key) = Self::parse_header(header)? else {
			return Ok(None);
		};

		let token = self
			.tokens
			.get(key)
			.await
			.ok_or_else(|| Error::AuthenticationFailed("Invalid token.".into()))?;

		let user = self
			.users
			.get_user(token.user_id)
			.await
			.filter(|user| user.is_active)
			.ok_or_else(|| Error::AuthenticationFailed("User inactive or deleted.".into()))?;

		Ok(Some(AuthState::authenticated(user.id, user.is_staff, true)))
	}
}
