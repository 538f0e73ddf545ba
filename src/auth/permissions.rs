//! Permission classes.
//!
//! A view runs `has_permission` for every class before touching any record,
//! then `has_object_permission` once the target record is loaded. Both passes
//! require every class to allow the request.

use async_trait::async_trait;
use hyper::Method;

use super::authentication::AuthState;
use crate::core::{Request, is_safe_method};

/// Everything a permission class may look at.
pub struct PermissionContext<'a> {
	pub request: &'a Request,
	pub is_authenticated: bool,
	pub is_admin: bool,
	pub is_active: bool,
	pub user_id: Option<i64>,
}

impl<'a> PermissionContext<'a> {
	pub fn new(request: &'a Request, auth: &AuthState) -> Self {
		Self {
			request,
			is_authenticated: auth.is_authenticated(),
			is_admin: auth.is_admin,
			is_active: auth.is_active,
			user_id: auth.user_id,
		}
	}
}

/// A record with an owning user.
pub trait OwnedObject: Send + Sync {
	fn owner_id(&self) -> i64;
}

#[async_trait]
pub trait Permission: Send + Sync {
	async fn has_permission(&self, _context: &PermissionContext<'_>) -> bool {
		true
	}

	async fn has_object_permission(
		&self,
		_context: &PermissionContext<'_>,
		_object: &dyn OwnedObject,
	) -> bool {
		true
	}
}

/// Safe methods are always allowed; anything else only for the owner.
///
/// # Examples
///
/// ```
/// use hyper::Method;
/// use profiles_rest_api::auth::is_owner_or_safe;
///
/// assert!(is_owner_or_safe(None, 1, &Method::GET));
/// assert!(is_owner_or_safe(Some(1), 1, &Method::DELETE));
/// assert!(!is_owner_or_safe(Some(2), 1, &Method::PUT));
/// assert!(!is_owner_or_safe(None, 1, &Method::PATCH));
/// ```
pub fn is_owner_or_safe(requester: Option<i64>, owner: i64, method: &Method) -> bool {
	is_safe_method(method) || requester == Some(owner)
}

/// Require an authenticated user
pub struct IsAuthenticated;

#[async_trait]
impl Permission for IsAuthenticated {
	async fn has_permission(&self, context: &PermissionContext<'_>) -> bool {
		context.is_authenticated
	}
}
