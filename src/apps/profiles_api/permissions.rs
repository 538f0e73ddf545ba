use async_trait::async_trait;
use hyper::Method;

use crate::auth::{OwnedObject, Permission, PermissionContext, is_owner_or_safe};

/// Profiles can only be changed by themselves. Staff may also delete any
/// profile.
pub struct UpdateOwnProfile;

#[async_trait]
impl Permission for UpdateOwnProfile {
	async fn has_object_permission(
		&self,
		context: &PermissionContext<'_>,
		object: &dyn OwnedObject,
	) -> bool {
		if context.is_admin && context.request.method == Method::DELETE {
			return true;
		}
		is_owner_or_safe(context.user_id, object.owner_id(), &context.request.method)
	}
}

/// Feed items can only be changed by the profile that posted them.
pub struct UpdateOwnStatus;

#[async_trait]
impl Permission for UpdateOwnStatus {
	async fn has_object_permission(
		&self,
		context: &PermissionContext<'_>,
		object: &dyn OwnedObject,
	) -> bool {
		is_owner_or_safe(context.user_id, object.owner_id(), &context.request.method)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::auth::AuthState;
	use crate::core::Request;
	use rstest::rstest;

	struct Owned(i64);

	impl OwnedObject for Owned {
		fn owner_id(&self) -> i64 {
			self.0
		}
	}

	async fn check(permission: impl Permission, method: Method, auth: AuthState) -> bool {
		let request = Request::builder().method(method).uri("/").build().unwrap();
		let context = PermissionContext::new(&request, &auth);
		permission.has_object_permission(&context, &Owned(1)).await
	}

	#[rstest]
	#[case(Method::GET, AuthState::anonymous(), true)]
	#[case(Method::PUT, AuthState::anonymous(), false)]
	#[case(Method::PUT, AuthState::authenticated(1, false, true), true)]
	#[case(Method::PATCH, AuthState::authenticated(2, false, true), false)]
	#[case(Method::DELETE, AuthState::authenticated(2, false, true), false)]
	#[case(Method::DELETE, AuthState::authenticated(2, true, true), true)]
	#[case(Method::PUT, AuthState::authenticated(2, true, true), false)]
	#[tokio::test]
	async fn test_update_own_profile(
		#[case] method: Method,
		#[case] auth: AuthState,
		#[case] expected: bool,
	) {
		assert_eq!(check(UpdateOwnProfile, method, auth).await, expected);
	}

	#[rstest]
	#[case(Method::GET, AuthState::authenticated(2, false, true), true)]
	#[case(Method::PATCH, AuthState::authenticated(1, false, true), true)]
	#[case(Method::PATCH, AuthState::authenticated(2, false, true), false)]
	#[case(Method::DELETE, AuthState::authenticated(2, true, true), false)]
	#[tokio::test]
	async fn test_update_own_status(
		#[case] method: Method,
		#[case] auth: AuthState,
		#[case] expected: bool,
	) {
		assert_eq!(check(UpdateOwnStatus, method, auth).await, expected);
	}
}
