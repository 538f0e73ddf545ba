use serde::{Deserialize, Serialize};
use validator::Validate;

use super::models::UserProfile;
use crate::core::serializers::{InputSerializer, clean_char_field};
use crate::core::{FieldErrors, Result};

/// Input for profile create and update. The password is write-only.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UserProfileSerializer {
	#[validate(
		email(message = "Enter a valid email address."),
		length(max = 255, message = "Ensure this field has no more than 255 characters.")
	)]
	pub email: Option<String>,

	#[validate(length(max = 255, message = "Ensure this field has no more than 255 characters."))]
	pub name: Option<String>,

	#[validate(length(max = 128, message = "Ensure this field has no more than 128 characters."))]
	pub password: Option<String>,
}

impl InputSerializer for UserProfileSerializer {
	const CHAR_FIELDS: &'static [&'static str] = &["email", "name", "password"];
}

impl UserProfileSerializer {
	/// Applies the field rules. With `partial` absent fields are allowed.
	pub fn clean(mut self, partial: bool) -> Result<Self> {
		let mut errors = FieldErrors::new();
		clean_char_field(&mut errors, "email", &mut self.email, partial, true);
		clean_char_field(&mut errors, "name", &mut self.name, partial, true);
		clean_char_field(&mut errors, "password", &mut self.password, partial, false);
		if let Err(validation) = self.validate() {
			errors.merge_validator(&validation);
		}
		errors.into_result()?;
		Ok(self)
	}
}

/// Public representation of a profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfileResponse {
	pub id: i64,
	pub email: String,
	pub name: String,
}

impl From<&UserProfile> for UserProfileResponse {
	fn from(profile: &UserProfile) -> Self {
		Self {
			id: profile.id,
			email: profile.email.clone(),
			name: profile.name.clone(),
		}
	}
}

/// Input for feed item create and update.
///
/// Only `status_text` is writable; the owner and timestamp are ignored.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct ProfileFeedItemSerializer {
	#[validate(length(max = 255, message = "Ensure this field has no more than 255 characters."))]
	pub status_text: Option<String>,
}

impl InputSerializer for ProfileFeedItemSerializer {
	const CHAR_FIELDS: &'static [&'static str] = &["status_text"];
}

impl ProfileFeedItemSerializer {
	pub fn clean(mut self, partial: bool) -> Result<Self> {
		let mut errors = FieldErrors::new();
		clean_char_field(&mut errors, "status_text", &mut self.status_text, partial, true);
		if let Err(validation) = self.validate() {
			errors.merge_validator(&validation);
		}
		errors.into_result()?;
		Ok(self)
	}
}

/// Credentials posted to the login endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AuthTokenSerializer {
	pub username: Option<String>,
	pub password: Option<String>,
}

impl InputSerializer for AuthTokenSerializer {
	const CHAR_FIELDS: &'static [&'static str] = &["username", "password"];
}

impl AuthTokenSerializer {
	/// Returns `(username, password)`.
	pub fn clean(mut self) -> Result<(String, String)> {
		let mut errors = FieldErrors::new();
		clean_char_field(&mut errors, "username", &mut self.username, false, true);
		clean_char_field(&mut errors, "password", &mut self.password, false, false);
		errors.into_result()?;
		Ok((
			self.username.unwrap_or_default(),
			self.password.unwrap_or_default(),
		))
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::core::serializers::parse;
	use crate::core::{BLANK, Error, REQUIRED};
	use rstest::rstest;
	use serde_json::{Value, json};

	fn field_errors(result: Result<impl std::fmt::Debug>) -> FieldErrors {
		match result {
			Err(Error::Validation(errors)) => errors,
			other => panic!("expected validation error, got {other:?}"),
		}
	}

	fn profile(data: Value) -> UserProfileSerializer {
		let Value::Object(map) = data else {
			panic!("expected object");
		};
		parse(map).unwrap()
	}

	#[rstest]
	fn test_full_profile_is_valid() {
		let cleaned = profile(json!({
			"email": " ada@example.com ",
			"name": "Ada",
			"password": " pw ",
			"id": 99,
		}))
		.clean(false)
		.unwrap();

		assert_eq!(cleaned.email.as_deref(), Some("ada@example.com"));
		assert_eq!(cleaned.password.as_deref(), Some(" pw "));
	}

	#[rstest]
	fn test_missing_fields_are_required() {
		let errors = field_errors(profile(json!({})).clean(false));

		for field in ["email", "name", "password"] {
			assert_eq!(errors.get(field).unwrap(), &[REQUIRED.to_string()]);
		}
	}

	#[rstest]
	fn test_partial_allows_missing_fields() {
		let cleaned = profile(json!({ "name": "Ada" })).clean(true).unwrap();

		assert_eq!(cleaned.name.as_deref(), Some("Ada"));
		assert!(cleaned.email.is_none());
	}

	#[rstest]
	#[case(json!({ "email": "not-an-email" }), "email", "Enter a valid email address.")]
	#[case(json!({ "email": "" }), "email", BLANK)]
	#[case(json!({ "name": "   " }), "name", BLANK)]
	#[case(json!({ "name": "x".repeat(256) }), "name", "Ensure this field has no more than 255 characters.")]
	fn test_field_rules(#[case] data: Value, #[case] field: &str, #[case] message: &str) {
		let errors = field_errors(profile(data).clean(true));

		assert_eq!(errors.get(field).unwrap(), &[message.to_string()]);
	}

	#[rstest]
	#[case(None, REQUIRED)]
	#[case(Some(String::new()), BLANK)]
	#[case(Some("x".repeat(256)), "Ensure this field has no more than 255 characters.")]
	fn test_status_text_rules(#[case] status_text: Option<String>, #[case] message: &str) {
		let input = ProfileFeedItemSerializer { status_text };

		let errors = field_errors(input.clean(false));

		assert_eq!(errors.get("status_text").unwrap(), &[message.to_string()]);
	}

	#[rstest]
	fn test_login_requires_both_fields() {
		let errors = field_errors(AuthTokenSerializer::default().clean());

		assert!(errors.contains("username"));
		assert!(errors.contains("password"));
	}
}
