use serde::Deserialize;
use validator::Validate;

use crate::core::serializers::{InputSerializer, clean_char_field};
use crate::core::{FieldErrors, Result};

/// Input of the hello `POST` endpoints.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct HelloSerializer {
	#[validate(length(max = 10, message = "Ensure this field has no more than 10 characters."))]
	pub name: Option<String>,
}

impl InputSerializer for HelloSerializer {
	const CHAR_FIELDS: &'static [&'static str] = &["name"];
}

impl HelloSerializer {
	/// Validates the input and returns the trimmed name.
	pub fn clean(mut self) -> Result<String> {
		let mut errors = FieldErrors::new();
		clean_char_field(&mut errors, "name", &mut self.name, false, true);
		if let Err(validation) = self.validate() {
			errors.merge_validator(&validation);
		}
		errors.into_result()?;

		Ok(self.name.unwrap_or_default())
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::core::{BLANK, Error, REQUIRED};
	use rstest::rstest;

	fn name(value: Option<&str>) -> HelloSerializer {
		HelloSerializer {
			name: value.map(str::to_string),
		}
	}

	#[rstest]
	#[case(Some("Ada"), "Ada")]
	#[case(Some(" Ada "), "Ada")]
	#[case(Some("abcdefghij"), "abcdefghij")]
	fn test_valid_names(#[case] input: Option<&str>, #[case] expected: &str) {
		assert_eq!(name(input).clean().unwrap(), expected);
	}

	#[rstest]
	#[case(None, REQUIRED)]
	#[case(Some(""), BLANK)]
	#[case(Some("abcdefghijk"), "Ensure this field has no more than 10 characters.")]
	fn test_invalid_names(#[case] input: Option<&str>, #[case] expected: &str) {
		let Err(Error::Validation(errors)) = name(input).clean() else {
			panic!("expected validation error");
		};
		assert_eq!(errors.get("name").unwrap(), &[expected.to_string()]);
	}
}
