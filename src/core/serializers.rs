//! Helpers shared by the input serializers.

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use super::error::{BLANK, FieldErrors, INVALID_STRING, NULL, REQUIRED, Result};

/// An input type made of string fields.
pub trait InputSerializer: DeserializeOwned {
	/// Names of the string fields read from the request data.
	const CHAR_FIELDS: &'static [&'static str];
}

/// Deserializes request data into an input type. Unknown keys are ignored.
///
/// Numbers given for a string field are accepted as their decimal text.
/// `null` and other non-string values are reported per field.
///
/// # Examples
///
/// ```
/// use profiles_rest_api::apps::hello::serializers::HelloSerializer;
/// use profiles_rest_api::core::serializers::parse;
/// use serde_json::json;
///
/// let data = json!({ "name": 123 }).as_object().cloned().unwrap();
/// let input: HelloSerializer = parse(data).unwrap();
/// assert_eq!(input.name.as_deref(), Some("123"));
/// ```
pub fn parse<T: InputSerializer>(mut data: Map<String, Value>) -> Result<T> {
	let mut errors = FieldErrors::new();
	for field in T::CHAR_FIELDS {
		let Some(value) = data.get_mut(*field) else {
			continue;
		};
		match value {
			Value::String(_) => {}
			Value::Number(number) => *value = Value::String(number.to_string()),
			Value::Null => errors.add(*field, NULL),
			_ => errors.add(*field, INVALID_STRING),
		}
	}
	errors.into_result()?;

	Ok(serde_json::from_value(Value::Object(data))?)
}

/// Required/blank rules for a string field.
///
/// The value is trimmed in place when `trim` is set. A missing value is only
/// an error for full (non-partial) writes.
pub fn clean_char_field(
	errors: &mut FieldErrors,
	field: &str,
	value: &mut Option<String>,
	partial: bool,
	trim: bool,
) {
	match value {
		None if !partial => errors.add(field, REQUIRED),
		None => {}
		Some(text) => {
			if trim {
				let trimmed = text.trim();
				if trimmed.len() != text.len() {
					*text = trimmed.to_string();
				}
			}
			if text.trim().is_empty() {
				errors.add(field, BLANK);
			}
		}
	}
}
