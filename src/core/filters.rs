//! Free-text search over named string fields.

use super::http::Request;

/// Records that can be searched by the [`SearchFilter`].
///
/// # Examples
///
/// ```
/// use profiles_rest_api::core::Searchable;
///
/// struct Post {
///     title: String,
/// }
///
/// impl Searchable for Post {
///     fn searchable_fields() -> &'static [&'static str] {
///         &["title"]
///     }
///
///     fn field_value(&self, field: &str) -> Option<&str> {
///         (field == "title").then_some(self.title.as_str())
///     }
/// }
/// ```
pub trait Searchable {
	/// Names of the fields a search term may match.
	fn searchable_fields() -> &'static [&'static str];

	fn field_value(&self, field: &str) -> Option<&str>;
}

/// Reads search terms from a query parameter and matches records.
///
/// Terms are separated by whitespace or commas. A record matches when every
/// term is a case-insensitive substring of at least one searchable field.
#[derive(Debug, Clone)]
pub struct SearchFilter {
	param: String,
}

impl Default for SearchFilter {
	fn default() -> Self {
		Self::new("search")
	}
}

impl SearchFilter {
	pub fn new(param: impl Into<String>) -> Self {
		Self {
			param: param.into(),
		}
	}

	/// Lower-cased search terms of the request; empty when none were given.
	pub fn terms(&self, request: &Request) -> Vec<String> {
		request
			.query_param(&self.param)
			.map(|raw| split_terms(&raw))
			.unwrap_or_default()
	}

	pub fn matches<T: Searchable>(record: &T, terms: &[String]) -> bool {
		terms.iter().all(|term| {
			T::searchable_fields().iter().any(|field| {
				record
					.field_value(field)
					.is_some_and(|value| value.to_lowercase().contains(term.as_str()))
			})
		})
	}
}

fn split_terms(raw: &str) -> Vec<String> {
	raw.split(|c: char| c.is_whitespace() || c == ',')
		.filter(|term| !term.is_empty())
		.map(str::to_lowercase)
		.collect()
}
