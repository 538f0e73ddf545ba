//! Path-based routing with `{name}` parameters.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;

use super::error::{Error, Result};
use super::handler::Handler;
use super::http::{Request, Response};

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
	Literal(String),
	Param(String),
}

/// A single URL pattern bound to a handler.
pub struct Route {
	pattern: String,
	name: String,
	segments: Vec<Segment>,
	handler: Arc<dyn Handler>,
}

impl Route {
	pub fn new(pattern: impl Into<String>, name: impl Into<String>, handler: Arc<dyn Handler>) -> Self {
		let pattern = pattern.into();
		let segments = split_path(&pattern)
			.map(|segment| {
				match segment
					.strip_prefix('{')
					.and_then(|rest| rest.strip_suffix('}'))
				{
					Some(param) => Segment::Param(param.to_string()),
					None => Segment::Literal(segment.to_string()),
				}
			})
			.collect();

		Self {
			pattern,
			name: name.into(),
			segments,
			handler,
		}
	}

	pub fn pattern(&self) -> &str {
		&self.pattern
	}

	pub fn name(&self) -> &str {
		&self.name
	}

	/// Matches `path`, returning the captured parameters.
	fn matches(&self, path: &str) -> Option<HashMap<String, String>> {
		let mut params = HashMap::new();
		let mut parts = split_path(path);

		for segment in &self.segments {
			let part = parts.next()?;
			match segment {
				Segment::Literal(literal) if literal == part => {}
				Segment::Literal(_) => return None,
				Segment::Param(name) => {
					params.insert(name.clone(), part.to_string());
				}
			}
		}

		if parts.next().is_some() {
			return None;
		}
		Some(params)
	}
}

/// Empty segments are dropped, so `/feed/1/` and `/feed/1` are equivalent.
fn split_path(path: &str) -> impl Iterator<Item = &str> {
	path.split('/').filter(|segment| !segment.is_empty())
}

/// Ordered collection of routes; the first match wins.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use profiles_rest_api::core::{Handler, Request, Response, Result, Router};
///
/// struct Ping;
///
/// #[async_trait::async_trait]
/// impl Handler for Ping {
///     async fn handle(&self, _request: Request) -> Result<Response> {
///         Ok(Response::ok())
///     }
/// }
///
/// let router = Router::new().route("/ping/", "ping", Arc::new(Ping));
/// assert_eq!(router.routes().len(), 1);
/// ```
#[derive(Default)]
pub struct Router {
	routes: Vec<Route>,
}

impl Router {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn route(mut self, pattern: &str, name: &str, handler: Arc<dyn Handler>) -> Self {
		self.routes.push(Route::new(pattern, name, handler));
		self
	}

	pub fn routes(&self) -> &[Route] {
		&self.routes
	}

	fn resolve(&self, path: &str) -> Option<(&Route, HashMap<String, String>)> {
		self.routes
			.iter()
			.find_map(|route| route.matches(path).map(|params| (route, params)))
	}
}

#[async_trait]
impl Handler for Router {
	async fn handle(&self, mut request: Request) -> Result<Response> {
		let (route, params) = self.resolve(request.path()).ok_or(Error::NotFound)?;
		tracing::debug!(route = route.name(), path = request.path(), "route matched");
		request.path_params = params;
		route.handler.handle(request).await
	}
}
