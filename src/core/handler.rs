//! Handler and middleware traits for HTTP request processing.
//!
//! ```rust
//! use profiles_rest_api::core::{Handler, Request, Response, Result};
//! use async_trait::async_trait;
//!
//! struct Ping;
//!
//! #[async_trait]
//! impl Handler for Ping {
//!     async fn handle(&self, _request: Request) -> Result<Response> {
//!         Ok(Response::ok())
//!     }
//! }
//! ```

use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;

use super::error::Result;
use super::http::{Request, Response};

/// Handler trait for processing requests.
///
/// All views, the router and the middleware chain implement it.
#[async_trait]
pub trait Handler: Send + Sync {
	async fn handle(&self, request: Request) -> Result<Response>;
}

#[async_trait]
impl<T: Handler + ?Sized> Handler for Arc<T> {
	async fn handle(&self, request: Request) -> Result<Response> {
		(**self).handle(request).await
	}
}

/// Middleware wraps a handler to add cross-cutting behaviour.
#[async_trait]
pub trait Middleware: Send + Sync {
	async fn process(&self, request: Request, next: Arc<dyn Handler>) -> Result<Response>;

	/// Skip this middleware for the request when `false`.
	fn should_continue(&self, _request: &Request) -> bool {
		true
	}
}

/// Composes middleware around a handler.
///
/// Middleware run in the order they were added; the first added sees the
/// request first and the response last.
pub struct MiddlewareChain {
	middlewares: Vec<Arc<dyn Middleware>>,
	handler: Arc<dyn Handler>,
}

impl MiddlewareChain {
	pub fn new(handler: Arc<dyn Handler>) -> Self {
		Self {
			middlewares: Vec::new(),
			handler,
		}
	}

	pub fn with_middleware(mut self, middleware: Arc<dyn Middleware>) -> Self {
		self.middlewares.push(middleware);
		self
	}
}

struct Next {
	middleware: Arc<dyn Middleware>,
	next: Arc<dyn Handler>,
}

#[async_trait]
impl Handler for Next {
	async fn handle(&self, request: Request) -> Result<Response> {
		if self.middleware.should_continue(&request) {
			self.middleware.process(request, self.next.clone()).await
		} else {
			self.next.handle(request).await
		}
	}
}

#[async_trait]
impl Handler for MiddlewareChain {
	async fn handle(&self, request: Request) -> Result<Response> {
		let mut next = self.handler.clone();
		for middleware in self.middlewares.iter().rev() {
			next = Arc::new(Next {
				middleware: middleware.clone(),
				next,
			});
		}
		next.handle(request).await
	}
}

/// Runs the handler and renders any error, so the caller always gets a
/// response to send back.
pub async fn respond(handler: &dyn Handler, request: Request) -> Response {
	match handler.handle(request).await {
		Ok(response) => response,
		Err(err) => err.into_response(),
	}
}

/// Emits one `tracing` event per request.
pub struct RequestLoggingMiddleware;

#[async_trait]
impl Middleware for RequestLoggingMiddleware {
	async fn process(&self, request: Request, next: Arc<dyn Handler>) -> Result<Response> {
		let method = request.method.clone();
		let path = request.path().to_string();
		let started = Instant::now();

		let result = next.handle(request).await;

		let elapsed_ms = started.elapsed().as_secs_f64() * 1000.0;
		match &result {
			Ok(response) => tracing::info!(
				%method,
				%path,
				status = response.status.as_u16(),
				elapsed_ms,
				"request completed"
			),
			Err(err) => tracing::info!(
				%method,
				%path,
				status = err.status().as_u16(),
				error = %err,
				elapsed_ms,
				"request failed"
			),
		}

		result
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::core::Error;
	use hyper::StatusCode;
	use hyper::header::{HeaderName, HeaderValue};
	use rstest::rstest;

	struct Echo;

	#[async_trait]
	impl Handler for Echo {
		async fn handle(&self, request: Request) -> Result<Response> {
			let trail = request.header("x-trail").unwrap_or_default().to_string();
			Ok(Response::ok().with_header(
				HeaderName::from_static("x-trail"),
				HeaderValue::from_str(&trail).unwrap(),
			))
		}
	}

	struct Tag(&'static str);

	#[async_trait]
	impl Middleware for Tag {
		async fn process(&self, mut request: Request, next: Arc<dyn Handler>) -> Result<Response> {
			let trail = format!("{}{}", request.header("x-trail").unwrap_or_default(), self.0);
			request
				.headers
				.insert("x-trail", HeaderValue::from_str(&trail).unwrap());
			next.handle(request).await
		}
	}

	struct Skipped;

	#[async_trait]
	impl Middleware for Skipped {
		async fn process(&self, _request: Request, _next: Arc<dyn Handler>) -> Result<Response> {
			Err(Error::Internal("must not run".into()))
		}

		fn should_continue(&self, _request: &Request) -> bool {
			false
		}
	}

	#[rstest]
	#[tokio::test]
	async fn test_middleware_runs_in_insertion_order() {
		let chain = MiddlewareChain::new(Arc::new(Echo))
			.with_middleware(Arc::new(Tag("a")))
			.with_middleware(Arc::new(Skipped))
			.with_middleware(Arc::new(Tag("b")));

		let request = Request::builder().uri("/").build().unwrap();
		let response = chain.handle(request).await.unwrap();

		assert_eq!(response.headers.get("x-trail").unwrap(), "ab");
	}

	#[rstest]
	#[tokio::test]
	async fn test_respond_renders_errors() {
		struct Missing;

		#[async_trait]
		impl Handler for Missing {
			async fn handle(&self, _request: Request) -> Result<Response> {
				Err(Error::NotFound)
			}
		}

		let request = Request::builder().uri("/").build().unwrap();
		let response = respond(&Missing, request).await;

		assert_eq!(response.status, StatusCode::NOT_FOUND);
	}
}
