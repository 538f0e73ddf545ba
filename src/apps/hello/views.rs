use async_trait::async_trait;
use hyper::Method;
use serde_json::json;

use super::serializers::HelloSerializer;
use crate::core::serializers::parse;
use crate::core::{ActionType, Error, Handler, Request, Response, Result, ViewConfig, ViewSet};

const AN_APIVIEW: [&str; 4] = [
	"Uses HTTP methods as functions(get, post, patch, put, delete)",
	"Is similar to a traditional Django View",
	"Gives you the most control over you application logic",
	"Is mapped mannually to URLs",
];

const AN_VIEWSET: [&str; 4] = [
	"Uses actions(list, create, retrieve, update, partial_update, destroy)",
	"Automatically maps to URLs using Routers",
	"Provides more functionality with less code",
	"Is mapped mannually to URLs",
];

fn hello_message(request: &Request) -> Result<Response> {
	let name = parse::<HelloSerializer>(request.data()?)?.clean()?;
	Response::ok().with_json(&json!({ "message": format!("Hello {name}") }))
}

/// Hello endpoint dispatching directly on the HTTP method.
pub struct HelloApiView;

impl HelloApiView {
	const ALLOWED: [Method; 5] = [
		Method::GET,
		Method::POST,
		Method::PUT,
		Method::PATCH,
		Method::DELETE,
	];
}

#[async_trait]
impl Handler for HelloApiView {
	async fn handle(&self, request: Request) -> Result<Response> {
		match request.method {
			Method::GET => Response::ok().with_json(&json!({
				"message": "Hello",
				"an_apiview": AN_APIVIEW,
			})),
			Method::POST => hello_message(&request),
			Method::PUT | Method::PATCH | Method::DELETE => {
				Response::ok().with_json(&json!({ "method": request.method.as_str() }))
			}
			_ => Err(Error::MethodNotAllowed {
				method: request.method.clone(),
				allowed: Self::ALLOWED.to_vec(),
			}),
		}
	}
}

/// Hello endpoint dispatching on viewset actions.
#[derive(Default)]
pub struct HelloViewSet {
	config: ViewConfig,
}

impl HelloViewSet {
	pub fn new() -> Self {
		Self::default()
	}
}

#[async_trait]
impl ViewSet for HelloViewSet {
	fn basename(&self) -> &str {
		"hello-viewset"
	}

	fn config(&self) -> &ViewConfig {
		&self.config
	}

	async fn dispatch(&self, request: Request, action: ActionType) -> Result<Response> {
		match action {
			ActionType::List => Response::ok().with_json(&json!({
				"message": "Hello",
				"an_iviewset": AN_VIEWSET,
			})),
			ActionType::Create => hello_message(&request),
			detail => Response::ok().with_json(&json!({ "http_method": detail.method().as_str() })),
		}
	}
}
