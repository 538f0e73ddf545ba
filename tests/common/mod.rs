//! In-process client driving the full application handler.

#![allow(dead_code)]

use std::sync::Arc;

use hyper::{HeaderMap, Method, StatusCode};
use profiles_rest_api::apps::profiles_api::store::NewProfile;
use profiles_rest_api::core::{Handler, Request, respond};
use profiles_rest_api::{AppState, build_app};
use rstest::fixture;
use serde_json::{Value, json};

pub const PASSWORD: &str = "correct horse";

pub struct TestResponse {
	pub status: StatusCode,
	pub headers: HeaderMap,
	pub body: Value,
}

pub struct TestClient {
	pub state: AppState,
	app: Arc<dyn Handler>,
	token: Option<String>,
}

#[fixture]
pub fn client() -> TestClient {
	TestClient::new()
}

impl TestClient {
	pub fn new() -> Self {
		let state = AppState::new();
		Self {
			app: build_app(state.clone()),
			state,
			token: None,
		}
	}

	/// Sends `Authorization: Token <key>` on following requests.
	pub fn with_token(&mut self, token: &str) -> &mut Self {
		self.token = Some(token.to_string());
		self
	}

	pub fn anonymous(&mut self) -> &mut Self {
		self.token = None;
		self
	}

	pub async fn request(&self, method: Method, path: &str, body: Option<Value>) -> TestResponse {
		let mut builder = Request::builder().method(method).uri(path);
		if let Some(token) = &self.token {
			builder = builder.header("authorization", &format!("Token {token}"));
		}
		if let Some(body) = body {
			builder = builder.json(&body);
		}

		let response = respond(self.app.as_ref(), builder.build().unwrap()).await;
		let body = if response.body.is_empty() {
			Value::Null
		} else {
			serde_json::from_slice(&response.body).unwrap()
		};

		TestResponse {
			status: response.status,
			headers: response.headers,
			body,
		}
	}

	pub async fn get(&self, path: &str) -> TestResponse {
		self.request(Method::GET, path, None).await
	}

	pub async fn post(&self, path: &str, body: Value) -> TestResponse {
		self.request(Method::POST, path, Some(body)).await
	}

	pub async fn put(&self, path: &str, body: Value) -> TestResponse {
		self.request(Method::PUT, path, Some(body)).await
	}

	pub async fn patch(&self, path: &str, body: Value) -> TestResponse {
		self.request(Method::PATCH, path, Some(body)).await
	}

	pub async fn delete(&self, path: &str) -> TestResponse {
		self.request(Method::DELETE, path, None).await
	}

	/// Registers a profile through the API and returns its id.
	pub async fn register(&self, email: &str, name: &str) -> i64 {
		let response = self
			.post(
				"/profile/",
				json!({ "email": email, "name": name, "password": PASSWORD }),
			)
			.await;
		assert_eq!(response.status, StatusCode::CREATED, "{}", response.body);
		response.body["id"].as_i64().unwrap()
	}

	/// Logs in through the API and returns the token key.
	pub async fn login(&self, email: &str) -> String {
		let response = self
			.post("/login/", json!({ "username": email, "password": PASSWORD }))
			.await;
		assert_eq!(response.status, StatusCode::OK, "{}", response.body);
		response.body["token"].as_str().unwrap().to_string()
	}

	/// Registers and logs in, returning `(id, token)`.
	pub async fn signup(&self, email: &str, name: &str) -> (i64, String) {
		let id = self.register(email, name).await;
		(id, self.login(email).await)
	}

	/// Creates a staff profile directly in the store and logs it in.
	pub async fn staff(&self, email: &str) -> (i64, String) {
		let profile = self
			.state
			.profiles
			.create(NewProfile {
				email: email.to_string(),
				name: "Staff".to_string(),
				password_hash: self.state.hasher.hash(PASSWORD).unwrap(),
				is_staff: true,
			})
			.await
			.unwrap();
		(profile.id, self.login(email).await)
	}
}
