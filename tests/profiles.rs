mod common;

use common::{PASSWORD, TestClient, client};
use hyper::StatusCode;
use rstest::rstest;
use serde_json::json;

#[rstest]
#[tokio::test]
async fn test_create_profile_hides_password(client: TestClient) {
	let response = client
		.post(
			"/profile/",
			json!({ "email": "Ada@Example.COM", "name": " Ada ", "password": PASSWORD }),
		)
		.await;

	assert_eq!(response.status, StatusCode::CREATED);
	assert_eq!(
		response.body,
		json!({ "id": 1, "email": "Ada@example.com", "name": "Ada" })
	);

	let stored = client.state.profiles.get(1).await.unwrap();
	assert_ne!(stored.password, PASSWORD);
	assert!(client.state.hasher.verify(PASSWORD, &stored.password).unwrap());
}

#[rstest]
#[tokio::test]
async fn test_create_profile_validation(client: TestClient) {
	let response = client
		.post("/profile/", json!({ "email": "nope", "name": "" }))
		.await;

	assert_eq!(response.status, StatusCode::BAD_REQUEST);
	assert_eq!(
		response.body,
		json!({
			"email": ["Enter a valid email address."],
			"name": ["This field may not be blank."],
			"password": ["This field is required."],
		})
	);
	assert_eq!(client.get("/profile/").await.body, json!([]));
}

#[rstest]
#[tokio::test]
async fn test_duplicate_email_is_rejected(client: TestClient) {
	client.register("ada@example.com", "Ada").await;

	let response = client
		.post(
			"/profile/",
			json!({ "email": "ada@EXAMPLE.com", "name": "Other", "password": PASSWORD }),
		)
		.await;

	assert_eq!(response.status, StatusCode::BAD_REQUEST);
	assert_eq!(
		response.body,
		json!({ "email": ["user profile with this email already exists."] })
	);
}

#[rstest]
#[tokio::test]
async fn test_list_and_retrieve_are_public(client: TestClient) {
	let ada = client.register("ada@example.com", "Ada").await;
	client.register("bob@example.com", "Bob").await;

	let list = client.get("/profile/").await;
	assert_eq!(list.status, StatusCode::OK);
	assert_eq!(list.body.as_array().unwrap().len(), 2);
	assert_eq!(list.body[0]["id"], ada);

	let detail = client.get(&format!("/profile/{ada}/")).await;
	assert_eq!(detail.status, StatusCode::OK);
	assert_eq!(detail.body["name"], "Ada");
	assert!(detail.body.get("password").is_none());
}

#[rstest]
#[case("/profile/99/")]
#[case("/profile/abc/")]
#[tokio::test]
async fn test_unknown_profile_is_404(client: TestClient, #[case] path: &str) {
	let response = client.get(path).await;

	assert_eq!(response.status, StatusCode::NOT_FOUND);
	assert_eq!(response.body, json!({ "detail": "Not found." }));
}

#[rstest]
#[case("ada", vec!["Ada Lovelace"])]
#[case("EXAMPLE.ORG", vec!["Ada Lovelace", "Grace Hopper"])]
#[case("hopper example", vec!["Grace Hopper"])]
#[case("grace,ada", vec![])]
#[case("", vec!["Ada Lovelace", "Bob", "Grace Hopper"])]
#[tokio::test]
async fn test_search_by_name_or_email(
	client: TestClient,
	#[case] search: &str,
	#[case] expected: Vec<&str>,
) {
	client.register("ada@example.org", "Ada Lovelace").await;
	client.register("bob@example.com", "Bob").await;
	client.register("grace@example.org", "Grace Hopper").await;

	let query = search.replace(' ', "%20");
	let response = client.get(&format!("/profile/?search={query}")).await;

	let names: Vec<_> = response
		.body
		.as_array()
		.unwrap()
		.iter()
		.map(|p| p["name"].as_str().unwrap())
		.collect();
	assert_eq!(names, expected);
}

#[rstest]
#[tokio::test]
async fn test_owner_can_update(mut client: TestClient) {
	// Test intent: the owner's full and partial updates are applied and the
	// new password takes effect for login.
	let (ada, token) = client.signup("ada@example.com", "Ada").await;
	client.with_token(&token);

	let put = client
		.put(
			&format!("/profile/{ada}/"),
			json!({ "email": "ada@example.com", "name": "Ada L", "password": "new secret" }),
		)
		.await;
	assert_eq!(put.status, StatusCode::OK);
	assert_eq!(put.body["name"], "Ada L");

	let patch = client
		.patch(&format!("/profile/{ada}/"), json!({ "name": "Countess" }))
		.await;
	assert_eq!(patch.status, StatusCode::OK);
	assert_eq!(
		patch.body,
		json!({ "id": ada, "email": "ada@example.com", "name": "Countess" })
	);

	let login = client
		.post(
			"/login/",
			json!({ "username": "ada@example.com", "password": "new secret" }),
		)
		.await;
	assert_eq!(login.status, StatusCode::OK);
	assert_eq!(login.body["token"], token.as_str());
}

#[rstest]
#[tokio::test]
async fn test_put_requires_every_field(mut client: TestClient) {
	let (ada, token) = client.signup("ada@example.com", "Ada").await;
	client.with_token(&token);

	let response = client
		.put(&format!("/profile/{ada}/"), json!({ "name": "Ada" }))
		.await;

	assert_eq!(response.status, StatusCode::BAD_REQUEST);
	assert!(response.body.get("email").is_some());
	assert!(response.body.get("password").is_some());
}

#[rstest]
#[tokio::test]
async fn test_other_profile_cannot_update_or_delete(mut client: TestClient) {
	// Test intent: B is rejected with 403 and A's record is untouched.
	let ada = client.register("ada@example.com", "Ada").await;
	let (_, bob_token) = client.signup("bob@example.com", "Bob").await;
	client.with_token(&bob_token);
	let path = format!("/profile/{ada}/");

	let put = client
		.put(
			&path,
			json!({ "email": "x@example.com", "name": "X", "password": "x" }),
		)
		.await;
	let patch = client.patch(&path, json!({ "name": "X" })).await;
	let delete = client.delete(&path).await;

	for response in [put, patch, delete] {
		assert_eq!(response.status, StatusCode::FORBIDDEN);
		assert_eq!(
			response.body,
			json!({ "detail": "You do not have permission to perform this action." })
		);
	}
	assert_eq!(client.get(&path).await.body["name"], "Ada");
}

#[rstest]
#[tokio::test]
async fn test_anonymous_write_is_401(client: TestClient) {
	let ada = client.register("ada@example.com", "Ada").await;

	let response = client
		.patch(&format!("/profile/{ada}/"), json!({ "name": "X" }))
		.await;

	assert_eq!(response.status, StatusCode::UNAUTHORIZED);
	assert_eq!(response.headers.get("www-authenticate").unwrap(), "Token");
	assert_eq!(
		response.body,
		json!({ "detail": "Authentication credentials were not provided." })
	);
}

#[rstest]
#[tokio::test]
async fn test_permission_checked_before_validation(mut client: TestClient) {
	let ada = client.register("ada@example.com", "Ada").await;
	let (_, bob_token) = client.signup("bob@example.com", "Bob").await;
	client.with_token(&bob_token);

	let response = client
		.patch(&format!("/profile/{ada}/"), json!({ "email": "invalid" }))
		.await;

	assert_eq!(response.status, StatusCode::FORBIDDEN);
}

#[rstest]
#[tokio::test]
async fn test_delete_cascades_to_feed_and_token(mut client: TestClient) {
	let (ada, ada_token) = client.signup("ada@example.com", "Ada").await;
	let (_, bob_token) = client.signup("bob@example.com", "Bob").await;

	client.with_token(&ada_token);
	client.post("/feed/", json!({ "status_text": "hello" })).await;
	client.with_token(&bob_token);
	client.post("/feed/", json!({ "status_text": "hi" })).await;

	client.with_token(&ada_token);
	let response = client.delete(&format!("/profile/{ada}/")).await;
	assert_eq!(response.status, StatusCode::NO_CONTENT);
	assert_eq!(response.body, serde_json::Value::Null);

	// Ada's token is gone with her profile.
	assert_eq!(client.get("/feed/").await.status, StatusCode::UNAUTHORIZED);

	client.with_token(&bob_token);
	let feed = client.get("/feed/").await;
	assert_eq!(feed.body.as_array().unwrap().len(), 1);
	assert_eq!(feed.body[0]["status_text"], "hi");
	assert_eq!(
		client.get(&format!("/profile/{ada}/")).await.status,
		StatusCode::NOT_FOUND
	);
}

#[rstest]
#[tokio::test]
async fn test_staff_can_delete_but_not_edit(mut client: TestClient) {
	let ada = client.register("ada@example.com", "Ada").await;
	let (_, staff_token) = client.staff("admin@example.com").await;
	client.with_token(&staff_token);
	let path = format!("/profile/{ada}/");

	let patch = client.patch(&path, json!({ "name": "X" })).await;
	assert_eq!(patch.status, StatusCode::FORBIDDEN);

	let delete = client.delete(&path).await;
	assert_eq!(delete.status, StatusCode::NO_CONTENT);
}

#[rstest]
#[tokio::test]
async fn test_collection_rejects_detail_methods(client: TestClient) {
	let response = client.delete("/profile/").await;

	assert_eq!(response.status, StatusCode::METHOD_NOT_ALLOWED);
	assert_eq!(response.headers.get("allow").unwrap(), "GET, POST");
}
