//! URL configuration.

use std::sync::Arc;

use crate::AppState;
use crate::apps::hello::{HelloApiView, HelloViewSet};
use crate::apps::profiles_api::{FeedViewSet, ObtainAuthToken, ProfileViewSet};
use crate::core::{Router, register_viewset};

pub fn url_patterns(state: &AppState) -> Router {
	let router = Router::new()
		.route("/hello-view/", "hello-view", Arc::new(HelloApiView))
		.route("/login/", "login", Arc::new(ObtainAuthToken::new(state)));

	let router = register_viewset(router, "hello-viewset", HelloViewSet::new());
	let router = register_viewset(router, "profile", ProfileViewSet::new(state));
	register_viewset(router, "feed", FeedViewSet::new(state))
}
