//! Profiles app: user profiles, their status feed and token login.

pub mod models;
pub mod permissions;
pub mod serializers;
pub mod store;
pub mod views;

pub use views::{FeedViewSet, ObtainAuthToken, ProfileViewSet};
