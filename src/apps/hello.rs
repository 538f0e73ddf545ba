//! Demo endpoints showing the two view styles: a plain handler dispatching
//! on the HTTP method and a viewset dispatching on actions.

pub mod serializers;
pub mod views;

pub use views::{HelloApiView, HelloViewSet};
