//! Project configuration: settings and URL routing.

pub mod settings;
pub mod urls;
