//! Installed apps.

pub mod hello;
pub mod profiles_api;
