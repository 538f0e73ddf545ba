//! Authentication and authorization.
//!
//! - [`authentication`]: token authentication and the per-request [`AuthState`]
//! - [`permissions`]: permission classes and the ownership predicate
//! - [`backend`]: username/password checks against a [`UserRepository`]
//! - [`token`]: bearer token storage
//! - [`hasher`]: password hashing

pub mod authentication;
pub mod backend;
pub mod hasher;
pub mod permissions;
pub mod token;

pub use authentication::{AuthState, Authentication, TokenAuthentication};
pub use backend::{AuthUser, ModelBackend, UserRepository};
pub use hasher::{Argon2Hasher, PasswordHasher};
pub use permissions::{
	IsAuthenticated, OwnedObject, Permission, PermissionContext, is_owner_or_safe,
};
pub use token::{InMemoryTokenStorage, StoredToken, TokenStorage};
