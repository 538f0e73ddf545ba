//! HTTP plumbing shared by every app: request/response types, errors,
//! routing, viewsets, filters and the server.

pub mod error;
pub mod filters;
pub mod handler;
pub mod http;
pub mod logging;
pub mod router;
pub mod serializers;
pub mod server;
pub mod viewset;

pub use error::{
	BLANK, Error, FieldErrors, INVALID_STRING, NON_FIELD_ERRORS, NULL, REQUIRED, Result,
};
pub use filters::{SearchFilter, Searchable};
pub use handler::{Handler, Middleware, MiddlewareChain, RequestLoggingMiddleware, respond};
pub use http::{Request, RequestBuilder, Response, is_safe_method};
pub use router::{Route, Router};
pub use server::{HttpServer, ShutdownCoordinator};
pub use viewset::{ActionType, ViewConfig, ViewSet, ViewSetHandler, lookup_pk, register_viewset};
