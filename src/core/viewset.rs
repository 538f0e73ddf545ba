//! ViewSets: one handler per resource, dispatching on the HTTP method and on
//! whether the URL addresses a collection or a single record.
//!
//! Every request goes through the same explicit steps:
//! authenticate → check permissions → resolve action → (load record → check
//! object permissions) → validate → execute → serialize. The first two steps
//! are driven by the view's [`ViewConfig`]; the rest belong to the viewset.

use std::sync::Arc;

use async_trait::async_trait;
use hyper::Method;

use super::error::{Error, Result};
use super::handler::Handler;
use super::http::{Request, Response};
use super::router::Router;
use crate::auth::{Authentication, OwnedObject, Permission, PermissionContext};

/// Action type for ViewSet operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionType {
	List,
	Retrieve,
	Create,
	Update,
	PartialUpdate,
	Destroy,
}

impl ActionType {
	pub const ALL: [ActionType; 6] = [
		ActionType::List,
		ActionType::Create,
		ActionType::Retrieve,
		ActionType::Update,
		ActionType::PartialUpdate,
		ActionType::Destroy,
	];

	/// Maps a method to an action for a collection (`detail == false`) or a
	/// single record (`detail == true`) URL.
	///
	/// # Examples
	///
	/// ```
	/// use hyper::Method;
	/// use profiles_rest_api::core::ActionType;
	///
	/// assert_eq!(ActionType::resolve(&Method::POST, false), Some(ActionType::Create));
	/// assert_eq!(ActionType::resolve(&Method::PATCH, true), Some(ActionType::PartialUpdate));
	/// assert_eq!(ActionType::resolve(&Method::DELETE, false), None);
	/// ```
	pub fn resolve(method: &Method, detail: bool) -> Option<Self> {
		match (method.clone(), detail) {
			(Method::GET, false) => Some(ActionType::List),
			(Method::POST, false) => Some(ActionType::Create),
			(Method::GET, true) => Some(ActionType::Retrieve),
			(Method::PUT, true) => Some(ActionType::Update),
			(Method::PATCH, true) => Some(ActionType::PartialUpdate),
			(Method::DELETE, true) => Some(ActionType::Destroy),
			_ => None,
		}
	}

	pub fn method(&self) -> Method {
		match self {
			ActionType::List | ActionType::Retrieve => Method::GET,
			ActionType::Create => Method::POST,
			ActionType::Update => Method::PUT,
			ActionType::PartialUpdate => Method::PATCH,
			ActionType::Destroy => Method::DELETE,
		}
	}

	/// Whether the action addresses a single record.
	pub fn is_detail(&self) -> bool {
		!matches!(self, ActionType::List | ActionType::Create)
	}
}

/// Ordered authenticators and permission classes of a view.
#[derive(Clone, Default)]
pub struct ViewConfig {
	pub authenticators: Vec<Arc<dyn Authentication>>,
	pub permissions: Vec<Arc<dyn Permission>>,
}

impl ViewConfig {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn with_authenticator(mut self, authenticator: Arc<dyn Authentication>) -> Self {
		self.authenticators.push(authenticator);
		self
	}

	pub fn with_permission(mut self, permission: Arc<dyn Permission>) -> Self {
		self.permissions.push(permission);
		self
	}

	/// Runs the authenticators in order; the first to identify a user wins.
	///
	/// The resulting [`crate::auth::AuthState`] is stored in the request
	/// extensions, anonymous when nobody matched.
	pub async fn perform_authentication(&self, request: &mut Request) -> Result<()> {
		let mut state = crate::auth::AuthState::anonymous();
		for authenticator in &self.authenticators {
			if let Some(found) = authenticator.authenticate(request).await? {
				state = found;
				break;
			}
		}
		request.extensions.insert(state);
		Ok(())
	}

	/// Request-level permission pass, before any record is loaded.
	pub async fn check_permissions(&self, request: &Request) -> Result<()> {
		let auth = request.auth();
		let context = PermissionContext::new(request, &auth);
		for permission in &self.permissions {
			if !permission.has_permission(&context).await {
				return Err(self.permission_denied(request));
			}
		}
		Ok(())
	}

	/// Object-level permission pass for a loaded record.
	pub async fn check_object_permissions(
		&self,
		request: &Request,
		object: &dyn OwnedObject,
	) -> Result<()> {
		let auth = request.auth();
		let context = PermissionContext::new(request, &auth);
		for permission in &self.permissions {
			if !permission.has_object_permission(&context, object).await {
				return Err(self.permission_denied(request));
			}
		}
		Ok(())
	}

	/// Anonymous callers on an authenticating view get 401, everyone else 403.
	fn permission_denied(&self, request: &Request) -> Error {
		if !self.authenticators.is_empty() && !request.auth().is_authenticated() {
			Error::NotAuthenticated
		} else {
			Error::PermissionDenied
		}
	}
}

/// A resource exposing some or all of the six standard actions.
#[async_trait]
pub trait ViewSet: Send + Sync {
	/// Base name used for route names, e.g. `feed` → `feed-list`.
	fn basename(&self) -> &str;

	fn config(&self) -> &ViewConfig;

	/// Supported actions; anything else is answered with 405.
	fn actions(&self) -> &[ActionType] {
		&ActionType::ALL
	}

	async fn dispatch(&self, request: Request, action: ActionType) -> Result<Response>;
}

/// Adapts a [`ViewSet`] to a [`Handler`] for either its list or detail URL.
pub struct ViewSetHandler<V: ?Sized> {
	viewset: Arc<V>,
	detail: bool,
}

impl<V: ViewSet + ?Sized> ViewSetHandler<V> {
	pub fn new(viewset: Arc<V>, detail: bool) -> Self {
		Self { viewset, detail }
	}

	fn allowed_methods(&self) -> Vec<Method> {
		self.viewset
			.actions()
			.iter()
			.filter(|action| action.is_detail() == self.detail)
			.map(ActionType::method)
			.collect()
	}
}

#[async_trait]
impl<V: ViewSet + ?Sized + 'static> Handler for ViewSetHandler<V> {
	async fn handle(&self, mut request: Request) -> Result<Response> {
		let config = self.viewset.config();
		config.perform_authentication(&mut request).await?;
		config.check_permissions(&request).await?;

		let action = ActionType::resolve(&request.method, self.detail)
			.filter(|action| self.viewset.actions().contains(action))
			.ok_or_else(|| Error::MethodNotAllowed {
				method: request.method.clone(),
				allowed: self.allowed_methods(),
			})?;

		tracing::debug!(
			viewset = self.viewset.basename(),
			action = ?action,
			"dispatching viewset action"
		);
		self.viewset.dispatch(request, action).await
	}
}

/// Registers `{prefix}/` and `{prefix}/{pk}/` for a viewset.
pub fn register_viewset<V: ViewSet + 'static>(router: Router, prefix: &str, viewset: V) -> Router {
	let viewset = Arc::new(viewset);
	let basename = viewset.basename().to_string();
	router
		.route(
			&format!("/{prefix}/"),
			&format!("{basename}-list"),
			Arc::new(ViewSetHandler::new(viewset.clone(), false)),
		)
		.route(
			&format!("/{prefix}/{{pk}}/"),
			&format!("{basename}-detail"),
			Arc::new(ViewSetHandler::new(viewset, true)),
		)
}

/// Parses the `pk` path parameter; malformed ids cannot exist, so they are
/// reported as not found.
pub fn lookup_pk(request: &Request) -> Result<i64> {
	request
		.path_param("pk")
		.and_then(|pk| pk.parse().ok())
		.ok_or(Error::NotFound)
}
