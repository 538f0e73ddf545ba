//! HTTP/1.1 server on top of hyper.

use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use http_body_util::{BodyExt, Full};
use hyper::body::Incoming;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper_util::rt::TokioIo;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::broadcast;
use tokio::task::JoinSet;

use super::error::Error;
use super::handler::{Handler, respond};
use super::http::Request;

/// Broadcasts the shutdown signal to the accept loop and open connections.
#[derive(Clone)]
pub struct ShutdownCoordinator {
	sender: broadcast::Sender<()>,
	timeout: Duration,
}

impl ShutdownCoordinator {
	/// `timeout` bounds how long in-flight connections may keep running
	/// after shutdown was requested.
	pub fn new(timeout: Duration) -> Self {
		let (sender, _) = broadcast::channel(1);
		Self { sender, timeout }
	}

	pub fn subscribe(&self) -> broadcast::Receiver<()> {
		self.sender.subscribe()
	}

	pub fn shutdown(&self) {
		let _ = self.sender.send(());
	}

	pub fn timeout(&self) -> Duration {
		self.timeout
	}
}

/// HTTP server serving a single root handler.
pub struct HttpServer {
	handler: Arc<dyn Handler>,
}

impl HttpServer {
	pub fn new(handler: Arc<dyn Handler>) -> Self {
		Self { handler }
	}

	/// Accepts connections on `listener` until `coordinator` signals
	/// shutdown, then waits for open connections up to the coordinator's
	/// timeout.
	pub async fn serve(
		self,
		listener: TcpListener,
		coordinator: ShutdownCoordinator,
	) -> std::io::Result<()> {
		if let Ok(addr) = listener.local_addr() {
			tracing::info!(%addr, "server listening");
		}

		let mut shutdown_rx = coordinator.subscribe();
		let mut connections = JoinSet::new();

		loop {
			tokio::select! {
				accepted = listener.accept() => {
					let (stream, peer) = match accepted {
						Ok(pair) => pair,
						Err(err) => {
							accept_failed(err).await;
							continue;
						}
					};
					let handler = self.handler.clone();
					let conn_shutdown = coordinator.subscribe();
					connections.spawn(Self::handle_connection(stream, peer, handler, conn_shutdown));
				}
				Some(_) = connections.join_next(), if !connections.is_empty() => {}
				_ = shutdown_rx.recv() => {
					tracing::info!(open_connections = connections.len(), "shutting down");
					break;
				}
			}
		}

		drop(listener);
		let drained = tokio::time::timeout(coordinator.timeout(), async {
			while connections.join_next().await.is_some() {}
		})
		.await;
		if drained.is_err() {
			tracing::warn!(
				aborted = connections.len(),
				"shutdown timeout elapsed, aborting open connections"
			);
			connections.abort_all();
		}

		Ok(())
	}

	async fn handle_connection(
		stream: TcpStream,
		peer: SocketAddr,
		handler: Arc<dyn Handler>,
		mut shutdown: broadcast::Receiver<()>,
	) {
		let service = service_fn(move |req: hyper::Request<Incoming>| {
			let handler = handler.clone();
			async move {
				Ok::<_, Infallible>(Self::serve_request(handler.as_ref(), req).await)
			}
		});

		let conn = http1::Builder::new().serve_connection(TokioIo::new(stream), service);
		tokio::pin!(conn);

		let result = tokio::select! {
			result = conn.as_mut() => result,
			_ = shutdown.recv() => {
				conn.as_mut().graceful_shutdown();
				conn.await
			}
		};

		if let Err(err) = result {
			tracing::debug!(%peer, error = %err, "connection closed with error");
		}
	}

	async fn serve_request(
		handler: &dyn Handler,
		req: hyper::Request<Incoming>,
	) -> hyper::Response<Full<Bytes>> {
		let (parts, body) = req.into_parts();
		let body = match body.collect().await {
			Ok(collected) => collected.to_bytes(),
			Err(err) => {
				return Error::ParseError(err.to_string())
					.into_response()
					.into_hyper();
			}
		};

		let request = Request {
			method: parts.method,
			uri: parts.uri,
			version: parts.version,
			headers: parts.headers,
			body,
			path_params: Default::default(),
			extensions: parts.extensions,
		};

		respond(handler, request).await.into_hyper()
	}
}

/// Pause after a failed accept. Errors such as `EMFILE` keep repeating
/// until some connection closes.
const ACCEPT_BACKOFF: Duration = Duration::from_millis(100);

async fn accept_failed(err: std::io::Error) {
	tracing::warn!(error = %err, "failed to accept connection");
	tokio::time::sleep(ACCEPT_BACKOFF).await;
}
