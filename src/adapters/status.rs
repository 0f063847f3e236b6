//! Status endpoint: read-only HTTP view of the monitor.
//!
//! | Path       | Body                          | Types               |
//! |------------|-------------------------------|---------------------|
//! | `/latest`  | most recent stored record     | json, csv, string   |
//! | `/belief`  | smoothed belief               | json, csv, string   |
//!
//! The type is picked with `?type=`; JSON when absent.
//!
//! Served by `axum` on a current-thread `tokio` runtime owned by its own
//! thread, so the sampling loop never waits on a client.  [`StatusServer::stop`]
//! shuts down gracefully; connections still open after [`DRAIN_LIMIT`] are
//! dropped.

use core::time::Duration;
use std::future::IntoFuture;
use std::io;
use std::net::{SocketAddr, TcpListener};
use std::sync::Arc;
use std::thread::JoinHandle;

use axum::Router;
use axum::extract::{Query, State};
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use log::{debug, info, warn};
use serde::Deserialize;
use tokio::sync::watch;

use crate::app::monitor::Monitor;
use crate::drivers::task::spawn_named;
use crate::measurement::Measurement;

const SERVER_STACK_KB: usize = 512;

/// Grace period for in-flight connections once a stop is requested.
pub const DRAIN_LIMIT: Duration = Duration::from_secs(1);

// ── Rendering ────────────────────────────────────────────────

/// Which monitor value a route serves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    Latest,
    Belief,
}

/// Query string of both routes.
#[derive(Debug, Default, Deserialize)]
pub struct FormatQuery {
    #[serde(rename = "type")]
    pub kind: Option<String>,
}

/// A rendered reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub status: StatusCode,
    pub content_type: &'static str,
    pub body: String,
}

impl Reply {
    fn ok(content_type: &'static str, body: String) -> Self {
        Self {
            status: StatusCode::OK,
            content_type,
            body,
        }
    }

    fn error(status: StatusCode, message: &str) -> Self {
        Self {
            status,
            content_type: "text/plain; charset=utf-8",
            body: format!("{message}\n"),
        }
    }
}

impl IntoResponse for Reply {
    fn into_response(self) -> Response {
        (self.status, [(header::CONTENT_TYPE, self.content_type)], self.body).into_response()
    }
}

#[derive(Clone, Copy)]
enum Format {
    Json,
    Csv,
    Text,
}

fn requested_format(kind: Option<&str>) -> Result<Format, Reply> {
    match kind.unwrap_or("") {
        "" | "json" => Ok(Format::Json),
        "csv" => Ok(Format::Csv),
        "string" => Ok(Format::Text),
        _ => Err(Reply::error(StatusCode::BAD_REQUEST, "type unknown")),
    }
}

fn render_one(m: &Measurement, format: Format) -> Reply {
    match format {
        Format::Json => Reply::ok("application/json", m.to_json()),
        Format::Csv => Reply::ok("text/csv", m.to_csv()),
        Format::Text => Reply::ok("text/plain; charset=utf-8", format!("{m}\n")),
    }
}

/// Render `view` in the `?type=` format `kind`.
pub fn respond(monitor: &Monitor, view: View, kind: Option<&str>) -> Reply {
    let reply = match requested_format(kind) {
        Err(reply) => reply,
        Ok(format) => {
            let value = match view {
                View::Latest => monitor.latest(),
                View::Belief => monitor.belief(),
            };
            value.map_or_else(
                || Reply::error(StatusCode::INTERNAL_SERVER_ERROR, "no measurement data"),
                |m| render_one(&m, format),
            )
        }
    };
    debug!("Status: {:?} type={:?} -> {}", view, kind, reply.status);
    reply
}

// ── Routes ───────────────────────────────────────────────────

async fn latest(State(monitor): State<Arc<Monitor>>, Query(q): Query<FormatQuery>) -> Reply {
    respond(&monitor, View::Latest, q.kind.as_deref())
}

async fn belief(State(monitor): State<Arc<Monitor>>, Query(q): Query<FormatQuery>) -> Reply {
    respond(&monitor, View::Belief, q.kind.as_deref())
}

async fn not_found() -> Reply {
    Reply::error(StatusCode::NOT_FOUND, "not found")
}

/// `/latest` and `/belief`; anything else is 404, non-GET methods 405.
pub fn router(monitor: Arc<Monitor>) -> Router {
    Router::new()
        .route("/latest", get(latest))
        .route("/belief", get(belief))
        .fallback(not_found)
        .with_state(monitor)
}

// ── Server ───────────────────────────────────────────────────

async fn serve(listener: TcpListener, app: Router, mut stopped: watch::Receiver<bool>) -> io::Result<()> {
    let listener = tokio::net::TcpListener::from_std(listener)?;
    let mut drain = stopped.clone();

    // A dropped sender counts as a stop request.
    let server = axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            let _ = stopped.wait_for(|stop| *stop).await;
        })
        .into_future();
    let deadline = async move {
        let _ = drain.wait_for(|stop| *stop).await;
        tokio::time::sleep(DRAIN_LIMIT).await;
    };

    tokio::select! {
        result = server => result,
        () = deadline => {
            warn!("Status: dropping connections still open after {:?}", DRAIN_LIMIT);
            Ok(())
        }
    }
}

/// Running status server.  Dropping the handle without [`stop`] shuts the
/// server down without waiting for it.
///
/// [`stop`]: StatusServer::stop
pub struct StatusServer {
    addr: SocketAddr,
    stop: watch::Sender<bool>,
    handle: JoinHandle<()>,
}

impl StatusServer {
    /// Bind `addr` and start serving `monitor` on a dedicated thread.
    pub fn spawn(addr: SocketAddr, monitor: Arc<Monitor>) -> io::Result<Self> {
        let listener = TcpListener::bind(addr)?;
        listener.set_nonblocking(true)?;
        let addr = listener.local_addr()?;

        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()?;
        let (stop, stopped) = watch::channel(false);
        let handle = spawn_named("status", SERVER_STACK_KB, move || {
            if let Err(e) = runtime.block_on(serve(listener, router(monitor), stopped)) {
                warn!("Status: server failed: {}", e);
            }
        })?;

        info!("Status: listening on http://{}", addr);
        Ok(Self { addr, stop, handle })
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.addr
    }

    /// Stop accepting, drain open connections and wait for the thread.
    pub fn stop(self) {
        self.stop.send_replace(true);
        if self.handle.join().is_err() {
            warn!("Status: server thread panicked");
        }
        info!("Status: stopped");
    }
}
