//! Embedded web dashboard for tally.
//!
//! Provides a lightweight HTTP server (sync, via `tiny_http`) that serves:
//! - A single-page dashboard with the live counter, filters, record table,
//!   pagination and export
//! - JSON API endpoints driving that page
//!
//! Launched via `tally serve` (default: `http://127.0.0.1:9747`).

mod api;
mod frontend;

use std::io::Cursor;

use anyhow::{Context, Result};
use serde::Serialize;
use tiny_http::{Header, Method, Response, Server, StatusCode};

use crate::activity::{ActivityKind, ActivityLog};
use crate::config::TallyConfig;
use crate::counter::{Clock, LiveCounter, SystemClock};
use crate::records::{self, DataSource, LoadError};
use crate::session::{LoadOutcome, Session};

// ---------------------------------------------------------------------------
// Dashboard state
// ---------------------------------------------------------------------------

/// Everything the request handlers read and replace.
///
/// Requests are handled one at a time, so the session is swapped wholesale
/// after each successful operation and never observed half-updated.
pub struct Dashboard {
    config: TallyConfig,
    source: DataSource,
    session: Session,
    counter: LiveCounter,
    clock: Box<dyn Clock>,
    activity: ActivityLog,
}

impl Dashboard {
    /// An empty dashboard; call [`Dashboard::refresh`] to load records.
    pub fn new(config: TallyConfig) -> Self {
        Self {
            source: config.data_source(),
            session: Session::new(config.pagination.page_size),
            counter: LiveCounter::new(config.start_instant()),
            clock: Box::new(SystemClock),
            activity: ActivityLog::from_config(&config),
            config,
        }
    }

    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    pub fn with_activity(mut self, activity: ActivityLog) -> Self {
        self.activity = activity;
        self
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Reload the canonical set from the data source.
    ///
    /// On failure the previous records stay in place.
    pub fn refresh(&mut self) -> Result<usize, LoadError> {
        let ticket = self.session.begin_load();
        let result = records::load(&self.source, self.config.load_timeout());

        match self.session.finish_load(ticket, result) {
            LoadOutcome::Applied(next) => {
                self.session = next;
                let count = self.session.canonical().len();
                log::info!("loaded {count} records from {}", self.source);
                self.activity
                    .record(ActivityKind::Load, self.source.to_string(), Some(count));
                Ok(count)
            }
            LoadOutcome::Stale => Ok(self.session.canonical().len()),
            LoadOutcome::Failed(e) => {
                log::warn!("{e}");
                self.activity
                    .record(ActivityKind::LoadFailed, e.to_string(), None);
                Err(e)
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Server entry point
// ---------------------------------------------------------------------------

/// Start the web dashboard server.
///
/// Blocks the current thread. Handles requests sequentially (sufficient for
/// a local single-user dashboard). Errors are reported per request without
/// stopping the server.
pub fn serve(config: TallyConfig) -> Result<()> {
    let addr = config.web.addr.clone();
    let open = config.web.open_browser;

    let server = Server::http(addr.as_str())
        .map_err(|e| anyhow::anyhow!("failed to start HTTP server on {addr}: {e}"))?;

    let mut dashboard = Dashboard::new(config);
    if let Err(e) = dashboard.refresh() {
        log::warn!("starting with no records: {e}");
    }

    println!("tally dashboard running at http://{addr}");
    println!("Press Ctrl+C to stop.\n");

    let url = format!("http://{addr}");
    if open && let Err(e) = open_browser(&url) {
        log::debug!("{e:#}");
    }

    for mut request in server.incoming_requests() {
        let method = request.method().clone();
        let url = request.url().to_string();

        let body = if matches!(method, Method::Put | Method::Post | Method::Patch) {
            let mut buf = String::new();
            let _ = request.as_reader().read_to_string(&mut buf);
            Some(buf)
        } else {
            None
        };

        let reply = dispatch(&mut dashboard, &method, &url, body.as_deref());
        let status = reply.status;
        if let Err(e) = request.respond(reply.into_response()) {
            log::debug!("failed to send response for {url}: {e}");
        }

        // Brief access log
        println!(
            "{} {} {} {}",
            method,
            url,
            status,
            chrono::Local::now().format("%H:%M:%S")
        );
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Router
// ---------------------------------------------------------------------------

/// Dispatch an incoming request to the appropriate handler.
pub fn dispatch(
    dashboard: &mut Dashboard,
    method: &Method,
    url: &str,
    body: Option<&str>,
) -> Reply {
    // Strip query string for path matching
    let path = url.split('?').next().unwrap_or(url);

    let result = match (method, path) {
        // Frontend
        (&Method::Get, "/") | (&Method::Get, "/index.html") => {
            Ok(Reply::html(frontend::INDEX_HTML))
        }

        // API: counter and view
        (&Method::Get, "/api/counter") => api::get_counter(dashboard),
        (&Method::Get, "/api/view") => api::get_view(dashboard),

        // API: state changes
        (&Method::Post, "/api/filters") => api::post_filters(dashboard, body.unwrap_or("")),
        (&Method::Post, "/api/filters/reset") => api::post_reset(dashboard),
        (&Method::Post, "/api/page/next") => api::post_next_page(dashboard),
        (&Method::Post, "/api/page/prev") => api::post_previous_page(dashboard),
        (&Method::Post, "/api/refresh") => api::post_refresh(dashboard),

        // API: export and activity
        (&Method::Get, "/api/export") => api::get_export(dashboard),
        (&Method::Get, "/api/activity") => api::get_activity(dashboard, url),

        _ => Ok(Reply::error(404, "not found")),
    };

    result.unwrap_or_else(|e| Reply::error(500, &format!("{e:#}")))
}

// ---------------------------------------------------------------------------
// Response helpers
// ---------------------------------------------------------------------------

/// A handler result, independent of the transport so it can be inspected in
/// tests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub status: u16,
    pub content_type: &'static str,
    pub body: Vec<u8>,
    /// File name for a `Content-Disposition: attachment` header.
    pub attachment: Option<String>,
}

const JSON: &str = "application/json; charset=utf-8";
const HTML: &str = "text/html; charset=utf-8";

impl Reply {
    pub fn json<T: Serialize>(data: &T) -> Result<Self> {
        let body = serde_json::to_vec(data).context("failed to serialize JSON response")?;
        Ok(Self {
            status: 200,
            content_type: JSON,
            body,
            attachment: None,
        })
    }

    pub fn html(page: &str) -> Self {
        Self {
            status: 200,
            content_type: HTML,
            body: page.as_bytes().to_vec(),
            attachment: None,
        }
    }

    pub fn error(status: u16, message: &str) -> Self {
        Self {
            status,
            content_type: JSON,
            body: serde_json::json!({ "error": message }).to_string().into_bytes(),
            attachment: None,
        }
    }

    /// A JSON document served as a download named `name`.
    pub fn attachment(name: String, body: Vec<u8>) -> Self {
        Self {
            status: 200,
            content_type: JSON,
            body,
            attachment: Some(name),
        }
    }

    pub fn body_text(&self) -> &str {
        std::str::from_utf8(&self.body).unwrap_or("")
    }

    fn into_response(self) -> Response<Cursor<Vec<u8>>> {
        let mut response =
            Response::from_data(self.body).with_status_code(StatusCode(self.status));

        if let Ok(header) = Header::from_bytes("Content-Type", self.content_type) {
            response = response.with_header(header);
        }
        if let Some(name) = self.attachment {
            let value = format!("attachment; filename=\"{name}\"");
            if let Ok(header) = Header::from_bytes("Content-Disposition", value.as_bytes()) {
                response = response.with_header(header);
            }
        }

        response
    }
}

/// Attempt to open a URL in the system default browser.
fn open_browser(url: &str) -> Result<()> {
    #[cfg(target_os = "windows")]
    {
        std::process::Command::new("cmd")
            .args(["/C", "start", url])
            .spawn()
            .context("failed to open browser")?;
    }

    #[cfg(target_os = "macos")]
    {
        std::process::Command::new("open")
            .arg(url)
            .spawn()
            .context("failed to open browser")?;
    }

    #[cfg(target_os = "linux")]
    {
        std::process::Command::new("xdg-open")
            .arg(url)
            .spawn()
            .context("failed to open browser")?;
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
