//! Framework-agnostic dashboard request handler.
//!
//! Mount [`Dashboard::handle`] behind any HTTP server at a path of your
//! choosing (conventionally [`DEFAULT_DASHBOARD_PATH`]): GET renders the
//! current report, POST with `turn=on|off` toggles collection and
//! `clear=1` discards everything collected so far. The handler owns its
//! own profiling session; collection is on after construction.
//!
//! [`DEFAULT_DASHBOARD_PATH`]: crate::utils::config::DEFAULT_DASHBOARD_PATH

use crate::engine::EventHub;
use crate::report::report_with_title;
use crate::sample::Sample;
use crate::session::{self, ProfilingSession};
use crate::utils::config::DEFAULT_REPORT_TITLE;
use log::{debug, error};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Request method, as far as the dashboard distinguishes them
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Other,
}

/// A rendered dashboard response, ready to be mapped onto any HTTP stack
#[derive(Debug, Clone)]
pub struct DashboardResponse {
    /// HTTP-style status code
    pub status: u16,

    /// Content type of `body`
    pub content_type: &'static str,

    /// Response body
    pub body: String,

    /// Value for the `Allow` header on 405 responses
    pub allow: Option<&'static str>,
}

impl DashboardResponse {
    fn html(body: String) -> Self {
        Self {
            status: 200,
            content_type: "text/html",
            body,
            allow: None,
        }
    }

    fn plain(status: u16, body: &str) -> Self {
        Self {
            status,
            content_type: "text/plain",
            body: body.to_string(),
            allow: None,
        }
    }
}

struct DashboardState {
    session: ProfilingSession,
    retained: Vec<Sample>,
}

/// Profiling dashboard over one event hub
pub struct Dashboard {
    state: Mutex<DashboardState>,
}

impl Dashboard {
    /// Create a dashboard and start collecting immediately
    pub fn new(hub: Arc<EventHub>) -> Self {
        Self {
            state: Mutex::new(DashboardState {
                session: session::start(hub),
                retained: Vec::new(),
            }),
        }
    }

    /// Whether statements are currently being collected
    pub fn is_collecting(&self) -> bool {
        self.lock().session.is_active()
    }

    /// Handle one dashboard request.
    ///
    /// * GET renders the report over everything collected so far.
    /// * POST `clear=1` discards collected samples, then renders.
    /// * POST `turn=on|off` toggles collection, then renders.
    /// * POST without a valid `turn` parameter is a 400; collection state
    ///   is unchanged.
    /// * Any other method is a 405 with `Allow: GET, POST`.
    pub fn handle(&self, method: Method, body: &str) -> DashboardResponse {
        let mut state = self.lock();

        match method {
            Method::Get => {}
            Method::Post => {
                let params = parse_form(body);

                if params.iter().any(|(k, v)| k == "clear" && !v.is_empty()) {
                    debug!("Dashboard: clearing collected samples");
                    let _ = state.session.collect(); // discard anything buffered
                    state.retained.clear();
                    return render(&mut state);
                }

                let turn = params
                    .iter()
                    .find(|(k, _)| k == "turn")
                    .map(|(_, v)| v.trim().to_ascii_lowercase());
                match turn.as_deref() {
                    Some("on") => set_collecting(&mut state, true),
                    Some("off") => set_collecting(&mut state, false),
                    _ => {
                        return DashboardResponse::plain(
                            400,
                            "400 Bad Request: parameter \"turn=(on|off)\" required",
                        )
                    }
                }
            }
            Method::Other => {
                let mut response =
                    DashboardResponse::plain(405, "405 Method Not Allowed");
                response.allow = Some("GET, POST");
                return response;
            }
        }

        render(&mut state)
    }

    fn lock(&self) -> MutexGuard<'_, DashboardState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn set_collecting(state: &mut DashboardState, on: bool) {
    if on == state.session.is_active() {
        return;
    }
    let result = if on {
        state.session.start()
    } else {
        state.session.stop()
    };
    // Guarded by is_active, so lifecycle errors cannot occur here.
    debug_assert!(result.is_ok());
    debug!("Dashboard: collection turned {}", if on { "on" } else { "off" });
}

fn render(state: &mut DashboardState) -> DashboardResponse {
    // Move anything the session buffered since the last request into the
    // retained set, then report over the whole set.
    if let Ok(fresh) = state.session.collect() {
        state.retained.extend(fresh);
    }

    match report_with_title(&state.retained, DEFAULT_REPORT_TITLE, None) {
        Ok(html) => DashboardResponse::html(html),
        Err(e) => {
            error!("Dashboard report rendering failed: {}", e);
            DashboardResponse::plain(500, "500 Internal Server Error")
        }
    }
}

/// Parse an application/x-www-form-urlencoded body into key/value pairs
fn parse_form(body: &str) -> Vec<(String, String)> {
    body.split('&')
        .filter(|pair| !pair.is_empty())
        .map(|pair| {
            let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
            (decode_component(key), decode_component(value))
        })
        .collect()
}

/// Minimal percent-decoding: `+` as space, `%XX` as the byte it names
fn decode_component(text: &str) -> String {
    let mut out = Vec::with_capacity(text.len());
    let bytes = text.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'+' => {
                out.push(b' ');
                i += 1;
            }
            b'%' if i + 2 < bytes.len() => {
                let hi = (bytes[i + 1] as char).to_digit(16);
                let lo = (bytes[i + 2] as char).to_digit(16);
                match (hi, lo) {
                    (Some(hi), Some(lo)) => {
                        out.push((hi * 16 + lo) as u8);
                        i += 3;
                    }
                    _ => {
                        out.push(b'%');
                        i += 1;
                    }
                }
            }
            byte => {
                out.push(byte);
                i += 1;
            }
        }
    }
    String::from_utf8_lossy(&out).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{ConnectionId, ScriptedEngine};
    use std::time::Duration;

    fn dashboard_with_engine() -> (Dashboard, ScriptedEngine) {
        let hub = Arc::new(EventHub::new());
        let dashboard = Dashboard::new(Arc::clone(&hub));
        (dashboard, ScriptedEngine::new(hub))
    }

    #[test]
    fn test_get_renders_collected_statements() {
        let (dashboard, engine) = dashboard_with_engine();
        engine.execute(ConnectionId(1), "SELECT name FROM users", Duration::ZERO);

        let response = dashboard.handle(Method::Get, "");
        assert_eq!(response.status, 200);
        assert_eq!(response.content_type, "text/html");
        assert!(response.body.contains("SELECT name FROM users"));
    }

    #[test]
    fn test_unsupported_method() {
        let (dashboard, _engine) = dashboard_with_engine();
        let response = dashboard.handle(Method::Other, "");

        assert_eq!(response.status, 405);
        assert_eq!(response.allow, Some("GET, POST"));
    }

    #[test]
    fn test_invalid_turn_is_400_and_state_unchanged() {
        let (dashboard, _engine) = dashboard_with_engine();
        assert!(dashboard.is_collecting());

        let response = dashboard.handle(Method::Post, "turn=sideways");

        assert_eq!(response.status, 400);
        assert!(dashboard.is_collecting());
    }

    #[test]
    fn test_missing_turn_is_400() {
        let (dashboard, _engine) = dashboard_with_engine();
        let response = dashboard.handle(Method::Post, "");
        assert_eq!(response.status, 400);
    }

    #[test]
    fn test_turn_off_stops_collection() {
        let (dashboard, engine) = dashboard_with_engine();

        let response = dashboard.handle(Method::Post, "turn=off");
        assert_eq!(response.status, 200);
        assert!(!dashboard.is_collecting());

        engine.execute(ConnectionId(1), "SELECT 1", Duration::ZERO);
        let response = dashboard.handle(Method::Get, "");
        assert!(!response.body.contains("SELECT 1"));

        dashboard.handle(Method::Post, "turn=on");
        assert!(dashboard.is_collecting());
    }

    #[test]
    fn test_clear_discards_samples() {
        let (dashboard, engine) = dashboard_with_engine();
        engine.execute(ConnectionId(1), "SELECT 1", Duration::ZERO);

        let response = dashboard.handle(Method::Post, "clear=1");
        assert_eq!(response.status, 200);
        assert!(response.body.contains("No queries collected"));
    }

    #[test]
    fn test_parse_form() {
        let params = parse_form("turn=on&clear=1");
        assert_eq!(params.len(), 2);
        assert_eq!(params[0], ("turn".to_string(), "on".to_string()));
    }

    #[test]
    fn test_decode_component() {
        assert_eq!(decode_component("a+b"), "a b");
        assert_eq!(decode_component("a%20b"), "a b");
        assert_eq!(decode_component("a%2Gb"), "a%2Gb");
    }
}
