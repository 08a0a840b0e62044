//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with the redirect handler
//! - Wire up middleware (tracing, timeout, request ID)
//! - Bind server to listener
//! - Dispatch requests to the rule table and render destinations
//! - Swap in reloaded rules without dropping connections

use std::sync::Arc;
use std::time::Duration;

use arc_swap::ArcSwap;
use axum::{
    extract::{Request, State},
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    routing::any,
    Router,
};
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tower_http::{
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::{RedirectConfig, RuleKind};
use crate::http::request::{request_id, MakeRequestUuidV4, X_REQUEST_ID};
use crate::lifecycle::ShutdownSignal;
use crate::placeholder::{render, RequestContext};
use crate::routing::{RedirectTable, RoutingError};

/// Everything a config reload replaces.
#[derive(Debug)]
pub struct Redirects {
    table: RedirectTable,
    enabled: Vec<RuleKind>,
    fallback: Option<String>,
}

impl Redirects {
    pub fn from_config(config: &RedirectConfig) -> Result<Self, RoutingError> {
        Ok(Self {
            table: RedirectTable::from_config(&config.rules)?,
            enabled: config.enabled_kinds(),
            fallback: config.redirect.clone(),
        })
    }

    pub fn is_enabled(&self, kind: RuleKind) -> bool {
        self.enabled.contains(&kind)
    }
}

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub redirects: Arc<ArcSwap<Redirects>>,
}

/// HTTP server answering every request with a redirect.
pub struct RedirectServer {
    router: Router,
    redirects: Arc<ArcSwap<Redirects>>,
}

impl RedirectServer {
    /// Create a new server with the given configuration.
    pub fn new(config: RedirectConfig) -> Result<Self, RoutingError> {
        let redirects = Arc::new(ArcSwap::from_pointee(Redirects::from_config(&config)?));

        let state = AppState {
            redirects: redirects.clone(),
        };

        let router = Self::build_router(&config, state);
        Ok(Self { router, redirects })
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &RedirectConfig, state: AppState) -> Router {
        Router::new()
            .route("/{*path}", any(redirect_handler))
            .route("/", any(redirect_handler))
            .with_state(state)
            .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs)))
            .layer(PropagateRequestIdLayer::new(X_REQUEST_ID))
            .layer(SetRequestIdLayer::new(X_REQUEST_ID, MakeRequestUuidV4))
            .layer(TraceLayer::new_for_http())
    }

    /// The fully layered router, for driving the service in memory.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Replace the rule table, fallback and enabled kinds.
    pub fn apply(&self, config: &RedirectConfig) -> Result<(), RoutingError> {
        apply_config(&self.redirects, config)
    }

    /// Serve until `shutdown` fires, applying config updates as they arrive.
    pub async fn run(
        self,
        listener: TcpListener,
        mut config_updates: mpsc::UnboundedReceiver<RedirectConfig>,
        mut shutdown: ShutdownSignal,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            rules = self.redirects.load().table.len(),
            "HTTP server starting"
        );

        let redirects = self.redirects.clone();
        let updates = tokio::spawn(async move {
            while let Some(config) = config_updates.recv().await {
                if let Err(e) = apply_config(&redirects, &config) {
                    tracing::error!(error = %e, "rejected config update, keeping current rules");
                }
            }
        });

        axum::serve(listener, self.router.into_make_service())
            .with_graceful_shutdown(async move { shutdown.recv().await })
            .await?;

        updates.abort();
        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

fn apply_config(
    redirects: &ArcSwap<Redirects>,
    config: &RedirectConfig,
) -> Result<(), RoutingError> {
    let next = Redirects::from_config(config)?;
    tracing::info!(rules = next.table.len(), "redirect rules swapped");
    redirects.store(Arc::new(next));
    Ok(())
}

/// Main handler: match a rule, render its destination, redirect.
async fn redirect_handler(State(state): State<AppState>, request: Request) -> Response {
    let request_id = request_id(&request).to_string();
    let redirects = state.redirects.load();
    let ctx = RequestContext::from_request(&request);

    let matched = match redirects.table.match_request(&ctx) {
        Some(m) if redirects.is_enabled(m.rule.kind) => m,
        Some(m) => {
            tracing::debug!(
                request_id = %request_id,
                rule = %m.rule.name,
                kind = %m.rule.kind,
                "rule kind disabled, passing through"
            );
            return fallback(&redirects, &request_id);
        }
        None => {
            tracing::debug!(
                request_id = %request_id,
                host = %ctx.host(),
                path = %ctx.path(),
                "no rule matched"
            );
            return fallback(&redirects, &request_id);
        }
    };

    match render(&matched.rule.template, &ctx, &matched.captures, &matched.segments) {
        Ok(location) => {
            tracing::info!(
                request_id = %request_id,
                rule = %matched.rule.name,
                status = matched.rule.code.as_u16(),
                location = %location,
                "redirecting"
            );
            redirect_to(matched.rule.code, &location, &request_id)
        }
        Err(e) => {
            tracing::error!(
                request_id = %request_id,
                rule = %matched.rule.name,
                error = %e,
                "failed to render redirect"
            );
            (StatusCode::INTERNAL_SERVER_ERROR, "Failed to render redirect").into_response()
        }
    }
}

fn fallback(redirects: &Redirects, request_id: &str) -> Response {
    match &redirects.fallback {
        Some(location) => redirect_to(StatusCode::FOUND, location, request_id),
        None => (StatusCode::NOT_FOUND, "No redirect found").into_response(),
    }
}

fn redirect_to(code: StatusCode, location: &str, request_id: &str) -> Response {
    match HeaderValue::from_str(location) {
        Ok(value) => (code, [(header::LOCATION, value)]).into_response(),
        Err(_) => {
            tracing::error!(
                request_id = %request_id,
                location = %location,
                "rendered location is not a valid header value"
            );
            (StatusCode::INTERNAL_SERVER_ERROR, "Invalid redirect location").into_response()
        }
    }
}
