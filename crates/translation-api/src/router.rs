//! Route definitions.
//!
//! One `POST` route per registered converter, mounted at
//! `{prefix}/{version}/{pattern}`, plus the converter listing and the
//! health check. Registry patterns use `:Param` segments; they are
//! rewritten to the router's `{Param}` capture syntax here.
//!
//! Routes are checked against each other before they are handed to Axum,
//! which would otherwise panic on a conflicting registration. A pattern
//! that cannot coexist with the ones already bound, such as
//! `pdf-to-page-png/:Number` next to `pdf-to-page-png/:Page`, turns into a
//! configuration error.

use std::collections::HashMap;
use std::sync::Arc;

use axum::extract::rejection::PathRejection;
use axum::extract::{DefaultBodyLimit, Path, Request, State};
use axum::http::Method;
use axum::routing::{get, post};
use axum::{Router, middleware as axum_middleware};
use tower_http::trace::TraceLayer;
use tracing::info;

use translation_converter::FileTranslation;
use translation_core::{AppError, AppResult};

use crate::handlers;
use crate::handlers::conversion::ConverterRoute;
use crate::middleware;
use crate::state::AppState;

/// Bind every converter currently registered on `translation`.
///
/// Converters added later are not visible to the returned router.
pub fn connect_routes(translation: &FileTranslation) -> AppResult<Router> {
    build_router(AppState::new(translation))
}

/// Build the complete Axum router with all routes and middleware.
///
/// Fails with a configuration error when two routes cannot coexist or a
/// pattern is malformed.
pub fn build_router(state: AppState) -> AppResult<Router> {
    let mut table = RouteTable::default();
    let mut router: Router<AppState> = Router::new();

    for (pattern, converter) in state.registry.iter() {
        let full = state.config.route_for(pattern);
        table.bind(&full, Method::POST).map_err(|e| {
            AppError::configuration(format!("Cannot bind converter {pattern}: {}", e.message))
        })?;
        let path = route_path(&full);

        if state.config.log_level > 0 {
            info!(pattern, route = %path, "Bound converter route");
        }

        let route = ConverterRoute {
            pattern: Arc::from(pattern),
            converter: Arc::clone(converter),
        };

        router = router.route(
            &path,
            post(
                move |State(state): State<AppState>,
                      params: Result<Path<HashMap<String, String>>, PathRejection>,
                      request: Request| async move {
                    let params = handlers::conversion::route_params(&route, params)?;
                    handlers::conversion::convert(state, route, params, request).await
                },
            ),
        );
    }

    let listing = state.config.route_for("converters");
    table.bind(&listing, Method::GET)?;
    table.bind(HEALTH_ROUTE, Method::GET)?;

    Ok(router
        .route(&route_path(&listing), get(handlers::health::list_converters))
        .route(HEALTH_ROUTE, get(handlers::health::health))
        // bodies are bounded by the conversion handler itself
        .layer(DefaultBodyLimit::disable())
        .layer(TraceLayer::new_for_http())
        .layer(axum_middleware::from_fn(
            middleware::logging::request_logging,
        ))
        .with_state(state))
}

const HEALTH_ROUTE: &str = "/health";

/// Rewrite `:Param` and `*Rest` segments into `{Param}` and `{*Rest}`.
pub fn route_path(route: &str) -> String {
    route
        .split('/')
        .map(|segment| {
            if let Some(name) = segment.strip_prefix(':') {
                format!("{{{name}}}")
            } else if let Some(name) = segment.strip_prefix('*') {
                format!("{{*{name}}}")
            } else {
                segment.to_string()
            }
        })
        .collect::<Vec<_>>()
        .join("/")
}

/// One segment of a `:Param`-style route.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Static(String),
    Param(String),
    CatchAll(String),
}

fn parse_segments(route: &str) -> AppResult<Vec<Segment>> {
    let invalid = |reason: &str| AppError::configuration(format!("Invalid route {route}: {reason}"));

    if !route.starts_with('/') {
        return Err(invalid("routes must start with '/'"));
    }

    let raw: Vec<&str> = route[1..].split('/').collect();
    let mut segments = Vec::with_capacity(raw.len());
    let mut names: Vec<&str> = Vec::new();

    for (i, segment) in raw.iter().enumerate() {
        if segment.contains(['{', '}']) {
            return Err(invalid("braces are not allowed in route segments"));
        }

        let (name, parsed) = if let Some(name) = segment.strip_prefix(':') {
            (name, Segment::Param(name.to_string()))
        } else if let Some(name) = segment.strip_prefix('*') {
            if i + 1 != raw.len() {
                return Err(invalid("a catch-all must be the last segment"));
            }
            (name, Segment::CatchAll(name.to_string()))
        } else {
            segments.push(Segment::Static(segment.to_string()));
            continue;
        };

        if name.is_empty() {
            return Err(invalid("parameters need a name"));
        }
        if name.contains([':', '*']) {
            return Err(invalid("parameter names cannot contain ':' or '*'"));
        }
        if names.contains(&name) {
            return Err(invalid(&format!("parameter {name} appears twice")));
        }
        names.push(name);
        segments.push(parsed);
    }

    Ok(segments)
}

/// Whether two parsed routes can not be registered side by side.
///
/// Static segments may sit next to a parameter. Two parameters at the same
/// position must share a name, and a catch-all tolerates no sibling except
/// an identical one. Identical routes only clash for the same method.
fn conflicts(a: &[Segment], b: &[Segment], same_method: bool) -> bool {
    for pair in a.iter().zip(b) {
        match pair {
            (Segment::Static(x), Segment::Static(y)) if x == y => {}
            (Segment::Param(x), Segment::Param(y)) if x == y => {}
            (Segment::CatchAll(x), Segment::CatchAll(y)) if x == y => {}
            (Segment::Param(_), Segment::Param(_)) => return true,
            (Segment::CatchAll(_), _) | (_, Segment::CatchAll(_)) => return true,
            // the routes diverge here
            _ => return false,
        }
    }

    a.len() == b.len() && same_method
}

/// Routes bound so far, kept to reject conflicts before Axum sees them.
#[derive(Debug, Default)]
struct RouteTable {
    bound: Vec<(String, Method, Vec<Segment>)>,
}

impl RouteTable {
    fn bind(&mut self, route: &str, method: Method) -> AppResult<()> {
        let segments = parse_segments(route)?;

        if let Some((other, _, _)) = self
            .bound
            .iter()
            .find(|(_, m, s)| conflicts(&segments, s, *m == method))
        {
            return Err(AppError::configuration(format!(
                "Route {route} conflicts with {other}"
            )));
        }

        self.bound.push((route.to_string(), method, segments));
        Ok(())
    }
}
