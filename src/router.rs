//! Path-to-handler routing.
//!
//! # Resolution order
//! 1. Exact path match in the route table
//! 2. Longest matching prefix route
//! 3. Static files below the configured root
//! 4. The not-found handler, always answering with status 404
//!
//! The table is built once at startup and never changes afterwards, so it
//! is shared between workers without locking.

use std::collections::HashMap;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use crate::handlers::{Handler, StaticFiles};
use crate::http::request::Request;
use crate::http::response::{Response, StatusCode};

pub struct Router {
    exact: HashMap<String, Arc<dyn Handler>>,
    prefixes: Vec<(String, Arc<dyn Handler>)>,
    static_files: Option<StaticFiles>,
    not_found: Arc<dyn Handler>,
}

pub struct RouterBuilder {
    exact: HashMap<String, Arc<dyn Handler>>,
    prefixes: Vec<(String, Arc<dyn Handler>)>,
    static_files: Option<StaticFiles>,
    not_found: Arc<dyn Handler>,
}

impl RouterBuilder {
    pub fn route(mut self, path: impl Into<String>, handler: Arc<dyn Handler>) -> Self {
        self.exact.insert(path.into(), handler);
        self
    }

    pub fn prefix(mut self, prefix: impl Into<String>, handler: Arc<dyn Handler>) -> Self {
        self.prefixes.push((prefix.into(), handler));
        self
    }

    pub fn static_files(mut self, files: StaticFiles) -> Self {
        self.static_files = Some(files);
        self
    }

    pub fn build(mut self) -> Router {
        // longest prefix first
        self.prefixes.sort_by(|a, b| b.0.len().cmp(&a.0.len()));
        Router {
            exact: self.exact,
            prefixes: self.prefixes,
            static_files: self.static_files,
            not_found: self.not_found,
        }
    }
}

impl Router {
    pub fn builder(not_found: Arc<dyn Handler>) -> RouterBuilder {
        RouterBuilder {
            exact: HashMap::new(),
            prefixes: Vec::new(),
            static_files: None,
            not_found,
        }
    }

    /// Picks the handler for `path`. Falls back to static files, and to the
    /// not-found handler when no static root is configured.
    pub fn resolve(&self, path: &str) -> &dyn Handler {
        if let Some(handler) = self.exact.get(path) {
            return handler.as_ref();
        }
        if let Some((_, handler)) = self.prefixes.iter().find(|(p, _)| path.starts_with(p.as_str())) {
            return handler.as_ref();
        }
        match &self.static_files {
            Some(files) => files as &dyn Handler,
            None => self.not_found.as_ref(),
        }
    }

    /// Resolves and runs the handler for `req`.
    pub fn dispatch(&self, req: &Request) -> Response {
        let handler = self.resolve(&req.path);
        tracing::debug!(path = %req.path, "dispatching request");
        self.run(handler, req)
    }

    /// Runs `handler`, replacing a missing response, a failure or a 404
    /// with the not-found page.
    pub fn run(&self, handler: &dyn Handler, req: &Request) -> Response {
        match invoke(handler, req) {
            Some(response) if response.status != StatusCode::NotFound => response,
            _ => self.not_found(req),
        }
    }

    /// The not-found page for `req`, always with status 404.
    pub fn not_found(&self, req: &Request) -> Response {
        match invoke(self.not_found.as_ref(), req) {
            Some(mut response) => {
                response.status = StatusCode::NotFound;
                response
            }
            None => Response::not_found(),
        }
    }
}

/// Calls a handler, converting errors and panics into `None`.
fn invoke(handler: &dyn Handler, req: &Request) -> Option<Response> {
    match panic::catch_unwind(AssertUnwindSafe(|| handler.handle(req))) {
        Ok(Ok(response)) => response,
        Ok(Err(e)) => {
            tracing::error!(path = %req.path, error = %e, "handler failed");
            None
        }
        Err(_) => {
            tracing::error!(path = %req.path, "handler panicked");
            None
        }
    }
}
