//! Wires the session store, the handlers and the router together and
//! decides, per request, which of them answers.

use std::net::{SocketAddr, TcpStream};
use std::sync::Arc;
use std::time::Instant;

use crate::config::Config;
use crate::handlers::download::DOWNLOAD_PREFIX;
use crate::handlers::login::LOGIN_PATH;
use crate::handlers::pages::PageContext;
use crate::handlers::{
    DownloadHandler, FolderHandler, FoldersHandler, Handler, HomeHandler, LeaveFolderHandler,
    LoginHandler, LogoutHandler, NotFoundHandler, SetSyncProfileHandler, StaticFiles,
};
use crate::http::connection::Connection;
use crate::http::request::{Method, Request};
use crate::http::response::Response;
use crate::http::writer::ResponseWriter;
use crate::render::TemplateEngine;
use crate::repository::FolderRepository;
use crate::router::Router;
use crate::server::pool::ConnectionHandler;
use crate::session::{Credentials, SessionStore, Validation};

const TITLE: &str = "webdesk";

/// What to send back for one request.
#[derive(Debug)]
pub enum Reply {
    Page(Response),
    /// Answered with a bare status line, bypassing the response writer.
    UnsupportedMethod(Method),
}

pub struct App {
    sessions: Arc<SessionStore>,
    router: Router,
    login: Arc<LoginHandler>,
    writer: ResponseWriter,
}

impl App {
    pub fn new(
        cfg: &Config,
        templates: Arc<dyn TemplateEngine>,
        repository: Arc<dyn FolderRepository>,
    ) -> Self {
        Self::with_credentials(cfg, cfg.auth.credentials(), templates, repository)
    }

    pub fn with_credentials(
        cfg: &Config,
        credentials: Credentials,
        templates: Arc<dyn TemplateEngine>,
        repository: Arc<dyn FolderRepository>,
    ) -> Self {
        let sessions = Arc::new(SessionStore::new(credentials));
        let login = Arc::new(LoginHandler::new(sessions.clone(), templates.clone(), TITLE));
        let not_found: Arc<dyn Handler> = Arc::new(NotFoundHandler::new(templates.clone(), TITLE));
        let ctx = PageContext {
            templates,
            repository: repository.clone(),
            title: TITLE.to_string(),
        };

        let mut builder = Router::builder(not_found.clone())
            .route("/", Arc::new(HomeHandler::new(ctx.clone())))
            .route(LOGIN_PATH, login.clone())
            .route("/404", not_found)
            .route("/logout", Arc::new(LogoutHandler::new(sessions.clone())))
            .route("/folders", Arc::new(FoldersHandler::new(ctx.clone())))
            .route("/folder", Arc::new(FolderHandler::new(ctx)))
            .route("/leavefolder", Arc::new(LeaveFolderHandler::new(repository.clone())))
            .route("/setsyncprofile", Arc::new(SetSyncProfileHandler::new(repository.clone())))
            .prefix(DOWNLOAD_PREFIX, Arc::new(DownloadHandler::new(repository)));
        if let Some(root) = &cfg.static_files.root {
            builder = builder.static_files(
                StaticFiles::new(root.clone()).with_max_size(cfg.static_files.max_file_size),
            );
        }

        Self {
            sessions,
            router: builder.build(),
            login,
            writer: ResponseWriter::new(cfg.server_ident()),
        }
    }

    pub fn sessions(&self) -> &SessionStore {
        &self.sessions
    }

    pub fn router(&self) -> &Router {
        &self.router
    }

    pub fn writer(&self) -> &ResponseWriter {
        &self.writer
    }

    /// Produces the reply for a parsed request.
    ///
    /// The login path is always reachable. Any other path needs a valid
    /// session, otherwise the login page is shown in its place.
    pub fn respond(&self, req: &Request) -> Reply {
        if !req.method.is_supported() {
            return Reply::UnsupportedMethod(req.method.clone());
        }

        let mut response = if req.path == LOGIN_PATH {
            self.router.run(self.login.as_ref(), req)
        } else {
            match self.check_session(req, Instant::now()) {
                Validation::Valid(_) => self.router.dispatch(req),
                outcome => {
                    tracing::debug!(path = %req.path, peer = %req.peer, ?outcome, "not logged in, showing login page");
                    self.router.run(self.login.as_ref(), req)
                }
            }
        };

        if req.method == Method::HEAD {
            response.return_body = false;
        }
        Reply::Page(response)
    }

    /// Validates the request's session as of `now`, then drops whatever
    /// other sessions have gone stale.
    pub fn check_session(&self, req: &Request, now: Instant) -> Validation {
        let outcome = self.sessions.validate_at(&req.cookies, req.peer, now);
        let swept = self.sessions.sweep(now);
        if swept > 0 {
            tracing::debug!(swept, "expired sessions removed");
        }
        outcome
    }
}

impl ConnectionHandler for App {
    fn serve(&self, stream: TcpStream, peer: SocketAddr) -> anyhow::Result<()> {
        Connection::new(stream, peer, self).run()
    }
}
