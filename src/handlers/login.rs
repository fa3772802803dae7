use std::sync::Arc;

use serde_json::json;

use crate::handlers::{Handler, HandlerError};
use crate::http::request::Request;
use crate::http::response::Response;
use crate::render::{TemplateEngine, LOGIN_TEMPLATE};
use crate::session::{AuthFailure, SessionStore, SESSION_COOKIE, USERNAME_COOKIE};

pub const LOGIN_PATH: &str = "/login";

const USERNAME_PARAM: &str = "Username";
const PASSWORD_PARAM: &str = "Password";

/// Shows the login form and turns submitted credentials into a session.
///
/// Credentials are only looked at on the login path itself. Everywhere
/// else, an anonymous visitor just gets the form.
pub struct LoginHandler {
    sessions: Arc<SessionStore>,
    templates: Arc<dyn TemplateEngine>,
    title: String,
}

impl LoginHandler {
    pub fn new(sessions: Arc<SessionStore>, templates: Arc<dyn TemplateEngine>, title: impl Into<String>) -> Self {
        Self {
            sessions,
            templates,
            title: title.into(),
        }
    }

    fn page(&self, username: &str, error: bool) -> Result<Response, HandlerError> {
        let body = self.templates.render(
            LOGIN_TEMPLATE,
            &json!({ "title": self.title, "username": username, "error": error }),
        )?;
        Ok(Response::ok(body))
    }
}

impl Handler for LoginHandler {
    fn handle(&self, req: &Request) -> Result<Option<Response>, HandlerError> {
        let username = req.param(USERNAME_PARAM);
        let password = req.param(PASSWORD_PARAM);

        if req.path != LOGIN_PATH || (username.is_none() && password.is_none()) {
            return self.page("", false).map(Some);
        }

        match self.sessions.authenticate(username, password, req.peer) {
            Ok(session) => Ok(Some(
                Response::redirect("/")
                    .cookie(USERNAME_COOKIE, session.username)
                    .cookie(SESSION_COOKIE, session.token)
                    .build(),
            )),
            Err(AuthFailure::MissingCredentials) => self.page(username.unwrap_or(""), true).map(Some),
            Err(AuthFailure::BadCredentials { username }) => self.page(&username, true).map(Some),
        }
    }
}
