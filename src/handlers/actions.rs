use std::sync::Arc;

use crate::handlers::login::LOGIN_PATH;
use crate::handlers::{Handler, HandlerError};
use crate::http::request::Request;
use crate::http::response::Response;
use crate::repository::{FolderRepository, SyncProfile};
use crate::session::SessionStore;

/// `/leavefolder?name=`: stops sharing a folder and goes back home.
pub struct LeaveFolderHandler {
    repository: Arc<dyn FolderRepository>,
}

impl LeaveFolderHandler {
    pub fn new(repository: Arc<dyn FolderRepository>) -> Self {
        Self { repository }
    }
}

impl Handler for LeaveFolderHandler {
    fn handle(&self, req: &Request) -> Result<Option<Response>, HandlerError> {
        let Some(name) = req.param("name") else {
            return Ok(None);
        };
        if !self.repository.leave_folder(name) {
            return Ok(None);
        }
        tracing::info!(folder = %name, "left folder");
        Ok(Some(Response::redirect("/").build()))
    }
}

/// `/setsyncprofile?name=&profile=`
pub struct SetSyncProfileHandler {
    repository: Arc<dyn FolderRepository>,
}

impl SetSyncProfileHandler {
    pub fn new(repository: Arc<dyn FolderRepository>) -> Self {
        Self { repository }
    }
}

impl Handler for SetSyncProfileHandler {
    fn handle(&self, req: &Request) -> Result<Option<Response>, HandlerError> {
        let (Some(name), Some(profile)) = (req.param("name"), req.param("profile")) else {
            return Ok(None);
        };
        let profile: SyncProfile = match profile.parse() {
            Ok(p) => p,
            Err(e) => {
                tracing::debug!(error = %e, "rejecting sync profile change");
                return Ok(None);
            }
        };
        if !self.repository.set_sync_profile(name, profile) {
            return Ok(None);
        }
        tracing::info!(folder = %name, %profile, "sync profile changed");
        Ok(Some(Response::redirect("/").build()))
    }
}

/// `/logout`: drops the caller's session.
pub struct LogoutHandler {
    sessions: Arc<SessionStore>,
}

impl LogoutHandler {
    pub fn new(sessions: Arc<SessionStore>) -> Self {
        Self { sessions }
    }
}

impl Handler for LogoutHandler {
    fn handle(&self, req: &Request) -> Result<Option<Response>, HandlerError> {
        if self.sessions.logout(&req.cookies) {
            tracing::info!(peer = %req.peer, "logged out");
        }
        Ok(Some(Response::redirect(LOGIN_PATH).build()))
    }
}
