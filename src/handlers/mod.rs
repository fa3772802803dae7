//! Request handlers.
//!
//! A handler turns a request into a response. Returning `Ok(None)` means
//! "nothing here" and the router falls back to the not-found page; an
//! error is logged by the router and treated the same way.

pub mod actions;
pub mod download;
pub mod login;
pub mod pages;
pub mod static_files;

use thiserror::Error;

use crate::http::request::Request;
use crate::http::response::Response;
use crate::render::RenderError;

pub use actions::{LeaveFolderHandler, LogoutHandler, SetSyncProfileHandler};
pub use download::DownloadHandler;
pub use login::LoginHandler;
pub use pages::{FolderHandler, FoldersHandler, HomeHandler, NotFoundHandler};
pub use static_files::StaticFiles;

/// Files at or above this size are never served.
pub const MAX_FILE_SIZE: u64 = 1024 * 1024;

#[derive(Debug, Error)]
pub enum HandlerError {
    #[error(transparent)]
    Render(#[from] RenderError),
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
}

pub trait Handler: Send + Sync {
    fn handle(&self, req: &Request) -> Result<Option<Response>, HandlerError>;
}

/// Rejects any path that could leave the directory it is resolved against.
pub(crate) fn is_traversal(path: &str) -> bool {
    path.contains("..") || path.contains('\\')
}
