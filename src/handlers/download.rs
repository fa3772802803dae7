use std::sync::Arc;

use crate::handlers::{is_traversal, Handler, HandlerError, MAX_FILE_SIZE};
use crate::http::mime::mime_type;
use crate::http::request::Request;
use crate::http::response::{Response, ResponseBuilder, StatusCode};
use crate::repository::FolderRepository;

pub const DOWNLOAD_PREFIX: &str = "/download/";

/// `/download/<folder>/<path>`: a file out of a shared folder.
pub struct DownloadHandler {
    repository: Arc<dyn FolderRepository>,
}

impl DownloadHandler {
    pub fn new(repository: Arc<dyn FolderRepository>) -> Self {
        Self { repository }
    }
}

impl Handler for DownloadHandler {
    fn handle(&self, req: &Request) -> Result<Option<Response>, HandlerError> {
        let Some(rest) = req.path.strip_prefix(DOWNLOAD_PREFIX) else {
            return Ok(None);
        };
        if is_traversal(rest) {
            return Ok(None);
        }
        let Some((folder, path)) = rest.split_once('/') else {
            return Ok(None);
        };

        let Some(file) = self.repository.read_file(folder, path) else {
            return Ok(None);
        };
        if file.bytes.len() as u64 >= MAX_FILE_SIZE {
            tracing::warn!(%folder, %path, "download too large");
            return Ok(None);
        }

        Ok(Some(
            ResponseBuilder::new(StatusCode::Ok)
                .content_type(mime_type(path))
                .last_modified(file.modified)
                .body(file.bytes)
                .build(),
        ))
    }
}
