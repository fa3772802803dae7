use std::fs;
use std::path::{Component, Path, PathBuf};

use crate::handlers::{is_traversal, Handler, HandlerError, MAX_FILE_SIZE};
use crate::http::mime::mime_type;
use crate::http::request::Request;
use crate::http::response::{Response, ResponseBuilder, StatusCode};

/// Serves files below a root directory.
///
/// Any path containing `..` is refused outright, whether or not the target
/// exists. Files of `max_size` bytes or more are refused too.
pub struct StaticFiles {
    base_dir: PathBuf,
    max_size: u64,
}

impl StaticFiles {
    pub fn new<P: Into<PathBuf>>(base: P) -> Self {
        Self {
            base_dir: base.into(),
            max_size: MAX_FILE_SIZE,
        }
    }

    pub fn with_max_size(mut self, max_size: u64) -> Self {
        self.max_size = max_size;
        self
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Maps a URL path onto the file system, or `None` if it tries to escape
    /// the root.
    pub fn map_path(&self, url_path: &str) -> Option<PathBuf> {
        if is_traversal(url_path) {
            return None;
        }
        let relative = url_path.trim_start_matches('/');
        if relative.is_empty() {
            return None;
        }

        let mut pb = self.base_dir.clone();
        for comp in Path::new(relative).components() {
            match comp {
                Component::Normal(s) => pb.push(s),
                Component::CurDir => {}
                _ => return None,
            }
        }
        Some(pb)
    }

    fn load(&self, url_path: &str) -> Result<Option<Response>, HandlerError> {
        let Some(path) = self.map_path(url_path) else {
            tracing::warn!(path = %url_path, "refusing static path");
            return Ok(None);
        };

        let meta = match fs::metadata(&path) {
            Ok(meta) if meta.is_file() => meta,
            _ => return Ok(None),
        };
        if meta.len() >= self.max_size {
            tracing::warn!(path = %url_path, size = meta.len(), "static file too large");
            return Ok(None);
        }

        let bytes = fs::read(&path)?;
        let file_name = path.file_name().and_then(|n| n.to_str()).unwrap_or("");

        let mut builder = ResponseBuilder::new(StatusCode::Ok)
            .content_type(mime_type(file_name))
            .body(bytes);
        if let Ok(modified) = meta.modified() {
            builder = builder.last_modified(modified);
        }
        Ok(Some(builder.build()))
    }
}

impl Handler for StaticFiles {
    fn handle(&self, req: &Request) -> Result<Option<Response>, HandlerError> {
        self.load(&req.path)
    }
}
