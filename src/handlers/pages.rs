use std::sync::Arc;

use serde_json::json;

use crate::handlers::{Handler, HandlerError};
use crate::http::request::Request;
use crate::http::response::{Response, ResponseBuilder, StatusCode};
use crate::render::{TemplateEngine, FOLDERS_TEMPLATE, FOLDER_TEMPLATE, HOME_TEMPLATE, NOT_FOUND_TEMPLATE};
use crate::repository::{FolderRepository, SyncProfile};
use crate::session::USERNAME_COOKIE;

/// Everything a page handler needs to render.
#[derive(Clone)]
pub struct PageContext {
    pub templates: Arc<dyn TemplateEngine>,
    pub repository: Arc<dyn FolderRepository>,
    pub title: String,
}

impl PageContext {
    fn render(&self, template: &str, mut vars: serde_json::Value) -> Result<Vec<u8>, HandlerError> {
        vars["title"] = json!(self.title);
        Ok(self.templates.render(template, &vars)?)
    }
}

/// `/`: greeting and folder overview.
pub struct HomeHandler {
    ctx: PageContext,
}

impl HomeHandler {
    pub fn new(ctx: PageContext) -> Self {
        Self { ctx }
    }
}

impl Handler for HomeHandler {
    fn handle(&self, req: &Request) -> Result<Option<Response>, HandlerError> {
        let body = self.ctx.render(
            HOME_TEMPLATE,
            json!({
                "username": req.cookie(USERNAME_COOKIE).unwrap_or_default(),
                "folders": self.ctx.repository.folders(),
            }),
        )?;
        Ok(Some(Response::ok(body)))
    }
}

/// `/folders`: table of all folders.
pub struct FoldersHandler {
    ctx: PageContext,
}

impl FoldersHandler {
    pub fn new(ctx: PageContext) -> Self {
        Self { ctx }
    }
}

impl Handler for FoldersHandler {
    fn handle(&self, _req: &Request) -> Result<Option<Response>, HandlerError> {
        let body = self
            .ctx
            .render(FOLDERS_TEMPLATE, json!({ "folders": self.ctx.repository.folders() }))?;
        Ok(Some(Response::ok(body)))
    }
}

/// `/folder?name=`: details of one folder.
pub struct FolderHandler {
    ctx: PageContext,
}

impl FolderHandler {
    pub fn new(ctx: PageContext) -> Self {
        Self { ctx }
    }
}

impl Handler for FolderHandler {
    fn handle(&self, req: &Request) -> Result<Option<Response>, HandlerError> {
        let Some(folder) = req.param("name").and_then(|name| self.ctx.repository.folder(name)) else {
            return Ok(None);
        };
        let profiles: Vec<&str> = SyncProfile::ALL.iter().map(|p| p.as_str()).collect();
        let files = self.ctx.repository.files(&folder.name);

        let body = self.ctx.render(
            FOLDER_TEMPLATE,
            json!({ "folder": folder, "files": files, "profiles": profiles }),
        )?;
        Ok(Some(Response::ok(body)))
    }
}

/// `/404` and the fallback for everything nobody else answered.
pub struct NotFoundHandler {
    templates: Arc<dyn TemplateEngine>,
    title: String,
}

impl NotFoundHandler {
    pub fn new(templates: Arc<dyn TemplateEngine>, title: impl Into<String>) -> Self {
        Self {
            templates,
            title: title.into(),
        }
    }
}

impl Handler for NotFoundHandler {
    fn handle(&self, req: &Request) -> Result<Option<Response>, HandlerError> {
        let body = self.templates.render(
            NOT_FOUND_TEMPLATE,
            &json!({ "title": self.title, "path": req.path }),
        )?;
        Ok(Some(ResponseBuilder::new(StatusCode::NotFound).body(body).build()))
    }
}
