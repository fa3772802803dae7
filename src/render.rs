//! Page rendering.
//!
//! Handlers only see the [`TemplateEngine`] trait; [`Templates`] is the
//! built-in engine with the pages compiled into the binary.

use minijinja::Environment;
use serde_json::Value;
use thiserror::Error;

pub const LOGIN_TEMPLATE: &str = "login.html";
pub const HOME_TEMPLATE: &str = "home.html";
pub const FOLDERS_TEMPLATE: &str = "folders.html";
pub const FOLDER_TEMPLATE: &str = "folder.html";
pub const NOT_FOUND_TEMPLATE: &str = "404.html";

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("unknown template {0:?}")]
    UnknownTemplate(String),
    #[error("template error: {0}")]
    Template(#[from] minijinja::Error),
}

/// Turns a template name and its variables into a response body.
pub trait TemplateEngine: Send + Sync {
    fn render(&self, template: &str, vars: &Value) -> Result<Vec<u8>, RenderError>;
}

pub struct Templates {
    env: Environment<'static>,
}

impl Templates {
    pub fn new() -> Result<Self, RenderError> {
        let mut env = Environment::new();
        env.add_template(LOGIN_TEMPLATE, include_str!("../templates/login.html"))?;
        env.add_template(HOME_TEMPLATE, include_str!("../templates/home.html"))?;
        env.add_template(FOLDERS_TEMPLATE, include_str!("../templates/folders.html"))?;
        env.add_template(FOLDER_TEMPLATE, include_str!("../templates/folder.html"))?;
        env.add_template(NOT_FOUND_TEMPLATE, include_str!("../templates/404.html"))?;
        Ok(Self { env })
    }
}

impl TemplateEngine for Templates {
    fn render(&self, template: &str, vars: &Value) -> Result<Vec<u8>, RenderError> {
        let tmpl = self.env.get_template(template).map_err(|e| match e.kind() {
            minijinja::ErrorKind::TemplateNotFound => RenderError::UnknownTemplate(template.to_string()),
            _ => RenderError::Template(e),
        })?;
        Ok(tmpl.render(vars)?.into_bytes())
    }
}
