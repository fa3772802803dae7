//! webdesk - a small embedded web server for desktop applications
//!
//! Lets a browser on the local network log in and use a few pages backed
//! by the host application.

pub mod app;
pub mod config;
pub mod handlers;
pub mod http;
pub mod render;
pub mod repository;
pub mod router;
pub mod server;
pub mod session;
