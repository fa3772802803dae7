//! HTTP protocol implementation.
//!
//! A deliberately small HTTP/1.1 subset: one request per accepted socket,
//! GET and HEAD only, no chunked bodies.
//!
//! # Architecture
//!
//! - **`connection`**: Serves one socket through the request-response state machine
//! - **`parser`**: Reads a request from a byte stream
//! - **`request`**: HTTP request representation
//! - **`response`**: HTTP response representation with builder pattern
//! - **`writer`**: Serializes and writes HTTP responses to the client
//! - **`mime`**: MIME type detection based on file extensions
//!
//! # Connection State Machine
//!
//! ```text
//!        ┌─────────────┐
//!        │   Reading   │ ← Parse the request; malformed → Closed
//!        └──────┬──────┘
//!               │ Request parsed
//!               ▼
//!        ┌──────────────────┐
//!        │   Processing     │ ← Check session, route, run handler
//!        └──────┬───────────┘
//!               │ Reply ready
//!               ▼
//!        ┌──────────────────┐
//!        │    Writing       │ ← Send response (or unsupported-method line)
//!        └──────┬───────────┘
//!               ▼
//!            Closed
//! ```

pub mod connection;
pub mod mime;
pub mod parser;
pub mod request;
pub mod response;
pub mod writer;
