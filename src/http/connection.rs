use std::io::BufReader;
use std::net::{SocketAddr, TcpStream};

use anyhow::Context;

use crate::app::{App, Reply};
use crate::http::parser::read_request;
use crate::http::request::Request;

/// One accepted socket, served for exactly one request.
pub struct Connection<'a> {
    stream: TcpStream,
    peer: SocketAddr,
    app: &'a App,
    state: ConnectionState,
}

pub enum ConnectionState {
    Reading,
    Processing(Request),
    Writing(Request, Reply),
    Closed,
}

impl<'a> Connection<'a> {
    pub fn new(stream: TcpStream, peer: SocketAddr, app: &'a App) -> Self {
        Self {
            stream,
            peer,
            app,
            state: ConnectionState::Reading,
        }
    }

    /// Drives the connection until it is closed.
    ///
    /// A request that cannot be parsed closes the connection without any
    /// response. The socket is dropped, and so closed, on return.
    pub fn run(mut self) -> anyhow::Result<()> {
        loop {
            match std::mem::replace(&mut self.state, ConnectionState::Closed) {
                ConnectionState::Reading => {
                    let mut reader = BufReader::new(&self.stream);
                    match read_request(&mut reader, self.peer.ip()) {
                        Ok(req) => {
                            tracing::debug!(peer = %self.peer, method = req.method.as_str(), path = %req.path, "request parsed");
                            self.state = ConnectionState::Processing(req);
                        }
                        Err(e) => {
                            tracing::debug!(peer = %self.peer, error = %e, "malformed request, closing");
                            self.state = ConnectionState::Closed;
                        }
                    }
                }

                ConnectionState::Processing(req) => {
                    let reply = self.app.respond(&req);
                    self.state = ConnectionState::Writing(req, reply);
                }

                ConnectionState::Writing(req, reply) => {
                    let writer = self.app.writer();
                    match &reply {
                        Reply::Page(response) => {
                            writer
                                .write(&mut self.stream, response, &req)
                                .context("writing response")?;
                            tracing::info!(
                                peer = %self.peer,
                                method = req.method.as_str(),
                                path = %req.path,
                                status = response.status.as_u16(),
                                "request served"
                            );
                        }
                        Reply::UnsupportedMethod(method) => {
                            writer
                                .write_unsupported_method(&mut self.stream, method)
                                .context("writing unsupported method line")?;
                            tracing::info!(peer = %self.peer, method = method.as_str(), "unsupported method");
                        }
                    }
                    self.state = ConnectionState::Closed;
                }

                ConnectionState::Closed => break,
            }
        }

        Ok(())
    }
}
