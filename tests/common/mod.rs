#![allow(dead_code)]

use std::io::{Read, Write};
use std::net::{SocketAddr, TcpStream};
use std::thread;
use std::time::{Duration, Instant};

/// Polls `cond` until it holds or `timeout` passes.
pub fn wait_until(timeout: Duration, mut cond: impl FnMut() -> bool) -> bool {
    let deadline = Instant::now() + timeout;
    while Instant::now() < deadline {
        if cond() {
            return true;
        }
        thread::sleep(Duration::from_millis(10));
    }
    cond()
}

/// A raw HTTP exchange as the client saw it.
#[derive(Debug)]
pub struct RawResponse {
    pub raw: Vec<u8>,
}

impl RawResponse {
    fn split(&self) -> (String, Vec<u8>) {
        let pos = self
            .raw
            .windows(4)
            .position(|w| w == b"\r\n\r\n")
            .map(|p| p + 4)
            .unwrap_or(self.raw.len());
        (
            String::from_utf8_lossy(&self.raw[..pos]).into_owned(),
            self.raw[pos..].to_vec(),
        )
    }

    pub fn status(&self) -> u16 {
        let (head, _) = self.split();
        head.split(' ').nth(1).unwrap().parse().unwrap()
    }

    pub fn headers(&self) -> Vec<(String, String)> {
        let (head, _) = self.split();
        head.lines()
            .skip(1)
            .filter_map(|line| line.split_once(": "))
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    pub fn header(&self, name: &str) -> Option<String> {
        self.headers()
            .into_iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v)
    }

    pub fn set_cookies(&self) -> Vec<String> {
        self.headers()
            .into_iter()
            .filter(|(k, _)| k == "Set-Cookie")
            .map(|(_, v)| v)
            .collect()
    }

    /// Value of a cookie set by this response.
    pub fn cookie(&self, name: &str) -> Option<String> {
        self.set_cookies().into_iter().find_map(|c| {
            let pair = c.split(';').next()?;
            let (k, v) = pair.split_once('=')?;
            (k == name).then(|| v.to_string())
        })
    }

    pub fn body(&self) -> Vec<u8> {
        self.split().1
    }

    pub fn body_text(&self) -> String {
        String::from_utf8_lossy(&self.body()).into_owned()
    }
}

/// Sends `request` verbatim and reads until the server closes the socket.
pub fn exchange(addr: SocketAddr, request: &str) -> RawResponse {
    let mut stream = TcpStream::connect(addr).unwrap();
    stream.set_read_timeout(Some(Duration::from_secs(10))).unwrap();
    stream.write_all(request.as_bytes()).unwrap();
    let mut raw = Vec::new();
    // a reset after a dropped request still counts as "nothing sent"
    let _ = stream.read_to_end(&mut raw);
    RawResponse { raw }
}

pub fn get(addr: SocketAddr, target: &str, cookies: Option<&str>) -> RawResponse {
    request(addr, "GET", target, cookies)
}

pub fn request(addr: SocketAddr, method: &str, target: &str, cookies: Option<&str>) -> RawResponse {
    let mut req = format!("{method} {target} HTTP/1.1\r\nHost: localhost:{}\r\n", addr.port());
    if let Some(cookies) = cookies {
        req.push_str(&format!("Cookie: {cookies}\r\n"));
    }
    req.push_str("\r\n");
    exchange(addr, &req)
}
