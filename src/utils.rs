//! Shared utility functions used across the application

use std::error::Error;
use std::io::Read;

use crate::config::AppConfig;

/// Raw HTTP response; non-2xx statuses are returned, not raised
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Blocking GET transport used by every network-facing operation
pub trait Fetcher {
    fn get(&self, url: &str) -> Result<HttpResponse, Box<dyn Error>>;
}

/// `ureq`-backed fetcher sharing one agent (connection pool, timeout, user agent)
pub struct UreqFetcher {
    agent: ureq::Agent,
}

impl UreqFetcher {
    pub fn new(config: &AppConfig) -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout(config.timeout())
            .user_agent(&config.user_agent)
            .build();
        Self { agent }
    }
}

impl Fetcher for UreqFetcher {
    fn get(&self, url: &str) -> Result<HttpResponse, Box<dyn Error>> {
        match self.agent.get(url).call() {
            Ok(resp) => read_response(resp),
            Err(ureq::Error::Status(_, resp)) => read_response(resp),
            Err(e) => Err(e.into()),
        }
    }
}

fn read_response(resp: ureq::Response) -> Result<HttpResponse, Box<dyn Error>> {
    let status = resp.status();
    let mut body = Vec::new();
    resp.into_reader().read_to_end(&mut body)?;
    Ok(HttpResponse { status, body })
}

/// In-memory fetcher for tests: fixed responses by URL, everything else fails to connect
#[cfg(test)]
#[derive(Default)]
pub(crate) struct MemoryFetcher {
    routes: std::collections::HashMap<String, HttpResponse>,
    requests: std::cell::RefCell<Vec<String>>,
}

#[cfg(test)]
impl MemoryFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(self, url: &str, body: impl Into<Vec<u8>>) -> Self {
        self.with_status(url, 200, body)
    }

    pub fn with_status(mut self, url: &str, status: u16, body: impl Into<Vec<u8>>) -> Self {
        self.routes.insert(
            url.to_string(),
            HttpResponse { status, body: body.into() },
        );
        self
    }

    pub fn requests(&self) -> Vec<String> {
        self.requests.borrow().clone()
    }
}

#[cfg(test)]
impl Fetcher for MemoryFetcher {
    fn get(&self, url: &str) -> Result<HttpResponse, Box<dyn Error>> {
        self.requests.borrow_mut().push(url.to_string());
        self.routes
            .get(url)
            .cloned()
            .ok_or_else(|| format!("connection refused: {}", url).into())
    }
}
