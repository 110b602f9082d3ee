//! Fakes shared by unit tests.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::net::{Fetcher, NetworkError, Request, Response};
use crate::worker::FILES_TO_CACHE;

pub const ORIGIN: &str = "https://bom.test/";

struct NetworkState {
    online: bool,
    routes: HashMap<String, u16>,
    failing: HashSet<String>,
    calls: usize,
}

/// In-memory network. Responses echo the requested path as their body;
/// unknown URLs answer 404.
#[derive(Clone)]
pub struct FakeNetwork {
    state: Arc<Mutex<NetworkState>>,
}

impl Default for FakeNetwork {
    fn default() -> Self {
        Self {
            state: Arc::new(Mutex::new(NetworkState {
                online: true,
                routes: HashMap::new(),
                failing: HashSet::new(),
                calls: 0,
            })),
        }
    }
}

impl FakeNetwork {
    pub fn serving_assets() -> Self {
        let network = Self::default();
        for path in FILES_TO_CACHE {
            network.set_status(&format!("https://bom.test{}", path), 200);
        }
        network
    }

    pub fn set_status(&self, url: &str, status: u16) {
        self.state.lock().unwrap().routes.insert(url.to_string(), status);
    }

    /// Make a single URL unreachable.
    pub fn fail(&self, url: &str) {
        self.state.lock().unwrap().failing.insert(url.to_string());
    }

    pub fn go_offline(&self) {
        self.state.lock().unwrap().online = false;
    }

    pub fn go_online(&self) {
        self.state.lock().unwrap().online = true;
    }

    pub fn calls(&self) -> usize {
        self.state.lock().unwrap().calls
    }
}

#[async_trait]
impl Fetcher for FakeNetwork {
    async fn fetch(&self, request: &Request) -> Result<Response, NetworkError> {
        let mut state = self.state.lock().unwrap();
        state.calls += 1;
        if !state.online || state.failing.contains(&request.url) {
            return Err(NetworkError::Unreachable(request.url.clone()));
        }

        let path = request.url.trim_start_matches("https://bom.test");
        let response = match state.routes.get(&request.url) {
            Some(&status) => Response::new(request.url.as_str(), status, path),
            None => Response::new(request.url.as_str(), 404, "not found"),
        };
        Ok(response)
    }
}
