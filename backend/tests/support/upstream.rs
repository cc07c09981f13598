//! In-process stand-in for the membership REST API.
//!
//! Each test registers only the routes it needs; anything else answers 404,
//! exactly as the real service does for unknown resources.

use std::io;
use std::sync::{Arc, Mutex};

use actix_web::dev::ServerHandle;
use actix_web::{App, HttpServer, web};
use serde_json::Value;
use url::Url;

/// A running fake upstream bound to an ephemeral loopback port.
pub struct FakeUpstream {
    base_url: Url,
    handle: ServerHandle,
}

impl FakeUpstream {
    /// Start serving `configure` on `127.0.0.1:0`.
    pub fn start<F>(configure: F) -> io::Result<Self>
    where
        F: Fn(&mut web::ServiceConfig) + Send + Clone + 'static,
    {
        let server = HttpServer::new(move || App::new().configure(configure.clone()))
            .workers(1)
            .bind(("127.0.0.1", 0))?;
        let addr = server
            .addrs()
            .first()
            .copied()
            .ok_or_else(|| io::Error::other("fake upstream did not bind"))?;
        let server = server.run();
        let handle = server.handle();
        actix_web::rt::spawn(server);
        let base_url = Url::parse(&format!("http://{addr}/")).map_err(io::Error::other)?;
        Ok(Self { base_url, handle })
    }

    pub fn base_url(&self) -> Url {
        self.base_url.clone()
    }

    pub fn upload_url(&self) -> Url {
        self.base_url
            .join("api/uploadToDrive")
            .unwrap_or_else(|_| self.base_url.clone())
    }

    /// Stop accepting connections and wait for the workers to exit.
    pub async fn stop(&self) {
        self.handle.stop(true).await;
    }
}

/// JSON bodies received by a fake route, in arrival order.
#[derive(Clone, Default)]
pub struct Received(Arc<Mutex<Vec<Value>>>);

impl Received {
    pub fn push(&self, body: Value) {
        if let Ok(mut bodies) = self.0.lock() {
            bodies.push(body);
        }
    }

    pub fn all(&self) -> Vec<Value> {
        self.0.lock().map(|bodies| bodies.clone()).unwrap_or_default()
    }
}
