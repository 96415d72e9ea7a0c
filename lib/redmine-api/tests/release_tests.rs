//! Every response body is released exactly once, whatever the outcome.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use assert2::{check, let_assert};
use bytes::Bytes;
use redmine_api::{HttpClient, Request, RequestParams, Response, Result, Transport};
use serde::Deserialize;

/// Response body that counts how often it is dropped.
struct TrackedBody {
    body: &'static [u8],
    drops: Arc<AtomicUsize>,
}

impl AsRef<[u8]> for TrackedBody {
    fn as_ref(&self) -> &[u8] {
        self.body
    }
}

impl Drop for TrackedBody {
    fn drop(&mut self) {
        self.drops.fetch_add(1, Ordering::SeqCst);
    }
}

/// Answers every request with a fixed status and body.
struct Simulated {
    status: u16,
    body: &'static [u8],
    created: Arc<AtomicUsize>,
    drops: Arc<AtomicUsize>,
}

impl Simulated {
    fn new(status: u16, body: &'static str) -> Self {
        Self {
            status,
            body: body.as_bytes(),
            created: Arc::default(),
            drops: Arc::default(),
        }
    }
}

impl HttpClient for Simulated {
    async fn execute(&self, _request: Request<Bytes>) -> Result<Response<Bytes>> {
        self.created.fetch_add(1, Ordering::SeqCst);
        let body = Bytes::from_owner(TrackedBody {
            body: self.body,
            drops: Arc::clone(&self.drops),
        });
        Ok(Response::new(self.status, HashMap::new(), body))
    }
}

#[derive(Debug, Deserialize)]
struct User {
    login: String,
}

async fn fetch(status: u16, body: &'static str) -> (Result<User>, usize, usize) {
    let client = Simulated::new(status, body);
    let created = Arc::clone(&client.created);
    let drops = Arc::clone(&client.drops);
    let transport = Transport::builder("http://redmine.local")
        .http_client(client)
        .build()
        .expect("transport");

    let result = transport
        .get_object::<User>("users/current.json", "user", &RequestParams::new())
        .await;
    (
        result,
        created.load(Ordering::SeqCst),
        drops.load(Ordering::SeqCst),
    )
}

#[tokio::test]
async fn test_released_after_success() {
    let (result, created, drops) = fetch(200, r#"{"user":{"login":"admin"}}"#).await;
    let_assert!(Ok(user) = result);
    check!(user.login == "admin");
    check!(created == 1);
    check!(drops == 1);
}

#[tokio::test]
async fn test_released_after_status_failure() {
    let (result, created, drops) = fetch(404, "gone").await;
    let_assert!(Err(err) = result);
    check!(err.is_not_found());
    check!(created == 1);
    check!(drops == 1);
}

#[tokio::test]
async fn test_released_after_handler_failure() {
    let (result, created, drops) = fetch(200, "not json").await;
    let_assert!(Err(err) = result);
    check!(err.is_format());
    check!(created == 1);
    check!(drops == 1);
}
