use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde_json::Value;

use contact_relay::config::{Config, SmtpConfig, SmtpTls};
use contact_relay::cors::DEFAULT_ALLOWED_ORIGINS;
use contact_relay::db::SubmissionStore;
use contact_relay::email::Notifier;
use contact_relay::error::{SendError, StoreError};
use contact_relay::models::Submission;

/// How a fake side effect should behave.
#[derive(Debug, Clone, Copy, PartialEq)]
#[allow(dead_code)]
pub enum Behavior {
    Succeed,
    Fail,
    Hang,
}

/// In-memory store that records the name of every submission it was asked to save.
pub struct RecordingStore {
    behavior: Behavior,
    pub saved: Mutex<Vec<String>>,
}

impl RecordingStore {
    pub fn new(behavior: Behavior) -> Arc<Self> {
        Arc::new(Self {
            behavior,
            saved: Mutex::new(Vec::new()),
        })
    }

    pub fn calls(&self) -> usize {
        self.saved.lock().unwrap().len()
    }
}

#[async_trait]
impl SubmissionStore for RecordingStore {
    async fn save(&self, submission: &Submission) -> Result<(), StoreError> {
        self.saved.lock().unwrap().push(submission.name().to_string());
        match self.behavior {
            Behavior::Succeed => Ok(()),
            Behavior::Fail => Err(StoreError::Connect("timed out after 10s".to_string())),
            Behavior::Hang => {
                tokio::time::sleep(Duration::from_secs(3600)).await;
                Ok(())
            }
        }
    }
}

/// In-memory notifier that records the subject of every message it was asked to send.
pub struct RecordingNotifier {
    behavior: Behavior,
    pub sent: Mutex<Vec<String>>,
}

impl RecordingNotifier {
    pub fn new(behavior: Behavior) -> Arc<Self> {
        Arc::new(Self {
            behavior,
            sent: Mutex::new(Vec::new()),
        })
    }

    pub fn calls(&self) -> usize {
        self.sent.lock().unwrap().len()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn send(&self, submission: &Submission) -> Result<(), SendError> {
        self.sent.lock().unwrap().push(submission.subject().to_string());
        match self.behavior {
            Behavior::Succeed => Ok(()),
            Behavior::Fail => Err(SendError::Transport("connection refused".to_string())),
            Behavior::Hang => {
                tokio::time::sleep(Duration::from_secs(3600)).await;
                Ok(())
            }
        }
    }
}

/// A running server wired to recording fakes.
pub struct TestApp {
    pub addr: SocketAddr,
    pub client: Client,
    pub store: Arc<RecordingStore>,
    pub notifier: Arc<RecordingNotifier>,
}

impl TestApp {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    /// POST a JSON body to the contact route, return (body, status).
    pub async fn submit_json(&self, data: &Value) -> (Value, StatusCode) {
        let resp = self
            .client
            .post(self.url("/api/contact"))
            .json(data)
            .send()
            .await
            .expect("submit json failed");
        let status = resp.status();
        let body: Value = resp.json().await.unwrap_or(Value::Null);
        (body, status)
    }
}

pub fn test_config() -> Config {
    Config {
        database: None,
        smtp: SmtpConfig {
            host: "localhost".to_string(),
            port: 1025,
            tls: SmtpTls::None,
            user: None,
            pass: None,
            from: "robot@example.com".to_string(),
            to: "inbox@example.com".to_string(),
            site_name: "Test".to_string(),
            timeout: Duration::from_secs(8),
        },
        allowed_origins: DEFAULT_ALLOWED_ORIGINS.iter().map(|s| s.to_string()).collect(),
        host: "127.0.0.1".parse().unwrap(),
        port: 0,
        max_body_size: 65_536,
        log_level: "warn".to_string(),
    }
}

pub async fn spawn_app(store: Behavior, notifier: Behavior) -> TestApp {
    let notifier = RecordingNotifier::new(notifier);
    spawn_app_with(RecordingStore::new(store), notifier.clone(), notifier).await
}

/// Spawn with a custom notifier in front of the recorder, e.g. a timeout wrapper.
pub async fn spawn_app_with(
    store: Arc<RecordingStore>,
    notifier: Arc<RecordingNotifier>,
    front: Arc<dyn Notifier>,
) -> TestApp {
    let app = contact_relay::build_app(&test_config(), store.clone(), front);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind to random port");
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("Server failed");
    });

    TestApp {
        addr,
        client: Client::new(),
        store,
        notifier,
    }
}
