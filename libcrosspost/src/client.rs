//! High-level client: one call per operation
//!
//! Each CLI invocation builds at most one post request and performs one
//! outbound call; the auxiliary operations (status polling, history,
//! analytics, profiles) are equally thin wrappers over the transport.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

use crate::config::Config;
use crate::error::{Result, TransportError};
use crate::outcome::{classify, PlatformResult, PostOutcome};
use crate::platform::Platform;
use crate::request::{PostRequest, WireField};
use crate::transport::{HttpTransport, Method, Payload, Transport};

pub struct CrosspostClient {
    transport: Arc<dyn Transport>,
}

/// Bounds for the sequential status-polling loop
#[derive(Debug, Clone, Copy)]
pub struct PollOptions {
    pub max_attempts: u32,
    pub delay: Duration,
}

impl Default for PollOptions {
    fn default() -> Self {
        Self {
            max_attempts: 10,
            delay: Duration::from_secs(5),
        }
    }
}

/// Terminal result of a polling loop
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum PollOutcome {
    Completed {
        results: BTreeMap<Platform, PlatformResult>,
    },
    Failed {
        error: String,
    },
    /// Attempts ran out before a terminal state was reported
    Exhausted {
        last_status: String,
    },
}

/// One entry in the upstream post history
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub post_id: String,
    pub content_type: String,
    pub platforms: Vec<String>,
    pub created_at: String,
    pub status: String,
}

/// Per-platform engagement counters for one post
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyticsReport {
    pub post_id: String,
    pub metrics: BTreeMap<String, PlatformMetrics>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PlatformMetrics {
    #[serde(default)]
    pub impressions: u64,
    #[serde(default)]
    pub likes: u64,
    #[serde(default)]
    pub shares: u64,
    #[serde(default)]
    pub comments: u64,
}

/// A connected profile on the upstream account
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Profile {
    pub id: String,
    pub title: String,
}

impl CrosspostClient {
    /// Build a client over the real HTTP transport
    pub fn new(api_key: &str, config: &Config) -> Result<Self> {
        let transport = HttpTransport::new(api_key, &config.api.base_url)?;
        Ok(Self {
            transport: Arc::new(transport),
        })
    }

    /// Build a client over any transport (used by tests)
    pub fn with_transport(transport: Arc<dyn Transport>) -> Self {
        Self { transport }
    }

    /// Send one built post request and classify the response.
    ///
    /// Requests without local files go out as JSON; anything carrying a
    /// file becomes a multipart field set.
    pub async fn post(&self, request: PostRequest) -> Result<PostOutcome> {
        let fields = request.wire_fields();
        info!(
            content_type = %request.content_type(),
            platforms = %request
                .universal()
                .platforms
                .iter()
                .map(|p| p.as_str())
                .collect::<Vec<_>>()
                .join(","),
            "sending post"
        );

        let payload = if request.has_local_files() {
            Payload::Multipart(fields)
        } else {
            let mut body = serde_json::Map::new();
            for field in fields {
                if let WireField::Text { name, value } = field {
                    body.insert(name, serde_json::Value::String(value));
                }
            }
            Payload::Json(serde_json::Value::Object(body))
        };

        let body = self.transport.request(Method::Post, "posts", payload).await?;
        classify(&body)
    }

    /// Poll an async request until it reaches a terminal state, attempts
    /// run out, or the process is interrupted. Blocks synchronously
    /// between attempts.
    pub async fn poll_status(&self, request_id: &str, opts: PollOptions) -> Result<PollOutcome> {
        let path = format!("posts/{}/status", request_id);
        let mut last_status = String::from("unknown");

        for attempt in 1..=opts.max_attempts {
            let body = self
                .transport
                .request(Method::Get, &path, Payload::Empty)
                .await?;

            let status = body
                .get("status")
                .and_then(|v| v.as_str())
                .ok_or_else(|| {
                    TransportError::MalformedResponse("status report missing status".to_string())
                })?;
            debug!(request_id, attempt, status, "poll");

            match status {
                "completed" => {
                    let outcome = classify(&body)?;
                    return match outcome {
                        PostOutcome::Immediate { results } => {
                            Ok(PollOutcome::Completed { results })
                        }
                        _ => Err(TransportError::MalformedResponse(
                            "completed status without per-platform results".to_string(),
                        )
                        .into()),
                    };
                }
                "failed" => {
                    let error = body
                        .get("error")
                        .and_then(|v| v.as_str())
                        .unwrap_or("delivery failed")
                        .to_string();
                    return Ok(PollOutcome::Failed { error });
                }
                other => {
                    last_status = other.to_string();
                    if attempt < opts.max_attempts {
                        tokio::time::sleep(opts.delay).await;
                    }
                }
            }
        }

        Ok(PollOutcome::Exhausted { last_status })
    }

    /// Recent posts, newest first
    pub async fn history(&self, limit: u32) -> Result<Vec<HistoryEntry>> {
        let body = self
            .transport
            .request(Method::Get, &format!("history?limit={}", limit), Payload::Empty)
            .await?;
        let posts = body
            .get("posts")
            .cloned()
            .ok_or_else(|| TransportError::MalformedResponse("history missing posts".to_string()))?;
        serde_json::from_value(posts)
            .map_err(|e| TransportError::MalformedResponse(e.to_string()).into())
    }

    /// Engagement counters for one published post
    pub async fn analytics(&self, post_id: &str) -> Result<AnalyticsReport> {
        let body = self
            .transport
            .request(
                Method::Get,
                &format!("analytics/{}", post_id),
                Payload::Empty,
            )
            .await?;
        serde_json::from_value(body)
            .map_err(|e| TransportError::MalformedResponse(e.to_string()).into())
    }

    /// Connected profiles on the account
    pub async fn list_profiles(&self) -> Result<Vec<Profile>> {
        let body = self
            .transport
            .request(Method::Get, "profiles", Payload::Empty)
            .await?;
        let profiles = body.get("profiles").cloned().ok_or_else(|| {
            TransportError::MalformedResponse("profile list missing profiles".to_string())
        })?;
        serde_json::from_value(profiles)
            .map_err(|e| TransportError::MalformedResponse(e.to_string()).into())
    }

    /// Create a new profile with the given title
    pub async fn create_profile(&self, title: &str) -> Result<Profile> {
        let body = self
            .transport
            .request(
                Method::Post,
                "profiles",
                Payload::Json(serde_json::json!({ "title": title })),
            )
            .await?;
        serde_json::from_value(body)
            .map_err(|e| TransportError::MalformedResponse(e.to_string()).into())
    }

    /// Delete a profile by id
    pub async fn delete_profile(&self, profile_id: &str) -> Result<()> {
        self.transport
            .request(
                Method::Delete,
                &format!("profiles/{}", profile_id),
                Payload::Empty,
            )
            .await?;
        Ok(())
    }
}
