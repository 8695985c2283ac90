//! Upstream response classification
//!
//! The upstream distinguishes its three response shapes only by which
//! fields are present. That implicit branching is made explicit here: one
//! classification function produces a three-variant union, so downstream
//! consumers handle all three exhaustively instead of probing for fields.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::str::FromStr;

use crate::error::{Result, TransportError};
use crate::platform::Platform;

/// Classified upstream response, exactly one of three shapes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum PostOutcome {
    /// Accepted for a fixed future instant; no per-platform results yet
    Scheduled {
        post_id: String,
        scheduled_for: DateTime<Utc>,
    },
    /// Delivered now, with one result per targeted platform
    Immediate {
        results: BTreeMap<Platform, PlatformResult>,
    },
    /// Accepted for asynchronous delivery; poll with the request id
    AsyncQueued { request_id: String },
}

/// Delivery result for one platform inside an immediate outcome
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum PlatformResult {
    Success { post_id: String, url: String },
    Failure { error: String },
}

impl PostOutcome {
    /// Whether the call as a whole counts as successful. Partial failure
    /// inside an immediate outcome is still a success when at least one
    /// platform went through.
    pub fn succeeded(&self) -> bool {
        match self {
            PostOutcome::Scheduled { .. } | PostOutcome::AsyncQueued { .. } => true,
            PostOutcome::Immediate { results } => results
                .values()
                .any(|r| matches!(r, PlatformResult::Success { .. })),
        }
    }
}

/// Classify a raw upstream response body into a [`PostOutcome`].
///
/// A body matching none of the three shapes is a malformed-response
/// transport error, not an input or upstream error: the request went out
/// and something came back, but not in a form this client understands.
pub fn classify(body: &serde_json::Value) -> Result<PostOutcome> {
    if let (Some(post_id), Some(scheduled_for)) = (
        body.get("post_id").and_then(|v| v.as_str()),
        body.get("scheduled_for").and_then(|v| v.as_str()),
    ) {
        let scheduled_for = DateTime::parse_from_rfc3339(scheduled_for)
            .map_err(|e| {
                TransportError::MalformedResponse(format!("bad scheduled_for timestamp: {}", e))
            })?
            .with_timezone(&Utc);
        return Ok(PostOutcome::Scheduled {
            post_id: post_id.to_string(),
            scheduled_for,
        });
    }

    if let Some(raw_results) = body.get("results").and_then(|v| v.as_object()) {
        let mut results = BTreeMap::new();
        for (name, entry) in raw_results {
            let platform = Platform::from_str(name).map_err(|_| {
                TransportError::MalformedResponse(format!(
                    "unknown platform '{}' in results",
                    name
                ))
            })?;
            results.insert(platform, classify_platform_entry(name, entry)?);
        }
        return Ok(PostOutcome::Immediate { results });
    }

    if let Some(request_id) = body.get("request_id").and_then(|v| v.as_str()) {
        return Ok(PostOutcome::AsyncQueued {
            request_id: request_id.to_string(),
        });
    }

    Err(TransportError::MalformedResponse(
        "response matches none of the scheduled, immediate, or async shapes".to_string(),
    )
    .into())
}

fn classify_platform_entry(name: &str, entry: &serde_json::Value) -> Result<PlatformResult> {
    let success = entry.get("success").and_then(|v| v.as_bool()).ok_or_else(|| {
        TransportError::MalformedResponse(format!("missing success flag for {}", name))
    })?;

    if success {
        let post_id = entry
            .get("post_id")
            .and_then(|v| v.as_str())
            .ok_or_else(|| {
                TransportError::MalformedResponse(format!("missing post_id for {}", name))
            })?;
        let url = entry.get("url").and_then(|v| v.as_str()).ok_or_else(|| {
            TransportError::MalformedResponse(format!("missing url for {}", name))
        })?;
        Ok(PlatformResult::Success {
            post_id: post_id.to_string(),
            url: url.to_string(),
        })
    } else {
        let error = entry
            .get("error")
            .and_then(|v| v.as_str())
            .unwrap_or("unknown platform error");
        Ok(PlatformResult::Failure {
            error: error.to_string(),
        })
    }
}
