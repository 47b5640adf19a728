use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::InvocationError;

pub const DEFAULT_REGION: &str = "eu-west-2";
pub const SPIN_HTTP_METHOD: &str = "GET";

/// One warmable function and how many simultaneous invocations to issue.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TargetDescriptor {
    pub name: String,
    pub path: String,
    pub region: String,
    pub count: usize,
}

/// Identity payload returned by a warmed function's spin endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SpinResult {
    pub ok: bool,
    pub version: String,
    pub id: String,
    pub born: DateTime<Utc>,
}

/// The subset of an API Gateway proxy request the warmer sends and the spin
/// handler reads.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ApiGatewayProxyRequest {
    #[serde(default)]
    pub path: String,
    #[serde(rename = "httpMethod", default)]
    pub http_method: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
}

impl ApiGatewayProxyRequest {
    pub fn spin(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            http_method: SPIN_HTTP_METHOD.to_string(),
            body: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ApiGatewayProxyResponse {
    #[serde(rename = "statusCode")]
    pub status_code: u16,
    #[serde(default)]
    pub headers: Value,
    #[serde(default)]
    pub body: String,
}

/// Result of exactly one launched invocation.
///
/// Either `responder_id` or `error` is set, never both.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvocationOutcome {
    pub target: Arc<TargetDescriptor>,
    pub responder_id: Option<String>,
    pub booted_at: Option<DateTime<Utc>>,
    pub version: Option<String>,
    pub latency: Duration,
    pub error: Option<InvocationError>,
}

impl InvocationOutcome {
    pub fn responded(target: Arc<TargetDescriptor>, spin: SpinResult, latency: Duration) -> Self {
        Self {
            target,
            responder_id: Some(spin.id),
            booted_at: Some(spin.born),
            version: Some(spin.version),
            latency,
            error: None,
        }
    }

    pub fn failed(target: Arc<TargetDescriptor>, error: InvocationError, latency: Duration) -> Self {
        Self {
            target,
            responder_id: None,
            booted_at: None,
            version: None,
            latency,
            error: Some(error),
        }
    }
}

/// Everything learned about one target name over a single run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetStatistics {
    pub name: String,
    pub path: String,
    pub region: String,
    pub requested_concurrency: usize,
    pub achieved_concurrency: usize,
    pub responder_ids: BTreeSet<String>,
    pub failures: Vec<InvocationError>,
    pub latencies: Vec<Duration>,
}

impl TargetStatistics {
    pub fn mean_latency(&self) -> Option<Duration> {
        if self.latencies.is_empty() {
            return None;
        }
        let total: Duration = self.latencies.iter().sum();
        let samples = u32::try_from(self.latencies.len()).unwrap_or(u32::MAX);
        Some(total / samples)
    }

    pub fn max_latency(&self) -> Option<Duration> {
        self.latencies.iter().max().copied()
    }

    pub fn report(&self) -> TargetReport {
        TargetReport {
            name: self.name.clone(),
            path: self.path.clone(),
            region: self.region.clone(),
            requested_concurrency: self.requested_concurrency,
            achieved_concurrency: self.achieved_concurrency,
            distinct_responders: self.responder_ids.len(),
            failure_count: self.failures.len(),
            mean_latency_ms: self.mean_latency().map(duration_ms),
            max_latency_ms: self.max_latency().map(duration_ms),
        }
    }
}

/// Reporting record emitted once per target.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TargetReport {
    pub name: String,
    pub path: String,
    pub region: String,
    pub requested_concurrency: usize,
    pub achieved_concurrency: usize,
    /// Distinct responder ids before capping at the requested concurrency;
    /// larger than `achieved_concurrency` only when same-named targets merge.
    pub distinct_responders: usize,
    pub failure_count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mean_latency_ms: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_latency_ms: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct WarmReport {
    pub total_invocations: usize,
    pub targets: Vec<TargetReport>,
}

pub fn duration_ms(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}
