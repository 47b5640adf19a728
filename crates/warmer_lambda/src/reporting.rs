use chrono::Utc;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;
use warmer_core::contract::{duration_ms, InvocationOutcome, TargetStatistics};

/// One JSON object per event on stdout, filtered by `RUST_LOG` (default `info`).
pub fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .json()
        .flatten_event(true)
        .with_current_span(false)
        .with_env_filter(filter)
        .with_target(false)
        .with_ansi(false)
        .try_init();
}

pub fn log_outcome(outcome: &InvocationOutcome) {
    let target = &outcome.target;
    let time_taken_ms = duration_ms(outcome.latency);

    if let Some(failure) = &outcome.error {
        error!(
            region = %target.region,
            name = %target.name,
            path = %target.path,
            target_concurrency = target.count,
            time_taken_ms,
            error_kind = failure.kind(),
            error = %failure,
            "error running function"
        );
        return;
    }

    let lambda_age_minutes = outcome
        .booted_at
        .map(|born| (Utc::now() - born).num_seconds() as f64 / 60.0);
    info!(
        region = %target.region,
        name = %target.name,
        path = %target.path,
        target_concurrency = target.count,
        time_taken_ms,
        lambda_id = outcome.responder_id.as_deref().unwrap_or_default(),
        lambda_born = %outcome
            .booted_at
            .map(|born| born.to_rfc3339())
            .unwrap_or_default(),
        lambda_age_minutes = lambda_age_minutes.unwrap_or_default(),
        lambda_version = outcome.version.as_deref().unwrap_or_default(),
        "details"
    );
}

pub fn log_statistics(statistics: &TargetStatistics) {
    info!(
        region = %statistics.region,
        name = %statistics.name,
        path = %statistics.path,
        target_concurrency = statistics.requested_concurrency,
        actual_concurrency = statistics.achieved_concurrency,
        distinct_responders = statistics.responder_ids.len(),
        failure_count = statistics.failures.len(),
        "execution complete"
    );
}
