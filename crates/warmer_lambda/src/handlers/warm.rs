use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::mpsc;
use tracing::{info, warn};
use warmer_core::aggregate::{target_reports, Aggregation};
use warmer_core::contract::{
    duration_ms, ApiGatewayProxyRequest, ApiGatewayProxyResponse, InvocationOutcome, SpinResult,
    TargetDescriptor, TargetStatistics, WarmReport,
};
use warmer_core::error::InvocationError;
use warmer_core::targets::total_invocations;

use crate::adapters::invoke::{FunctionInvoker, InvokeResponse};
use crate::error::WarmerError;
use crate::reporting::{log_outcome, log_statistics};

/// Outcomes of every launched invocation, plus how many to expect.
#[derive(Debug)]
pub struct Dispatch {
    pub total: usize,
    pub outcomes: mpsc::Receiver<InvocationOutcome>,
}

/// Performs one spin call against `target` and classifies the result.
pub async fn invoke_target(
    invoker: &dyn FunctionInvoker,
    target: Arc<TargetDescriptor>,
) -> InvocationOutcome {
    let payload = match serde_json::to_vec(&ApiGatewayProxyRequest::spin(target.path.clone())) {
        Ok(value) => value,
        Err(error) => {
            return InvocationOutcome::failed(
                target,
                InvocationError::transport(format!("failed to marshal api request: {error}")),
                Duration::ZERO,
            );
        }
    };

    let started_at = Instant::now();
    let response = invoker.invoke(&target, payload).await;
    let latency = started_at.elapsed();

    match response
        .map_err(|error| {
            InvocationError::transport(format!(
                "failed to invoke function '{}': {error}",
                target.name
            ))
        })
        .and_then(parse_spin_response)
    {
        Ok(spin) => InvocationOutcome::responded(target, spin, latency),
        Err(error) => InvocationOutcome::failed(target, error, latency),
    }
}

fn parse_spin_response(response: InvokeResponse) -> Result<SpinResult, InvocationError> {
    if let Some(function_error) = response.function_error {
        return Err(InvocationError::transport(format!(
            "function error '{function_error}': {}",
            String::from_utf8_lossy(&response.payload)
        )));
    }

    let envelope: ApiGatewayProxyResponse =
        serde_json::from_slice(&response.payload).map_err(|error| {
            InvocationError::transport(format!(
                "failed to unmarshal payload '{}': {error}",
                String::from_utf8_lossy(&response.payload)
            ))
        })?;

    if envelope.status_code != 200 {
        return Err(InvocationError::transport(format!(
            "unexpected HTTP response: {}",
            envelope.status_code
        )));
    }

    serde_json::from_str(&envelope.body).map_err(|error| {
        InvocationError::malformed(format!(
            "failed to parse spin body '{}': {error}",
            envelope.body
        ))
    })
}

/// Spawns `count` concurrent invocations per target onto one shared channel.
///
/// The channel holds every expected outcome, so no invocation task waits on
/// the consumer. Targets with a zero count contribute nothing. A total that
/// the channel cannot hold is rejected before anything is spawned.
pub fn dispatch(
    invoker: Arc<dyn FunctionInvoker>,
    targets: &[TargetDescriptor],
) -> Result<Dispatch, WarmerError> {
    let total = total_invocations(targets)?;
    let (sender, receiver) = mpsc::channel(total.max(1));

    for target in targets.iter().filter(|target| target.count > 0) {
        let target = Arc::new(target.clone());
        for _ in 0..target.count {
            let sender = sender.clone();
            let invoker = Arc::clone(&invoker);
            let target = Arc::clone(&target);
            tokio::spawn(async move {
                let outcome = invoke_target(invoker.as_ref(), target).await;
                if sender.send(outcome).await.is_err() {
                    warn!("outcome receiver dropped before delivery");
                }
            });
        }
    }

    Ok(Dispatch {
        total,
        outcomes: receiver,
    })
}

/// Waits for exactly `dispatch.total` outcomes and folds them per target.
pub async fn aggregate(dispatch: Dispatch) -> Result<BTreeMap<String, TargetStatistics>, WarmerError> {
    let Dispatch {
        total,
        mut outcomes,
    } = dispatch;

    let mut aggregation = Aggregation::new();
    while aggregation.recorded() < total {
        let Some(outcome) = outcomes.recv().await else {
            return Err(WarmerError::IncompleteRun {
                expected: total,
                received: aggregation.recorded(),
            });
        };
        log_outcome(&outcome);
        aggregation.record(outcome);
    }

    Ok(aggregation.finish())
}

pub async fn run_warm(
    invoker: Arc<dyn FunctionInvoker>,
    targets: &[TargetDescriptor],
) -> Result<WarmReport, WarmerError> {
    let started_at = Instant::now();
    let dispatch = dispatch(invoker, targets)?;
    let total_invocations = dispatch.total;
    info!(
        targets = targets.len(),
        total_invocations, "warm run dispatched"
    );

    let statistics = aggregate(dispatch).await?;
    for target in statistics.values() {
        log_statistics(target);
    }
    info!(
        total_invocations,
        duration_ms = duration_ms(started_at.elapsed()),
        "warm run complete"
    );

    Ok(WarmReport {
        total_invocations,
        targets: target_reports(&statistics),
    })
}
