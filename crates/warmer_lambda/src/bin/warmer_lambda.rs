use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use aws_config::timeout::TimeoutConfig;
use aws_sdk_lambda::config::Region;
use aws_sdk_lambda::types::InvocationType;
use lambda_runtime::{service_fn, Error, LambdaEvent};
use serde_json::Value;
use warmer_core::contract::{TargetDescriptor, WarmReport};
use warmer_core::targets::resolve_targets;
use warmer_lambda::adapters::invoke::{FunctionInvoker, InvokeResponse};
use warmer_lambda::handlers::warm::run_warm;
use warmer_lambda::reporting::init_logging;

const INVOKE_TIMEOUT_VAR: &str = "WARMER_INVOKE_TIMEOUT_SECS";

/// One SDK client per region named by the resolved targets.
struct AwsLambdaInvoker {
    clients: BTreeMap<String, aws_sdk_lambda::Client>,
}

impl AwsLambdaInvoker {
    async fn for_targets(
        targets: &[TargetDescriptor],
        invoke_timeout: Option<Duration>,
    ) -> Self {
        let shared = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;

        let mut clients = BTreeMap::new();
        for target in targets {
            if clients.contains_key(&target.region) {
                continue;
            }
            let mut builder = aws_sdk_lambda::config::Builder::from(&shared)
                .region(Region::new(target.region.clone()));
            if let Some(timeout) = invoke_timeout {
                builder = builder
                    .timeout_config(TimeoutConfig::builder().operation_timeout(timeout).build());
            }
            clients.insert(
                target.region.clone(),
                aws_sdk_lambda::Client::from_conf(builder.build()),
            );
        }

        Self { clients }
    }
}

#[async_trait]
impl FunctionInvoker for AwsLambdaInvoker {
    async fn invoke(
        &self,
        target: &TargetDescriptor,
        payload: Vec<u8>,
    ) -> Result<InvokeResponse, String> {
        let client = self
            .clients
            .get(&target.region)
            .ok_or_else(|| format!("no lambda client for region '{}'", target.region))?;

        let output = client
            .invoke()
            .function_name(target.name.clone())
            .invocation_type(InvocationType::RequestResponse)
            .set_payload(Some(payload.into()))
            .send()
            .await
            .map_err(|error| format!("{error}"))?;

        Ok(InvokeResponse {
            payload: output
                .payload()
                .map(|blob| blob.as_ref().to_vec())
                .unwrap_or_default(),
            function_error: output.function_error().map(str::to_string),
        })
    }
}

fn invoke_timeout() -> Result<Option<Duration>, Error> {
    match std::env::var(INVOKE_TIMEOUT_VAR) {
        Ok(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse::<u64>()
            .map(|secs| Some(Duration::from_secs(secs)))
            .map_err(|_| Error::from(format!("{INVOKE_TIMEOUT_VAR} must be a whole number of seconds"))),
        _ => Ok(None),
    }
}

async fn handle_request(_event: LambdaEvent<Value>) -> Result<WarmReport, Error> {
    let targets = resolve_targets(std::env::vars())
        .map_err(|error| Error::from(format!("invalid target configuration: {error}")))?;
    let invoker = AwsLambdaInvoker::for_targets(&targets, invoke_timeout()?).await;

    run_warm(Arc::new(invoker), &targets)
        .await
        .map_err(|error| Error::from(error.to_string()))
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    init_logging();
    lambda_runtime::run(service_fn(handle_request)).await
}
