use lambda_runtime::{service_fn, Error, LambdaEvent};
use warmer_core::contract::{ApiGatewayProxyRequest, ApiGatewayProxyResponse};
use warmer_lambda::handlers::spin::{build_version, handle_spin_event, not_found, DEFAULT_SPIN_PATH};
use warmer_lambda::reporting::init_logging;

async fn handle_request(
    event: LambdaEvent<ApiGatewayProxyRequest>,
) -> Result<ApiGatewayProxyResponse, Error> {
    let spin_path =
        std::env::var("SPIN_PATH").unwrap_or_else(|_| DEFAULT_SPIN_PATH.to_string());
    tracing::debug!(path = %event.payload.path, "spin request");

    Ok(handle_spin_event(
        &event.payload,
        &spin_path,
        build_version(),
        not_found,
    ))
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    init_logging();
    lambda_runtime::run(service_fn(handle_request)).await
}
