use serde_json::json;
use warmer_core::contract::{ApiGatewayProxyRequest, ApiGatewayProxyResponse};
use warmer_core::spin::spin_result;

pub const DEFAULT_SPIN_PATH: &str = "/spin";

pub fn build_version() -> &'static str {
    option_env!("WARMER_BUILD_VERSION").unwrap_or(env!("CARGO_PKG_VERSION"))
}

/// Answers `spin_path` with this process's identity; every other request
/// goes to `fallback` untouched.
pub fn handle_spin_event<F>(
    request: &ApiGatewayProxyRequest,
    spin_path: &str,
    version: &str,
    fallback: F,
) -> ApiGatewayProxyResponse
where
    F: FnOnce(&ApiGatewayProxyRequest) -> ApiGatewayProxyResponse,
{
    if request.path == spin_path {
        return spin_response(version);
    }
    fallback(request)
}

pub fn spin_response(version: &str) -> ApiGatewayProxyResponse {
    match serde_json::to_string(&spin_result(version)) {
        Ok(body) => json_response(200, body),
        Err(error) => json_response(
            500,
            json!({"error": "serialization_error", "message": error.to_string()}).to_string(),
        ),
    }
}

pub fn not_found(request: &ApiGatewayProxyRequest) -> ApiGatewayProxyResponse {
    json_response(
        404,
        json!({"error": "not_found", "path": request.path}).to_string(),
    )
}

fn json_response(status_code: u16, body: String) -> ApiGatewayProxyResponse {
    ApiGatewayProxyResponse {
        status_code,
        headers: json!({"Content-Type": "application/json"}),
        body,
    }
}
