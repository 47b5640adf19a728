use async_trait::async_trait;
use warmer_core::contract::TargetDescriptor;

/// Raw result of a synchronous function invocation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InvokeResponse {
    pub payload: Vec<u8>,
    /// Set by the platform when the function itself raised an error.
    pub function_error: Option<String>,
}

#[async_trait]
pub trait FunctionInvoker: Send + Sync {
    async fn invoke(
        &self,
        target: &TargetDescriptor,
        payload: Vec<u8>,
    ) -> Result<InvokeResponse, String>;
}
