use async_trait::async_trait;
use serde_json::Value;

use crate::error::TransportError;

/// Request/response channel to the host.
///
/// # Behavior
/// - `args` is the command's argument record, or `Value::Null`.
/// - Commands without a result resolve to `Value::Null`.
/// - Commands the host does not provide fail with
///   [`TransportError::NotImplemented`], never with a silent no-op.
#[async_trait]
pub trait HostCommandPort: Send + Sync {
    async fn invoke(&self, command: &str, args: Value) -> Result<Value, TransportError>;
}
