//! The external "transform image" capability.

use async_trait::async_trait;

use crate::operation::TransformCall;
use crate::outcome::{TransformReply, TransportError};

/// A remote model that takes one image plus instruction text and answers
/// with an image, a refusal or an explanation.
///
/// Implementations perform exactly one outbound call per `transform` and do
/// not retry. Any reply the remote produced, including refusals, is returned
/// as `Ok`; only failures of the call itself are `Err`.
#[async_trait]
pub trait ImageBackend: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &str;

    async fn transform(&self, call: TransformCall) -> Result<TransformReply, TransportError>;
}
