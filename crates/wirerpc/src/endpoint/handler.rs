//! Request Handler Seam
//!
//! The server hands every inbound request to a [`RequestHandler`]. The
//! handler receives the method name and the params value and produces one
//! reply, possibly later; each request gets exactly one response. Handlers
//! run on their own task, so a slow handler never stalls dispatch of the
//! requests behind it, and replies may leave in any order.

// Layer 2: Third-party crate imports
use async_trait::async_trait;

// Layer 3: Internal module imports
use crate::protocol::{RpcError, RpcValue};

/// Server-side request callback
///
/// # Examples
///
/// ```rust
/// use wirerpc::endpoint::RequestHandler;
/// use wirerpc::protocol::{RpcError, RpcValue};
///
/// struct Echo;
///
/// #[async_trait::async_trait]
/// impl RequestHandler for Echo {
///     async fn handle(&self, method: &str, params: RpcValue) -> Result<RpcValue, RpcError> {
///         match method {
///             "echo" => Ok(params),
///             other => Err(RpcError::invalid_method(other)),
///         }
///     }
/// }
/// ```
#[async_trait]
pub trait RequestHandler: Send + Sync {
    /// Produce the reply for one request
    ///
    /// Returning `Err` encodes the error into the response; it never
    /// closes the connection.
    async fn handle(&self, method: &str, params: RpcValue) -> Result<RpcValue, RpcError>;
}

/// Plain async functions and closures serve as handlers
///
/// The method name is passed owned so the closure's future does not borrow
/// from the dispatch loop.
#[async_trait]
impl<F, Fut> RequestHandler for F
where
    F: Fn(String, RpcValue) -> Fut + Send + Sync,
    Fut: std::future::Future<Output = Result<RpcValue, RpcError>> + Send + 'static,
{
    async fn handle(&self, method: &str, params: RpcValue) -> Result<RpcValue, RpcError> {
        (self)(method.to_string(), params).await
    }
}
