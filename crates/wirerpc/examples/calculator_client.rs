//! Calculator Client Example
//!
//! Connects to the calculator server and issues a few calls.
//!
//! ```bash
//! cargo run --example calculator_client
//! ```

// Layer 2: Third-party crate imports
use serde_json::json;
use tracing::info;
use tracing_subscriber::EnvFilter;

// Layer 3: Internal module imports
use wirerpc::{ClientConfig, RpcValue, TcpClient};

const SERVER_ADDR: &str = "127.0.0.1:8000";

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let mut client = TcpClient::new(ClientConfig::default());
    client.connect(SERVER_ADDR.parse()?).await?;
    info!(addr = SERVER_ADDR, "connected");

    let sum = client.call("add", RpcValue::from(json!([1, 2]))).await?;
    info!(?sum, "1 + 2");

    let quotient = client.call("divide", RpcValue::from(json!([10, 4]))).await?;
    info!(?quotient, "10 / 4");

    // An unknown method comes back as an RPC error, not a broken pipe.
    match client.call("modulo", RpcValue::from(json!([10, 4]))).await {
        Ok(value) => info!(?value, "10 % 4"),
        Err(error) => info!(%error, "modulo is not supported"),
    }

    client.disconnect().await?;
    Ok(())
}
