//! Calculator Server Example
//!
//! Serves `add`, `subtract`, `multiply`, and `divide` over newline-framed
//! JSON-RPC 2.0. Params are a list of two numbers; integer arguments get
//! integer results where the math allows it.
//!
//! ```bash
//! RUST_LOG=wirerpc=debug cargo run --example calculator_server
//! ```

// Layer 2: Third-party crate imports
use tracing::info;
use tracing_subscriber::EnvFilter;

// Layer 3: Internal module imports
use wirerpc::{RpcError, RpcValue, ServerConfig, TcpServer};

const LISTEN_ADDR: &str = "127.0.0.1:8000";

fn operands(params: &RpcValue) -> Result<(RpcValue, RpcValue), RpcError> {
    match params.as_list() {
        Some([a, b]) => Ok((a.clone(), b.clone())),
        _ => Err(RpcError::invalid_params(
            "params must be a list of exactly two numbers",
        )),
    }
}

fn arithmetic(method: &str, a: &RpcValue, b: &RpcValue) -> Result<RpcValue, RpcError> {
    // Integer arguments stay integers where the operation allows it.
    if let (Some(a), Some(b)) = (a.as_i64(), b.as_i64()) {
        match method {
            "add" => return Ok(RpcValue::from(a + b)),
            "subtract" => return Ok(RpcValue::from(a - b)),
            "multiply" => return Ok(RpcValue::from(a * b)),
            "divide" if b != 0 && a % b == 0 => return Ok(RpcValue::from(a / b)),
            _ => {}
        }
    }

    let a = a
        .as_f64()
        .ok_or_else(|| RpcError::invalid_params("left operand is not a number"))?;
    let b = b
        .as_f64()
        .ok_or_else(|| RpcError::invalid_params("right operand is not a number"))?;
    match method {
        "add" => Ok(RpcValue::from(a + b)),
        "subtract" => Ok(RpcValue::from(a - b)),
        "multiply" => Ok(RpcValue::from(a * b)),
        "divide" if b != 0.0 => Ok(RpcValue::from(a / b)),
        "divide" => Err(RpcError::invalid_params("division by zero")),
        other => Err(RpcError::invalid_method(other)),
    }
}

async fn calculator(method: String, params: RpcValue) -> Result<RpcValue, RpcError> {
    let (a, b) = operands(&params)?;
    arithmetic(&method, &a, &b)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let mut server = TcpServer::new(ServerConfig::default(), calculator);
    let addr = server.start(LISTEN_ADDR.parse()?).await?;
    info!(%addr, "calculator server listening");

    tokio::signal::ctrl_c().await?;
    info!("shutting down");
    server.stop().await?;
    Ok(())
}
