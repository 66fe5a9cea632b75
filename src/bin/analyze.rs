use optlab::{CalculationRequest, EngineConfig};

/// One-shot analysis runner: read a JSON request snapshot, run the
/// engine, print the result as JSON.
fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let path = match std::env::args().nth(1) {
        Some(p) => p,
        None => {
            eprintln!("usage: analyze <request.json>");
            std::process::exit(2);
        }
    };

    let config = match EngineConfig::from_env() {
        Ok(c) => c,
        Err(e) => {
            tracing::error!("config error: {e}");
            std::process::exit(1);
        }
    };

    let raw = match std::fs::read_to_string(&path) {
        Ok(s) => s,
        Err(e) => {
            tracing::error!("failed to read {path}: {e}");
            std::process::exit(1);
        }
    };

    let request: CalculationRequest = match serde_json::from_str(&raw) {
        Ok(r) => r,
        Err(e) => {
            tracing::error!("failed to parse {path}: {e}");
            std::process::exit(1);
        }
    };

    let inputs = match request.into_inputs() {
        Ok(i) => i,
        Err(e) => {
            tracing::error!("bad request: {e}");
            std::process::exit(1);
        }
    };

    match optlab::analyze(&inputs, &config) {
        Ok(results) => match serde_json::to_string_pretty(&results) {
            Ok(json) => println!("{json}"),
            Err(e) => {
                tracing::error!("failed to serialize results: {e}");
                std::process::exit(1);
            }
        },
        Err(e) => {
            tracing::error!("analysis failed: {e}");
            std::process::exit(1);
        }
    }
}
