//! Write the batch files and the read script for a JSON request, without
//! running the engine.
//!
//! Usage: `manual_run [request.json]`

use fdscript::pipeline::{self, ReadResultsRequest};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();

    let args: Vec<String> = std::env::args().collect();
    let request_path = args
        .get(1)
        .map(|s| s.as_str())
        .unwrap_or("sample_request.json");

    let json = std::fs::read_to_string(request_path)?;
    let request: ReadResultsRequest = serde_json::from_str(&json)?;

    let prepared = pipeline::prepare(&request)?;
    prepared.write()?;
    for bsc in &prepared.bscs {
        tracing::info!("{} -> {:?}", bsc.category, bsc.output_path());
    }

    println!("{}", prepared.script_path.display());
    Ok(())
}
