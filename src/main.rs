use std::path::Path;

use xmediation::{DslFormat, PipelineRunner};

const DEMO_PIPELINE: &str = include_str!("../demos/quote_pipeline.yaml");
const DEMO_REQUEST: &str = include_str!("../demos/quote_request.xml");

fn format_for(path: &Path) -> DslFormat {
    match path.extension().and_then(|e| e.to_str()) {
        Some("json") => DslFormat::Json,
        Some("toml") => DslFormat::Toml,
        _ => DslFormat::Yaml,
    }
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    println!("=== XMediation foreach demo ===\n");

    // Usage: xmediation [pipeline.{yaml,json,toml} payload.xml]
    let args: Vec<String> = std::env::args().skip(1).collect();
    let (pipeline, format, request) = match args.as_slice() {
        [pipeline, payload] => {
            let path = Path::new(pipeline);
            (
                std::fs::read_to_string(path).expect("Failed to read pipeline"),
                format_for(path),
                std::fs::read_to_string(payload).expect("Failed to read payload"),
            )
        }
        _ => (
            DEMO_PIPELINE.to_string(),
            DslFormat::Yaml,
            DEMO_REQUEST.to_string(),
        ),
    };

    let runner = PipelineRunner::from_dsl(&pipeline, format).expect("Failed to build pipeline");
    println!("[OK] Pipeline built");

    match runner.run_xml(&request).await {
        Ok(ctx) => {
            println!("\n=== Mediation completed ({}) ===", ctx.correlation_id());
            if let Some(body) = ctx.body() {
                println!("{}", body);
            }
            println!("\n--- message properties ---");
            for (key, value) in ctx.message_properties().sorted() {
                println!("  {} = {}", key, value);
            }
        }
        Err(e) => {
            println!("\n=== Mediation failed: {} ===", e);
        }
    }
}
