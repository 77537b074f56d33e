// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::collections::BTreeMap;
use std::env;
use std::sync::Arc;
use std::time::Instant;

use anyhow::{bail, Context, Result};
use bundle_fanout::config::{load_and_validate_config, RuntimeBuilder};
use bundle_fanout::engine::ParDoMultiEvaluatorFactory;
use bundle_fanout::observability::init_tracing;
use bundle_fanout::traits::EvaluationContext;

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();

    let args: Vec<String> = env::args().collect();
    if args.len() < 3 {
        eprintln!("Usage: {} <config.yaml> <line> [line ...]", args[0]);
        eprintln!("Example: {} configs/route-empty.yaml \"hello\" \"\" \"world\"", args[0]);
        std::process::exit(1);
    }

    let config_file = &args[1];
    let lines = args[2..].to_vec();
    run(config_file, &lines).await
}

async fn run(config_file: &str, lines: &[String]) -> Result<()> {
    let start_time = Instant::now();

    let config = load_and_validate_config(config_file)
        .with_context(|| format!("loading {}", config_file))?;
    let runtime = RuntimeBuilder::from_config(&config)?;

    println!("🚀 Bundle Fanout");
    println!("═══════════════════════════════════");
    println!("📋 Configuration: {}", config_file);
    println!("🔧 Transform: {} ({})", config.transform.name, config.transform.fn_);
    println!("⚙️  Max Concurrency: {}", runtime.executor.max_concurrency());
    println!("🔁 Retry Attempts: {}", runtime.executor.retry_attempts());
    println!("🛡️  Failure Strategy: {:?}", runtime.executor.failure_strategy());

    let bundles = runtime.bundles(lines);
    println!("📦 Bundles: {} ({} lines)", bundles.len(), lines.len());

    let factory = Arc::new(ParDoMultiEvaluatorFactory::new());
    let context: Arc<dyn EvaluationContext> = runtime.context.clone();
    let outcomes = runtime
        .executor
        .execute(factory, Arc::clone(&runtime.application), bundles, context)
        .await?;

    let mut by_tag: BTreeMap<String, Vec<(i64, String)>> = BTreeMap::new();
    let mut failures = 0;
    for outcome in &outcomes {
        match &outcome.result {
            Ok(result) => {
                for (tag, bundle) in &result.outputs {
                    by_tag.entry(tag.to_string()).or_default().extend(
                        bundle
                            .elements()
                            .iter()
                            .map(|e| (e.timestamp, e.value.clone())),
                    );
                }
            }
            Err(e) => {
                failures += 1;
                println!(
                    "❌ Bundle {} failed after {} attempt(s): {}",
                    outcome.bundle_index, outcome.attempts, e
                );
            }
        }
    }

    println!("\n📊 Outputs:");
    for (tag, elements) in &by_tag {
        println!("  🏷️  {} ({} elements)", tag, elements.len());
        for (timestamp, value) in elements {
            println!("     [{}] \"{}\"", timestamp, value);
        }
    }

    println!("\n⏱️  Total Time (including config load): {:?}", start_time.elapsed());

    if failures > 0 {
        bail!("{} of {} bundles failed", failures, outcomes.len());
    }
    Ok(())
}
