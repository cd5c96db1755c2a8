//! Basic logger usage example
//!
//! Demonstrates console output, the built-in levels and level filtering.
//!
//! Run with: cargo run --example basic_usage

use pipelog::prelude::*;
use pipelog::{info, warn};

fn main() -> Result<()> {
    println!("=== pipelog - Basic Usage Example ===\n");

    let logger = Logger::builder().transport("console", console()).build()?;

    println!("1. Logging at different levels:");
    logger.info("This is an info message");
    logger.success("This is a success message");
    logger.warn("This is a warning message");
    logger.error("This is an error message");

    println!("\n2. Restricting the filter to WARNING and ERROR:");
    logger.set_level(logger.levels().get(&["WARNING", "ERROR"]));
    logger.info("Info message (hidden)");
    logger.warn("Warning message (visible)");
    logger.set_level_all();

    println!("\n3. Custom levels and placeholders:");
    let debug = logger.levels().add("debug").unwrap_or_default();
    logger
        .set_format("%symbol {cyan %app} %msg")
        .set_predefined_value("app", "billing");
    logger.log_with_options("cache warmed", EmitOptions::new().level(debug));

    println!("\n4. Mixed segments through macros:");
    let port = 8080;
    info!(logger, "listening on port", port);
    warn!(logger, "config", serde_json::json!({"workers": 4, "tls": false}));

    println!("\n=== Example completed successfully! ===");

    Ok(())
}
