//! File logging example
//!
//! Demonstrates logging to console and file transports simultaneously.
//! The file receives the plain text of every unmuted message.
//!
//! Run with: cargo run --example file_logging

use pipelog::prelude::*;
use pipelog::transports::file;

fn main() -> Result<()> {
    println!("=== pipelog - File Logging Example ===\n");

    let logger = Logger::builder()
        .transport("console", console())
        .transport("file", file("application.log")?)
        .build()?;

    println!("1. Logging to both console and file:");

    logger.info("Application started");
    logger.info("Configuration loaded successfully");
    logger.warn("Using default settings for some options");
    logger.info("Database connection established");
    logger.error("Failed to load optional plugin");
    logger.success("Application initialization complete");

    println!("\n2. Performing some operations:");

    for i in 1..=5 {
        logger.info(format!("Processing item {}/5", i));
        if i == 3 {
            logger.warn("Item 3 took longer than expected");
        }
    }

    println!("\n3. Muted messages reach neither sink:");
    logger.mute_messages().error("This line is never written");
    logger.unmute_messages().info("All operations completed");

    let metrics = logger.metrics();
    println!(
        "\nPosted {} messages, {} muted, {} transport writes",
        metrics.posted(),
        metrics.muted(),
        metrics.delivered()
    );

    println!("\n=== Example completed successfully! ===");
    println!("Check 'application.log' for the full log output");

    Ok(())
}
