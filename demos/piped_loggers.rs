//! Piped loggers example
//!
//! Demonstrates forwarding between loggers, pipe muting and logger copies.
//!
//! Run with: cargo run --example piped_loggers

use pipelog::prelude::*;

fn main() -> Result<()> {
    println!("=== pipelog - Piped Loggers Example ===\n");

    let audit = MemorySink::new();
    let console_logger = Logger::builder()
        .id("console")
        .transport("console", console())
        .build()?;
    let audit_logger = Logger::builder()
        .id("audit")
        .transport("memory", audit.transport())
        .build()?;
    audit_logger.set_level(audit_logger.levels().get(&["WARNING", "ERROR"]));

    println!("1. Everything printed to the console is also offered to the audit logger:");
    let pipe = console_logger.pipe(&audit_logger);
    console_logger.info("user signed in");
    console_logger.error("payment declined");
    println!("   audit kept {} of 2 messages", audit.written().len());

    println!("\n2. A muted pipe stops forwarding without detaching:");
    pipe.mute();
    console_logger.error("not audited");
    pipe.unmute();
    println!("   audit still holds {} messages", audit.written().len());

    println!("\n3. A muted console can still feed the audit trail:");
    pipe.enable_unmuting_messages();
    console_logger.mute_messages().error("audited only");
    console_logger.unmute_messages();
    println!("   audit now holds {} messages", audit.written().len());

    println!("\n4. Copies share transports but stay isolated from the origin:");
    let worker = console_logger.copy_builder().format("%symbol [worker] %msg").build()?;
    worker.success("job finished");
    println!("   worker -> origin pipe muted: {}", worker.pipes()[0].is_muted());

    pipe.destroy()?;
    println!("\n=== Example completed successfully! ===");

    Ok(())
}
