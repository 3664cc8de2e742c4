//! Example demonstrating the Quill logging facade
//!
//! This example shows:
//!
//! 1. Building a context from the environment
//! 2. Named child loggers
//! 3. Format arguments and error traces
//! 4. Adding and removing a file sink

use quill_core::{Quill, QuillConfig};

fn main()
{
    // Set QUILL_LEVEL=info to hide the debug line, QUILL_LOG_DIR=logs for rotating files
    let config = QuillConfig::from_env().expect("Invalid logging environment");
    let quill = Quill::from_config(config).expect("Failed to open log sinks");

    let app = quill.get_logger(["app"]);
    app.info("Application started");

    // Basic logging
    app.error("This is an error message");
    app.warn("This is a warning message");
    app.info("This is an info message");
    app.debug("This is a debug message (hidden with QUILL_LEVEL=info)");

    // Child loggers append to the name chain: [app][db]
    let db = app.get_logger(["db"]);
    quill_core::info!(db, "Connected to {} in {}ms", "primary", 42);

    // Errors are merged with their message
    let result: Result<(), std::io::Error> = Err(std::io::Error::other("connection reset"));
    if let Err(e) = result {
        db.error_with("Query failed", &e);
    }

    // A file sink only sees lines logged while it is registered
    let file = quill.save_to_file("facade-example.log").expect("Failed to open log file");
    app.info("This line also goes to facade-example.log");
    quill.remove_transport(file);

    app.info("Application finished");
    quill.shutdown();
}
