//! `tracing` subscriber setup.
//!
//! `RUST_LOG` takes precedence over the configured level when set.

use std::fs::{self, OpenOptions};
use std::io;
use std::path::Path;
use std::sync::Mutex;

use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::writer::BoxMakeWriter;

/// Initialize the global tracing subscriber.
///
/// Call once at startup. Later calls are no-ops. With `json` set, every event
/// is written as one JSON object per line; otherwise compact text is used.
/// Output goes to stderr unless `file` is given, in which case it is appended
/// to that file.
pub fn init_subscriber(level: &str, json: bool, file: Option<&Path>) -> io::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_ansi(file.is_none())
        .with_writer(make_writer(file)?);

    // try_init fails only if a global subscriber already exists
    let _ = if json {
        builder.json().try_init()
    } else {
        builder.compact().try_init()
    };
    Ok(())
}

/// Stderr, or an append-mode handle on `file` with its parent directories
/// created.
fn make_writer(file: Option<&Path>) -> io::Result<BoxMakeWriter> {
    let Some(path) = file else {
        return Ok(BoxMakeWriter::new(io::stderr));
    };
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    let handle = OpenOptions::new().create(true).append(true).open(path)?;
    Ok(BoxMakeWriter::new(Mutex::new(handle)))
}
