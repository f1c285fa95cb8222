use std::fs::File;
use std::io;
use std::sync::Mutex;

use tracing::Level;

use crate::cli::Options;

/// Install the debug subscriber. Logging stays off unless `--debug` or
/// `--debug-log` is given; a log file takes precedence over stderr.
pub fn init(opts: &Options) -> io::Result<()> {
    if let Some(path) = &opts.debug_log {
        let file = File::create(path)?;
        tracing_subscriber::fmt()
            .with_max_level(Level::DEBUG)
            .with_ansi(false)
            .with_writer(Mutex::new(file))
            .init();
    } else if opts.debug {
        tracing_subscriber::fmt()
            .with_max_level(Level::DEBUG)
            .with_writer(io::stderr)
            .init();
    }
    Ok(())
}
