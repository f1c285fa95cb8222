use std::io::{self, BufWriter, Write};
use std::process::ExitCode;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use pfind::{Error, Searcher};
use tracing::{debug, warn};

mod cli;
mod logging;
mod pager;

fn main() -> ExitCode {
    let (cfg, opts) = cli::parse();

    if let Err(err) = logging::init(&opts) {
        eprintln!("Error opening debug log: {}", err);
    }
    debug!(?cfg, ?opts, "options");

    let searcher = match Searcher::new(&cfg) {
        Ok(s) => s,
        Err(err) => {
            if matches!(err, Error::NoPattern) {
                let _ = cli::build_cli().print_help();
            }
            eprintln!("{}", err);
            if let Error::Pattern { source, .. } = &err {
                debug!(%source, "regex compile failed");
            }
            return ExitCode::from(2);
        }
    };

    let interrupted = Arc::new(AtomicBool::new(false));
    let flag = Arc::clone(&interrupted);
    if let Err(err) = ctrlc::set_handler(move || flag.store(true, Ordering::SeqCst)) {
        warn!(%err, "failed to set Ctrl+C handler");
    }
    let searcher = searcher.with_interrupt(interrupted);

    let mut paging = None;
    let mut sink: Box<dyn Write> = if pager::should_page(&cfg, &opts) {
        let args = pager::pager_command();
        match pager::Pager::spawn(&args) {
            Ok((pager, pipe)) => {
                paging = Some(pager);
                Box::new(BufWriter::new(pipe))
            }
            Err(err) => {
                debug!(%err, "pager spawn failed");
                eprintln!("Error opening pager process: {}", args.join(" "));
                return ExitCode::from(2);
            }
        }
    } else {
        Box::new(BufWriter::new(io::stdout().lock()))
    };

    let mut stdin = io::stdin().lock();
    let mut stderr = io::stderr();
    let result = searcher.run(&mut stdin, &mut sink, &mut stderr);

    // Close the pipe so the pager sees EOF, then let the user finish paging.
    drop(sink);
    if let Some(pager) = paging {
        if let Err(err) = pager.wait() {
            debug!(%err, "waiting for pager");
        }
    }

    match result {
        Ok(status) => ExitCode::from(status.code()),
        Err(Error::BrokenPipe) => ExitCode::from(2),
        Err(Error::Interrupted) => {
            eprintln!("\nInterrupted");
            ExitCode::from(2)
        }
        Err(err) => {
            eprintln!("pfind: {}", err);
            ExitCode::from(2)
        }
    }
}
