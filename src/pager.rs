//! Paging of the primary output through `$PAGER`.

use std::env;
use std::io::{self, IsTerminal};
use std::process::{Child, ChildStdin, Command, Stdio};

use pfind::Config;

use crate::cli::Options;

const DEFAULT_PAGER: &str = "less";

/// Page when stdout is a terminal (or paging is forced), unless disabled or a
/// command is run per file.
pub fn should_page(cfg: &Config, opts: &Options) -> bool {
    cfg.run_command().is_none()
        && !opts.no_pager
        && (opts.force_pager || io::stdout().is_terminal())
}

/// The pager program and its arguments. `less` gets `-FRSX` unless `LESS` is set.
pub fn pager_command() -> Vec<String> {
    let pager = env::var("PAGER")
        .ok()
        .filter(|p| !p.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_PAGER.to_string());
    let mut args: Vec<String> = pager.split_whitespace().map(str::to_string).collect();
    if args.len() == 1 && args[0] == DEFAULT_PAGER && env::var_os("LESS").is_none() {
        args.push("-FRSX".to_string());
    }
    args
}

pub struct Pager {
    child: Child,
}

impl Pager {
    /// Start the pager and hand back the pipe feeding its stdin.
    pub fn spawn(args: &[String]) -> io::Result<(Self, ChildStdin)> {
        let mut child = Command::new(&args[0])
            .args(&args[1..])
            .stdin(Stdio::piped())
            .spawn()?;
        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| io::Error::other("pager has no stdin"))?;
        Ok((Self { child }, stdin))
    }

    /// Wait for the user to leave the pager. The pipe must be closed first.
    pub fn wait(mut self) -> io::Result<()> {
        self.child.wait().map(|_| ())
    }
}
