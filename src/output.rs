//! Result printing.
//!
//! Every emitted unit is rendered by `render`, which implements the whole
//! line-number / filename / payload table. `Printer` picks the payload for the
//! active `DisplayMode`, handles context windows and runs the external command
//! in path-only mode.

use std::fmt::{Display, Write as _};
use std::io::Write;
use std::path::Path;
use std::process::Command;

use regex::{Captures, Regex};
use tracing::{debug, error};

use crate::config::{Config, DisplayMode};
use crate::error::{AccessError, Error};
use crate::regex_utils::highlight_segments;

/// Whether the matcher should keep scanning the current file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    StopFile,
}

/// Render one output unit: `[{lnum}: ][{path}][: ]{text}`.
pub fn render(lnum: Option<usize>, path: Option<&str>, text: Option<&str>) -> String {
    let mut s = String::new();
    if let Some(n) = lnum {
        let _ = write!(s, "{}: ", n);
    }
    match (path, text) {
        (Some(p), Some(t)) => {
            let _ = write!(s, "{}: {}", p, t);
        }
        (Some(p), None) => s.push_str(p),
        (None, Some(t)) => s.push_str(t),
        (None, None) => {}
    }
    s
}

/// Split a command template on whitespace and strip one leading and one
/// trailing quote from each token.
pub fn split_command(template: &str) -> Vec<String> {
    template
        .split_whitespace()
        .map(|tok| {
            let tok = tok.strip_prefix(['\'', '"']).unwrap_or(tok);
            let tok = tok.strip_suffix(['\'', '"']).unwrap_or(tok);
            tok.to_string()
        })
        .collect()
}

pub struct Printer<'w> {
    out: &'w mut dyn Write,
    err: &'w mut dyn Write,
    mode: DisplayMode,
    line_numbers: bool,
    show_filename: bool,
    context: usize,
    command: Option<Vec<String>>,
    suppress_access_errors: bool,
    highlight: Option<Regex>,
    windows_printed: bool,
}

impl<'w> Printer<'w> {
    pub fn new(
        cfg: &Config,
        highlight: Option<Regex>,
        out: &'w mut dyn Write,
        err: &'w mut dyn Write,
    ) -> Self {
        Self {
            out,
            err,
            mode: cfg.display_mode(),
            line_numbers: cfg.line_numbers,
            show_filename: !cfg.no_filename,
            context: cfg.context,
            command: cfg.run_command().map(split_command).filter(|a| !a.is_empty()),
            suppress_access_errors: cfg.suppress_access_errors,
            highlight: highlight.filter(|_| cfg.color),
            windows_printed: false,
        }
    }

    fn emit(&mut self, unit: &str) -> Result<(), Error> {
        writeln!(self.out, "{}", unit)?;
        Ok(())
    }

    /// Report a file (or directory) by path, or hand it to the external command.
    pub fn report_path(&mut self, path: &Path) -> Result<(), Error> {
        if self.command.is_some() {
            self.run_command(path)
        } else {
            self.emit(&path.display().to_string())
        }
    }

    /// Report one matching (or, when inverting, non-matching) line.
    ///
    /// `caps` is `None` for inverted lines; match-group mode then falls back to
    /// the raw line.
    pub fn report_match(
        &mut self,
        path: &Path,
        lnum: usize,
        line: &str,
        caps: Option<&Captures<'_>>,
        lines: &[String],
    ) -> Result<Flow, Error> {
        if self.mode == DisplayMode::PathOnly {
            if self.line_numbers {
                let unit = render(Some(lnum), Some(&path.display().to_string()), None);
                self.emit(&unit)?;
            } else {
                self.report_path(path)?;
            }
            return Ok(Flow::StopFile);
        }

        if self.context > 0 {
            self.print_context(path, lnum, lines)?;
        } else {
            match (self.mode, caps) {
                (DisplayMode::MatchGroups, Some(caps)) => self.print_groups(path, lnum, caps)?,
                _ => self.print_line(path, lnum, line)?,
            }
        }
        Ok(Flow::Continue)
    }

    fn filename(&self, path: &Path) -> Option<String> {
        self.show_filename.then(|| path.display().to_string())
    }

    fn print_line(&mut self, path: &Path, lnum: usize, line: &str) -> Result<(), Error> {
        let text = match &self.highlight {
            Some(re) => highlight_segments(line, re),
            None => line.to_string(),
        };
        let unit = render(
            self.line_numbers.then_some(lnum),
            self.filename(path).as_deref(),
            Some(&text),
        );
        self.emit(&unit)
    }

    fn print_groups(&mut self, path: &Path, lnum: usize, caps: &Captures<'_>) -> Result<(), Error> {
        // Groups that took no part are skipped; if none took part, the whole
        // match stands in for them.
        let mut groups: Vec<&str> = caps.iter().skip(1).flatten().map(|m| m.as_str()).collect();
        if groups.is_empty() {
            groups.extend(caps.get(0).map(|m| m.as_str()));
        }
        let filename = self.filename(path);
        for group in groups {
            let unit = render(self.line_numbers.then_some(lnum), filename.as_deref(), Some(group));
            self.emit(&unit)?;
        }
        Ok(())
    }

    /// Print the window `[lnum - 1 - context, lnum + context)` clamped to the
    /// file, separating successive windows with a blank line.
    fn print_context(&mut self, path: &Path, lnum: usize, lines: &[String]) -> Result<(), Error> {
        let (start, end) = context_window(lnum, self.context, lines.len());
        if self.windows_printed {
            self.emit("")?;
        }
        self.windows_printed = true;
        for (i, line) in lines.iter().enumerate().take(end).skip(start) {
            self.print_line(path, i + 1, line.trim_end())?;
        }
        Ok(())
    }

    fn run_command(&mut self, path: &Path) -> Result<(), Error> {
        let Some(args) = self.command.as_ref() else {
            return Ok(());
        };
        debug!(?args, path = %path.display(), "running command");
        // Keep our own output ordered before the child's.
        self.out.flush()?;
        match Command::new(&args[0]).args(&args[1..]).arg(path).status() {
            Ok(status) if !status.success() => {
                debug!(%status, path = %path.display(), "command exited unsuccessfully");
            }
            Ok(_) => {}
            Err(err) => {
                let shown = format!("{} {}", args.join(" "), path.display());
                error!(%err, command = %shown, "command failed to start");
                self.error(format_args!("Error running: '{}'", shown));
            }
        }
        Ok(())
    }

    /// Report a per-path access problem unless those are suppressed.
    pub fn access_error(&mut self, err: &AccessError) {
        debug!(%err, "access error");
        if !self.suppress_access_errors {
            self.error(err);
        }
    }

    pub fn error(&mut self, msg: impl Display) {
        let _ = writeln!(self.err, "{}", msg);
    }

    pub fn flush(&mut self) -> Result<(), Error> {
        self.out.flush()?;
        let _ = self.err.flush();
        Ok(())
    }
}

/// Zero-based, half-open line range printed around the 1-based line `lnum`.
pub fn context_window(lnum: usize, context: usize, len: usize) -> (usize, usize) {
    let start = lnum.saturating_sub(1 + context);
    let end = (lnum + context).min(len);
    (start.min(end), end)
}
