use std::io::{BufRead, Write};
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tracing::{debug, error};

use crate::config::{Config, ExitStatus, FileSource, RunResult};
use crate::error::{Error, WalkError};
use crate::filetype::is_binary;
use crate::fs_utils::{Walker, check_access};
use crate::io_utils::{next_listed_path, read_lines};
use crate::output::{Flow, Printer};
use crate::regex_utils::Patterns;

/// Match and error state for one invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunState {
    pub did_match: bool,
    pub exit_status: ExitStatus,
}

impl Default for RunState {
    fn default() -> Self {
        Self {
            did_match: false,
            exit_status: ExitStatus::NotSet,
        }
    }
}

impl RunState {
    /// Record a fatal error. There is no way back from `Error`.
    pub fn fail(&mut self) {
        self.exit_status = ExitStatus::Error;
    }

    pub fn is_failed(&self) -> bool {
        self.exit_status == ExitStatus::Error
    }

    /// Resolve `NotSet` into `Match` or `NoMatch`.
    pub fn finish(&self) -> ExitStatus {
        match self.exit_status {
            ExitStatus::NotSet if self.did_match => ExitStatus::Match,
            ExitStatus::NotSet => ExitStatus::NoMatch,
            status => status,
        }
    }
}

/// A compiled, ready-to-run search.
pub struct Searcher<'c> {
    cfg: &'c Config,
    patterns: Patterns,
    interrupt: Option<Arc<AtomicBool>>,
}

impl<'c> Searcher<'c> {
    /// Compile all patterns. Any bad pattern is fatal and nothing is traversed.
    pub fn new(cfg: &'c Config) -> Result<Self, Error> {
        Ok(Self {
            cfg,
            patterns: Patterns::compile(cfg)?,
            interrupt: None,
        })
    }

    /// Stop at the next file or directory once `flag` is set.
    pub fn with_interrupt(mut self, flag: Arc<AtomicBool>) -> Self {
        self.interrupt = Some(flag);
        self
    }

    /// Run the search, writing results to `out` and diagnostics to `err`.
    ///
    /// Only a broken or failing primary output and an interrupt are returned as
    /// errors; per-path problems are reported on `err` and the run continues.
    pub fn run(
        &self,
        stdin: &mut dyn BufRead,
        out: &mut dyn Write,
        err: &mut dyn Write,
    ) -> Result<ExitStatus, Error> {
        let mut printer = Printer::new(self.cfg, self.patterns.search.clone(), out, err);
        let mut state = RunState::default();

        let outcome = match &self.cfg.source {
            FileSource::List(files) => self.search_list(&mut printer, &mut state, files, stdin),
            FileSource::Walk => self.search_tree(&mut printer, &mut state),
        }
        .and_then(|()| self.check_interrupt())
        .and_then(|()| printer.flush());

        if let Err(err) = outcome {
            state.fail();
            if !matches!(err, Error::BrokenPipe) {
                let _ = printer.flush();
            }
            return Err(err);
        }
        Ok(state.finish())
    }

    fn check_interrupt(&self) -> Result<(), Error> {
        match &self.interrupt {
            Some(flag) if flag.load(Ordering::SeqCst) => Err(Error::Interrupted),
            _ => Ok(()),
        }
    }

    fn search_tree(&self, printer: &mut Printer<'_>, state: &mut RunState) -> Result<(), Error> {
        let name_only = self.patterns.search.is_none();
        for item in Walker::new(&self.patterns, &self.cfg.start_directory) {
            self.check_interrupt()?;
            let entry = match item {
                Ok(entry) => entry,
                Err(WalkError::Access(e)) => {
                    printer.access_error(&e);
                    continue;
                }
                Err(e) => {
                    error!(%e, "directory listing failed");
                    printer.error(&e);
                    continue;
                }
            };

            if name_only {
                let matching = entry
                    .dirs
                    .iter()
                    .filter(|d| self.patterns.filename.is_match(&d.to_string_lossy()));
                for dir in matching {
                    state.did_match = true;
                    printer.report_path(&entry.path.join(dir))?;
                }
            }

            for file in &entry.files {
                self.check_interrupt()?;
                let path = entry.path.join(file);
                if name_only {
                    state.did_match = true;
                    printer.report_path(&path)?;
                } else {
                    self.search_file(printer, state, &path)?;
                }
            }
        }
        self.check_interrupt()
    }

    fn search_list(
        &self,
        printer: &mut Printer<'_>,
        state: &mut RunState,
        files: &[String],
        stdin: &mut dyn BufRead,
    ) -> Result<(), Error> {
        for file in files {
            self.check_interrupt()?;
            if file != "-" {
                self.search_listed(printer, state, Path::new(file))?;
                continue;
            }
            // One path at a time so an interrupt is seen between lines.
            loop {
                let path = match next_listed_path(&mut *stdin) {
                    Ok(Some(path)) => path,
                    Ok(None) => break,
                    Err(e) => {
                        error!(%e, "reading file list from stdin");
                        printer.error("Error reading file list from stdin");
                        break;
                    }
                };
                self.check_interrupt()?;
                self.search_listed(printer, state, Path::new(&path))?;
            }
        }
        self.check_interrupt()
    }

    /// An explicitly named file. Without a content pattern it is reported when
    /// its name matches the name pattern.
    fn search_listed(
        &self,
        printer: &mut Printer<'_>,
        state: &mut RunState,
        path: &Path,
    ) -> Result<(), Error> {
        if self.patterns.search.is_some() {
            return self.search_file(printer, state, path);
        }
        if let Err(e) = check_access(path) {
            printer.access_error(&e);
            return Ok(());
        }
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy())
            .unwrap_or_default();
        if self.patterns.filename.is_match(&name) {
            state.did_match = true;
            printer.report_path(path)?;
        }
        Ok(())
    }

    /// Scan one file line by line and report according to the display mode.
    pub fn search_file(
        &self,
        printer: &mut Printer<'_>,
        state: &mut RunState,
        path: &Path,
    ) -> Result<(), Error> {
        let Some(re) = self.patterns.search.as_ref() else {
            return Ok(());
        };
        if let Err(e) = check_access(path) {
            printer.access_error(&e);
            return Ok(());
        }
        if self.cfg.binary_check && is_binary(path) {
            debug!(path = %path.display(), "skipping binary file");
            return Ok(());
        }
        let lines = match read_lines(path) {
            Ok(lines) => lines,
            Err(e) => {
                error!(path = %path.display(), %e, "read failed");
                printer.error(format_args!("Error opening {}", path.display()));
                return Ok(());
            }
        };

        let invert = self.cfg.invert;
        let mut matched = false;
        for (idx, raw) in lines.iter().enumerate() {
            let lnum = idx + 1;
            let line = raw.trim_end();
            match re.captures(line) {
                Some(caps) => {
                    matched = true;
                    if !invert {
                        state.did_match = true;
                        let flow = printer.report_match(path, lnum, line, Some(&caps), &lines)?;
                        if flow == Flow::StopFile {
                            break;
                        }
                    }
                }
                None if invert && self.cfg.print_lines => {
                    state.did_match = true;
                    printer.report_match(path, lnum, line, None, &lines)?;
                }
                None => {}
            }
        }

        if invert && !self.cfg.print_lines && !matched {
            state.did_match = true;
            printer.report_path(path)?;
        }
        Ok(())
    }
}

/// Run a search for `cfg`, capturing primary and diagnostic output.
///
/// `stdin` supplies the path list for a `-` entry in `FileSource::List`.
pub fn run<R: BufRead>(cfg: &Config, mut stdin: R) -> Result<RunResult, Error> {
    let searcher = Searcher::new(cfg)?;
    let mut out = Vec::new();
    let mut err = Vec::new();
    let status = searcher.run(&mut stdin, &mut out, &mut err)?;
    Ok(RunResult {
        output: String::from_utf8_lossy(&out).into_owned(),
        errors: String::from_utf8_lossy(&err).into_owned(),
        status,
    })
}
