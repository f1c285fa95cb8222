use std::path::PathBuf;

/// Name pattern used when only a content pattern is given.
pub const DEFAULT_FILENAME_PATTERN: &str = ".+";
/// Directories skipped by default: dot-directories, VCS metadata and caches.
pub const DEFAULT_SKIP_DIRS_PATTERN: &str = r"(^\..+|CVS|RCS|__pycache__)";
/// Files skipped by default: dotfiles and compiled bytecode.
pub const DEFAULT_SKIP_FILES_PATTERN: &str = r"(^\..+|\.pyc$)";

/// Where the candidate paths come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileSource {
    /// Walk the tree below `Config::start_directory`.
    Walk,
    /// Explicit list; a `-` entry reads a newline-delimited list from stdin.
    List(Vec<String>),
}

/// Which unit of output is emitted per reported match.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplayMode {
    PathOnly,
    RawLine,
    MatchGroups,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub search_pattern: Option<String>,   // -e / first positional
    pub filename_pattern: Option<String>, // -n / second positional
    pub start_directory: PathBuf,         // -d / third positional
    pub case_insensitive: bool,           // -i
    pub invert: bool,                     // -v
    pub context: usize,                   // -c
    pub line_numbers: bool,               // -l
    pub print_lines: bool,                // -p
    pub print_matches: bool,              // -m
    pub no_filename: bool,                // -s
    pub skip_dirs_pattern: Option<String>,
    pub skip_files_pattern: Option<String>,
    pub binary_check: bool,               // disabled by -B
    pub suppress_access_errors: bool,     // -A
    pub run: Option<String>,              // -r
    pub color: bool,                      // --color
    pub source: FileSource,               // -f
}

impl Default for Config {
    fn default() -> Self {
        Self {
            search_pattern: None,
            filename_pattern: None,
            start_directory: PathBuf::from("."),
            case_insensitive: false,
            invert: false,
            context: 0,
            line_numbers: false,
            print_lines: false,
            print_matches: false,
            no_filename: false,
            skip_dirs_pattern: Some(DEFAULT_SKIP_DIRS_PATTERN.to_string()),
            skip_files_pattern: Some(DEFAULT_SKIP_FILES_PATTERN.to_string()),
            binary_check: true,
            suppress_access_errors: false,
            run: None,
            color: false,
            source: FileSource::Walk,
        }
    }
}

impl Config {
    /// The active display mode. Match groups win over raw lines when both are requested.
    pub fn display_mode(&self) -> DisplayMode {
        if self.print_matches {
            DisplayMode::MatchGroups
        } else if self.print_lines {
            DisplayMode::RawLine
        } else {
            DisplayMode::PathOnly
        }
    }

    /// The external command, if it applies. It is ignored whenever lines or
    /// line numbers are printed.
    pub fn run_command(&self) -> Option<&str> {
        if self.print_lines || self.line_numbers {
            return None;
        }
        self.run.as_deref().filter(|r| !r.trim().is_empty())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitStatus {
    NotSet,
    Match,
    NoMatch,
    Error,
}

impl ExitStatus {
    /// Process exit code. `NotSet` never reaches the process boundary; it is
    /// resolved by `RunState::finish` first.
    pub fn code(self) -> u8 {
        match self {
            ExitStatus::Match => 0,
            ExitStatus::NoMatch | ExitStatus::NotSet => 1,
            ExitStatus::Error => 2,
        }
    }
}

/// Captured outcome of `search::run`.
pub struct RunResult {
    pub output: String,
    pub errors: String,
    pub status: ExitStatus,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_mode_prefers_match_groups() {
        let mut cfg = Config::default();
        assert_eq!(cfg.display_mode(), DisplayMode::PathOnly);
        cfg.print_lines = true;
        assert_eq!(cfg.display_mode(), DisplayMode::RawLine);
        cfg.print_matches = true;
        assert_eq!(cfg.display_mode(), DisplayMode::MatchGroups);
    }

    #[test]
    fn run_command_dropped_when_printing_lines_or_numbers() {
        let mut cfg = Config {
            run: Some("echo".into()),
            ..Default::default()
        };
        assert_eq!(cfg.run_command(), Some("echo"));
        cfg.line_numbers = true;
        assert_eq!(cfg.run_command(), None);
        cfg.line_numbers = false;
        cfg.print_lines = true;
        assert_eq!(cfg.run_command(), None);
    }

    #[test]
    fn exit_codes() {
        assert_eq!(ExitStatus::Match.code(), 0);
        assert_eq!(ExitStatus::NoMatch.code(), 1);
        assert_eq!(ExitStatus::Error.code(), 2);
    }
}
