//! Command-line argument parsing for the pfind binary.
//!
//! `parse()` returns a populated `Config` plus the options that only matter to
//! the binary (pager and logging). Pattern validation happens later, when the
//! search is compiled.

use std::path::PathBuf;

use clap::{Arg, ArgAction, ArgMatches, Command, value_parser};
use pfind::config::{DEFAULT_SKIP_DIRS_PATTERN, DEFAULT_SKIP_FILES_PATTERN};
use pfind::{Config, FileSource};

/// Options handled by the binary rather than the search engine.
#[derive(Debug, Clone, Default)]
pub struct Options {
    pub no_pager: bool,
    pub force_pager: bool,
    pub debug: bool,
    pub debug_log: Option<PathBuf>,
}

const ABOUT: &str = "pfind: programmers find

Recursively search for files whose contents matches search-pattern.
Optionally restrict the search to files whose name matches filename-pattern.
A filename-pattern without regex metacharacters matches the end of the name.";

/// Build the clap Command describing pfind's CLI.
pub fn build_cli() -> Command {
    Command::new("pfind")
        .version(env!("CARGO_PKG_VERSION"))
        .about(ABOUT)
        .override_usage("pfind [options] [search-pattern [filename-pattern [start-directory]]]")
        .arg(
            Arg::new("debug")
                .long("debug")
                .action(ArgAction::SetTrue)
                .help("Turn on debug logging"),
        )
        .arg(
            Arg::new("debug-log")
                .long("debug-log")
                .value_name("FILE")
                .value_parser(value_parser!(PathBuf))
                .help("Save debug logging to FILE"),
        )
        .arg(
            Arg::new("context")
                .short('c')
                .long("context")
                .value_name("COUNT")
                .value_parser(value_parser!(usize))
                .default_value("0")
                .help("Show COUNT surrounding context lines of the matches (with -p or -m)"),
        )
        .arg(
            Arg::new("chdir")
                .short('d')
                .long("chdir")
                .value_name("START_DIRECTORY")
                .help("Directory to start the search in; also the third positional argument"),
        )
        .arg(
            Arg::new("regexp")
                .short('e')
                .long("regexp")
                .value_name("SEARCH_PATTERN")
                .allow_hyphen_values(true)
                .help("Pattern to match in files; use for patterns beginning with -"),
        )
        .arg(
            Arg::new("file")
                .short('f')
                .long("file")
                .value_name("FILE")
                .action(ArgAction::Append)
                .help("File to search instead of walking a tree (repeatable; - reads a list from stdin)"),
        )
        .arg(
            Arg::new("ignore-case")
                .short('i')
                .long("ignore-case")
                .action(ArgAction::SetTrue)
                .help("Ignore case in the search pattern"),
        )
        .arg(
            Arg::new("line-number")
                .short('l')
                .long("line-number")
                .action(ArgAction::SetTrue)
                .help("Print the matching line number"),
        )
        .arg(
            Arg::new("matches")
                .short('m')
                .long("matches")
                .action(ArgAction::SetTrue)
                .help("Print the matching regex groups"),
        )
        .arg(
            Arg::new("filename")
                .short('n')
                .long("filename")
                .value_name("FILENAME_PATTERN")
                .help("Only search files whose name matches; also the second positional argument"),
        )
        .arg(
            Arg::new("print-lines")
                .short('p')
                .long("print-lines")
                .action(ArgAction::SetTrue)
                .help("Print the matching line"),
        )
        .arg(
            Arg::new("run")
                .short('r')
                .long("run")
                .value_name("CMD")
                .help("Run CMD for each matching file with its path as the last argument (ignored with -p or -l)"),
        )
        .arg(
            Arg::new("no-filename")
                .short('s')
                .long("no-filename")
                .action(ArgAction::SetTrue)
                .help("Do not print the file name with matched lines"),
        )
        .arg(
            Arg::new("invert")
                .short('v')
                .long("invert-match")
                .action(ArgAction::SetTrue)
                .help("Invert the sense of the match: print non-matching files and lines"),
        )
        .arg(
            Arg::new("suppress-access-errors")
                .short('A')
                .long("suppress-file-access-errors")
                .action(ArgAction::SetTrue)
                .help("Do not print file/directory access errors"),
        )
        .arg(
            Arg::new("no-binary-check")
                .short('B')
                .long("no-binary-check")
                .action(ArgAction::SetTrue)
                .help("Do not skip files that look binary"),
        )
        .arg(
            Arg::new("no-pager")
                .short('N')
                .long("no-pager")
                .action(ArgAction::SetTrue)
                .help("Do not pipe output to a pager when stdout is a terminal"),
        )
        .arg(
            Arg::new("force-pager")
                .long("force-pager")
                .action(ArgAction::SetTrue)
                .help("Always pipe output to a pager (ignored with -r)"),
        )
        .arg(
            Arg::new("color")
                .long("color")
                .action(ArgAction::SetTrue)
                .help("Highlight matches in printed lines"),
        )
        .arg(
            Arg::new("skip-dirs-pattern")
                .long("skip-dirs-pattern")
                .value_name("REGEX")
                .default_value(DEFAULT_SKIP_DIRS_PATTERN)
                .help("Regex of directories to skip (empty disables)"),
        )
        .arg(
            Arg::new("skip-files-pattern")
                .long("skip-files-pattern")
                .value_name("REGEX")
                .default_value(DEFAULT_SKIP_FILES_PATTERN)
                .help("Regex of files to skip (empty disables)"),
        )
        .arg(Arg::new("search-pattern").help("Match this pattern in files"))
        .arg(Arg::new("filename-pattern").help("Only search files whose name matches this pattern"))
        .arg(Arg::new("start-directory").help("Start the search in this directory"))
}

fn string(matches: &ArgMatches, name: &str) -> Option<String> {
    matches.get_one::<String>(name).cloned()
}

/// Positional arguments win over their flag equivalents.
fn positional_or_flag(matches: &ArgMatches, positional: &str, flag: &str) -> Option<String> {
    string(matches, positional)
        .filter(|s| !s.is_empty())
        .or_else(|| string(matches, flag))
}

/// Turn parsed arguments into a `Config` and binary options.
pub fn from_matches(matches: &ArgMatches) -> (Config, Options) {
    let mut cfg = Config {
        search_pattern: positional_or_flag(matches, "search-pattern", "regexp"),
        filename_pattern: positional_or_flag(matches, "filename-pattern", "filename"),
        case_insensitive: matches.get_flag("ignore-case"),
        invert: matches.get_flag("invert"),
        context: matches.get_one::<usize>("context").copied().unwrap_or(0),
        line_numbers: matches.get_flag("line-number"),
        print_lines: matches.get_flag("print-lines"),
        print_matches: matches.get_flag("matches"),
        no_filename: matches.get_flag("no-filename"),
        skip_dirs_pattern: string(matches, "skip-dirs-pattern"),
        skip_files_pattern: string(matches, "skip-files-pattern"),
        binary_check: !matches.get_flag("no-binary-check"),
        suppress_access_errors: matches.get_flag("suppress-access-errors"),
        run: string(matches, "run"),
        color: matches.get_flag("color"),
        ..Default::default()
    };
    if let Some(dir) = positional_or_flag(matches, "start-directory", "chdir") {
        cfg.start_directory = dir.into();
    }
    if let Some(files) = matches.get_many::<String>("file") {
        cfg.source = FileSource::List(files.cloned().collect());
    }
    let opts = Options {
        no_pager: matches.get_flag("no-pager"),
        force_pager: matches.get_flag("force-pager"),
        debug: matches.get_flag("debug"),
        debug_log: matches.get_one::<PathBuf>("debug-log").cloned(),
    };
    (cfg, opts)
}

/// Parse the process arguments. Exits via clap on `--help`, `--version` and usage errors.
pub fn parse() -> (Config, Options) {
    from_matches(&build_cli().get_matches())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_from(args: &[&str]) -> (Config, Options) {
        let mut argv = vec!["pfind"];
        argv.extend_from_slice(args);
        from_matches(&build_cli().try_get_matches_from(argv).unwrap())
    }

    #[test]
    fn positionals_fill_patterns_and_directory() {
        let (cfg, _) = parse_from(&["three", "txt", "some/dir"]);
        assert_eq!(cfg.search_pattern.as_deref(), Some("three"));
        assert_eq!(cfg.filename_pattern.as_deref(), Some("txt"));
        assert_eq!(cfg.start_directory, PathBuf::from("some/dir"));
    }

    #[test]
    fn flags_fill_patterns() {
        let (cfg, _) = parse_from(&["-d", "x", "-n", "simple", "-e", "-dash"]);
        assert_eq!(cfg.search_pattern.as_deref(), Some("-dash"));
        assert_eq!(cfg.filename_pattern.as_deref(), Some("simple"));
        assert_eq!(cfg.start_directory, PathBuf::from("x"));
    }

    #[test]
    fn defaults() {
        let (cfg, opts) = parse_from(&["one"]);
        assert_eq!(cfg.start_directory, PathBuf::from("."));
        assert_eq!(cfg.skip_dirs_pattern.as_deref(), Some(DEFAULT_SKIP_DIRS_PATTERN));
        assert_eq!(cfg.skip_files_pattern.as_deref(), Some(DEFAULT_SKIP_FILES_PATTERN));
        assert!(cfg.binary_check);
        assert_eq!(cfg.source, FileSource::Walk);
        assert!(!opts.no_pager && !opts.force_pager && !opts.debug);
    }

    #[test]
    fn repeated_files_and_stdin() {
        let (cfg, _) = parse_from(&["-f", "a.txt", "-f", "-", "one"]);
        assert_eq!(cfg.source, FileSource::List(vec!["a.txt".into(), "-".into()]));
    }

    #[test]
    fn run_dropped_with_line_output() {
        let (cfg, _) = parse_from(&["-r", "echo", "one"]);
        assert_eq!(cfg.run_command(), Some("echo"));
        let (cfg, _) = parse_from(&["-r", "echo", "-l", "one"]);
        assert_eq!(cfg.run_command(), None);
        let (cfg, _) = parse_from(&["-r", "echo", "-p", "one"]);
        assert_eq!(cfg.run_command(), None);
    }

    #[test]
    fn context_must_be_a_count() {
        let argv = ["pfind", "-c", "-1", "one"];
        assert!(build_cli().try_get_matches_from(argv).is_err());
        let (cfg, _) = parse_from(&["-p", "-c", "3", "five"]);
        assert_eq!(cfg.context, 3);
    }
}
