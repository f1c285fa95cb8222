//! pfind: programmers find.
//!
//! Recursively find files whose name matches a pattern and, optionally, whose
//! contents match a second pattern. The crate provides the engine behind the
//! `pfind` binary and can be embedded as a library. The public API lets you:
//! - Configure a search via `Config` (patterns, display flags, skip rules).
//! - Compile and run it against injected output sinks (`Searcher`).
//! - Run it and capture the output as strings (`run`).
//!
//! Quick example: list files under `src` containing `TODO`
//!
//! ```no_run
//! use pfind::{Config, ExitStatus, run};
//! let cfg = Config {
//!     search_pattern: Some("TODO".into()),
//!     filename_pattern: Some("rs".into()),
//!     start_directory: "src".into(),
//!     ..Default::default()
//! };
//! let res = run(&cfg, std::io::empty()).unwrap();
//! if res.status == ExitStatus::Match {
//!     print!("{}", res.output);
//! }
//! ```
//!
//! A bare name pattern such as `rs` is a suffix match (`rs$`); anything
//! containing a regex metacharacter is used as written.

pub mod config;
pub mod error;
pub mod filetype;
pub mod fs_utils;
pub mod io_utils;
pub mod output;
pub mod regex_utils;
pub mod search;

pub use config::{Config, DisplayMode, ExitStatus, FileSource, RunResult};
pub use error::{AccessError, Error, PatternRole, WalkError};
pub use search::{RunState, Searcher, run};
