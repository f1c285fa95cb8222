use std::ffi::OsString;
use std::fs::{self, File};
use std::path::{Path, PathBuf};

use tracing::debug;
use walkdir::WalkDir;

use crate::error::{AccessError, WalkError};
use crate::regex_utils::Patterns;

/// Check that `path` exists, is not a dangling symlink and can be opened.
pub fn check_access(path: &Path) -> Result<(), AccessError> {
    let meta = fs::symlink_metadata(path).map_err(|_| AccessError::Missing(path.into()))?;
    if meta.file_type().is_symlink() && fs::metadata(path).is_err() {
        return Err(AccessError::BrokenSymlink(path.into()));
    }
    if path.is_dir() {
        fs::read_dir(path).map_err(|_| AccessError::UnreadableDirectory(path.into()))?;
    } else {
        File::open(path).map_err(|_| AccessError::UnreadableFile(path.into()))?;
    }
    Ok(())
}

/// One directory's worth of traversal output.
///
/// Names are kept as they are on disk. Patterns see their lossy UTF-8 form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WalkEntry {
    pub path: PathBuf,
    /// Immediate subdirectories that survived the skip-dirs rule, sorted by name.
    pub dirs: Vec<OsString>,
    /// Immediate files that survived the skip-files rule and match the name pattern.
    pub files: Vec<OsString>,
}

/// Pre-order, depth-first directory walk driven by an explicit stack.
///
/// Each directory is yielded before any of its subdirectories. Symlinked
/// directories are listed in `dirs` but never descended into. A directory that
/// cannot be read yields an error and its subtree is dropped.
pub struct Walker<'a> {
    patterns: &'a Patterns,
    stack: Vec<PathBuf>,
}

impl<'a> Walker<'a> {
    pub fn new(patterns: &'a Patterns, root: impl Into<PathBuf>) -> Self {
        Self {
            patterns,
            stack: vec![root.into()],
        }
    }

    fn visit(&self, dir: &Path) -> Result<WalkEntry, WalkError> {
        debug!(dir = %dir.display(), "walk");
        check_access(dir)?;

        let mut dirs = Vec::new();
        let mut files = Vec::new();
        let children = WalkDir::new(dir)
            .min_depth(1)
            .max_depth(1)
            .sort_by_file_name();
        for child in children {
            let child = child.map_err(|source| WalkError::List {
                path: dir.to_path_buf(),
                source,
            })?;
            let name = child.file_name();
            let shown = name.to_string_lossy();
            if child.path().is_dir() {
                if self.patterns.skips_dir(&shown) {
                    debug!(name = %shown, "skipping dir");
                } else {
                    dirs.push(name.to_os_string());
                }
            } else if self.patterns.keeps_file(&shown) {
                files.push(name.to_os_string());
            } else {
                debug!(name = %shown, "skipping file");
            }
        }

        Ok(WalkEntry {
            path: dir.to_path_buf(),
            dirs,
            files,
        })
    }
}

impl Iterator for Walker<'_> {
    type Item = Result<WalkEntry, WalkError>;

    fn next(&mut self) -> Option<Self::Item> {
        let dir = self.stack.pop()?;
        let entry = match self.visit(&dir) {
            Ok(entry) => entry,
            Err(err) => return Some(Err(err)),
        };
        // Reverse so the first name is popped first.
        for name in entry.dirs.iter().rev() {
            let sub = dir.join(name);
            if !sub.is_symlink() {
                self.stack.push(sub);
            }
        }
        Some(Ok(entry))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    fn patterns(filename: &str) -> Patterns {
        Patterns::compile(&Config {
            filename_pattern: Some(filename.into()),
            ..Default::default()
        })
        .unwrap()
    }

    #[test]
    fn missing_path() {
        let td = tempfile::tempdir().unwrap();
        let p = td.path().join("nope");
        assert_eq!(check_access(&p), Err(AccessError::Missing(p)));
    }

    #[cfg(unix)]
    #[test]
    fn dangling_symlink() {
        let td = tempfile::tempdir().unwrap();
        let link = td.path().join("link");
        std::os::unix::fs::symlink(td.path().join("target"), &link).unwrap();
        assert_eq!(check_access(&link), Err(AccessError::BrokenSymlink(link)));
    }

    #[test]
    fn pre_order_with_sorted_children() {
        let td = tempfile::tempdir().unwrap();
        let root = td.path();
        fs::create_dir_all(root.join("b/inner")).unwrap();
        fs::create_dir_all(root.join("a")).unwrap();
        fs::write(root.join("z.txt"), "").unwrap();
        fs::write(root.join("y.txt"), "").unwrap();
        fs::write(root.join("a/a.txt"), "").unwrap();
        fs::write(root.join("b/inner/deep.txt"), "").unwrap();

        let pats = patterns("txt");
        let entries: Vec<WalkEntry> = Walker::new(&pats, root).map(Result::unwrap).collect();
        let order: Vec<PathBuf> = entries.iter().map(|e| e.path.clone()).collect();
        assert_eq!(
            order,
            vec![
                root.to_path_buf(),
                root.join("a"),
                root.join("b"),
                root.join("b/inner"),
            ]
        );
        assert_eq!(entries[0].dirs, vec!["a", "b"]);
        assert_eq!(entries[0].files, vec!["y.txt", "z.txt"]);
        assert_eq!(entries[3].files, vec!["deep.txt"]);
    }

    #[test]
    fn skip_rules_apply_before_name_match() {
        let td = tempfile::tempdir().unwrap();
        let root = td.path();
        fs::create_dir_all(root.join(".git")).unwrap();
        fs::create_dir_all(root.join("__pycache__")).unwrap();
        fs::write(root.join(".git/config.py"), "").unwrap();
        fs::write(root.join("mod.py"), "").unwrap();
        fs::write(root.join(".hidden.py"), "").unwrap();
        fs::write(root.join("notes.md"), "").unwrap();

        let pats = patterns("py");
        let entries: Vec<WalkEntry> = Walker::new(&pats, root).map(Result::unwrap).collect();
        assert_eq!(entries.len(), 1);
        assert!(entries[0].dirs.is_empty());
        assert_eq!(entries[0].files, vec!["mod.py"]);
    }

    #[cfg(unix)]
    #[test]
    fn symlinked_dirs_are_listed_not_followed() {
        let td = tempfile::tempdir().unwrap();
        let root = td.path();
        fs::create_dir_all(root.join("real")).unwrap();
        fs::write(root.join("real/f.txt"), "").unwrap();
        std::os::unix::fs::symlink(root.join("real"), root.join("alias")).unwrap();

        let pats = patterns("txt");
        let entries: Vec<WalkEntry> = Walker::new(&pats, root).map(Result::unwrap).collect();
        assert_eq!(entries[0].dirs, vec!["alias", "real"]);
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[1].path, root.join("real"));
    }

    #[cfg(unix)]
    #[test]
    fn non_utf8_names_are_kept_verbatim() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let td = tempfile::tempdir().unwrap();
        let root = td.path();
        let dir = OsStr::from_bytes(b"d\xe9");
        let file = OsStr::from_bytes(b"caf\xe9.txt");
        fs::create_dir(root.join(dir)).unwrap();
        fs::write(root.join(dir).join("a.txt"), "").unwrap();
        fs::write(root.join(file), "").unwrap();

        let pats = patterns("txt");
        let entries: Vec<WalkEntry> = Walker::new(&pats, root).map(Result::unwrap).collect();
        assert_eq!(entries[0].dirs, vec![dir.to_os_string()]);
        assert_eq!(entries[0].files, vec![file.to_os_string()]);
        assert_eq!(entries[1].path, root.join(dir));
        assert_eq!(entries[1].files, vec!["a.txt"]);
    }

    #[test]
    fn missing_root_yields_one_error() {
        let td = tempfile::tempdir().unwrap();
        let pats = patterns("txt");
        let mut walker = Walker::new(&pats, td.path().join("gone"));
        assert!(matches!(
            walker.next(),
            Some(Err(WalkError::Access(AccessError::Missing(_))))
        ));
        assert!(walker.next().is_none());
    }
}
