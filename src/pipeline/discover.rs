//! Discovery: turn an input directory into the list of writeups to render.
//!
//! Two layouts are recognised, at most two levels deep:
//!
//! ```text
//! single category                 collection of categories
//! forensics/                      ctf-2025/
//! ├── chal1/README.md             ├── forensics/chal1/README.md
//! └── chal2/README.md             └── web/chal2/README.md
//! ```
//!
//! The first applies when the root's own name is a configured category
//! label; anything else is treated as a collection. Hidden directories
//! (leading `.`) are skipped at every level. Entries are visited in file
//! name order so runs are reproducible.

use crate::config::ConverterConfig;
use crate::error::WriteupsError;
use crate::output::Challenge;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// File every challenge directory must contain.
pub const README_FILE: &str = "README.md";

/// Validate the input path before any work starts.
pub fn resolve_input_dir(path: &Path) -> Result<PathBuf, WriteupsError> {
    if !path.exists() {
        return Err(WriteupsError::InputNotFound {
            path: path.to_path_buf(),
        });
    }
    if !path.is_dir() {
        return Err(WriteupsError::InputNotADirectory {
            path: path.to_path_buf(),
        });
    }
    Ok(path.to_path_buf())
}

/// Enumerate the writeups under `root`.
///
/// An empty result is not an error; the caller decides what "nothing to do"
/// means.
pub fn discover(root: &Path, config: &ConverterConfig) -> Result<Vec<Challenge>, WriteupsError> {
    let root_name = dir_name(root);
    let challenges = match root_name {
        Some(ref name) if config.is_category(name) => {
            debug!("'{}' is a category directory", name);
            scan_category(root, name)?
        }
        _ => {
            let mut all = Vec::new();
            for category_dir in visible_subdirs(root)? {
                let Some(category) = dir_name(&category_dir) else {
                    continue;
                };
                all.extend(scan_category(&category_dir, &category)?);
            }
            all
        }
    };

    info!(
        "Discovered {} writeups under {}",
        challenges.len(),
        root.display()
    );
    Ok(challenges)
}

/// Every visible subdirectory of `dir` holding a README becomes a challenge
/// in `category`.
fn scan_category(dir: &Path, category: &str) -> Result<Vec<Challenge>, WriteupsError> {
    let mut found = Vec::new();
    for challenge_dir in visible_subdirs(dir)? {
        let readme = challenge_dir.join(README_FILE);
        if !readme.is_file() {
            continue;
        }
        let Some(name) = dir_name(&challenge_dir) else {
            continue;
        };
        debug!("Found {}/{}", category, name);
        found.push(Challenge {
            category: category.to_string(),
            name,
            source_dir: challenge_dir,
            readme,
        });
    }
    Ok(found)
}

/// Immediate, non-hidden subdirectories of `dir`, sorted by name.
fn visible_subdirs(dir: &Path) -> Result<Vec<PathBuf>, WriteupsError> {
    let entries = std::fs::read_dir(dir).map_err(|e| WriteupsError::DirectoryUnreadable {
        path: dir.to_path_buf(),
        source: e,
    })?;

    let mut dirs: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok())
        .filter(|entry| !entry.file_name().to_string_lossy().starts_with('.'))
        .map(|entry| entry.path())
        .filter(|path| path.is_dir())
        .collect();
    dirs.sort();
    Ok(dirs)
}

/// Final path component as a string. Falls back to the canonical path for
/// `.`/`..` style roots that have no name of their own.
fn dir_name(path: &Path) -> Option<String> {
    match path.file_name() {
        Some(name) => Some(name.to_string_lossy().into_owned()),
        None => path
            .canonicalize()
            .ok()
            .and_then(|p| p.file_name().map(|n| n.to_string_lossy().into_owned())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn writeup(root: &Path, rel: &str) {
        let dir = root.join(rel);
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join(README_FILE), "# writeup\n").unwrap();
    }

    fn pairs(found: &[Challenge]) -> Vec<(String, String)> {
        found
            .iter()
            .map(|c| (c.category.clone(), c.name.clone()))
            .collect()
    }

    #[test]
    fn collection_mode_two_levels() {
        let tmp = TempDir::new().unwrap();
        let root = tmp.path().join("repo");
        writeup(&root, "forensics/chal1");
        writeup(&root, "web/chal2");

        let found = discover(&root, &ConverterConfig::default()).unwrap();
        assert_eq!(
            pairs(&found),
            vec![
                ("forensics".to_string(), "chal1".to_string()),
                ("web".to_string(), "chal2".to_string()),
            ]
        );
        assert_eq!(found[0].readme, root.join("forensics/chal1/README.md"));
        assert_eq!(found[0].source_dir, root.join("forensics/chal1"));
    }

    #[test]
    fn single_category_mode_uses_root_name() {
        let tmp = TempDir::new().unwrap();
        let root = tmp.path().join("forensics");
        writeup(&root, "memdump");
        writeup(&root, "pcap one");

        let found = discover(&root, &ConverterConfig::default()).unwrap();
        assert_eq!(
            pairs(&found),
            vec![
                ("forensics".to_string(), "memdump".to_string()),
                ("forensics".to_string(), "pcap one".to_string()),
            ]
        );
    }

    #[test]
    fn directories_without_readme_are_ignored() {
        let tmp = TempDir::new().unwrap();
        let root = tmp.path().join("repo");
        writeup(&root, "crypto/rsa");
        fs::create_dir_all(root.join("crypto/unsolved")).unwrap();
        fs::create_dir_all(root.join("crypto/readme_is_dir/README.md")).unwrap();
        fs::write(root.join("crypto/notes.txt"), "not a dir").unwrap();

        let found = discover(&root, &ConverterConfig::default()).unwrap();
        assert_eq!(pairs(&found), vec![("crypto".into(), "rsa".into())]);
    }

    #[test]
    fn hidden_directories_are_skipped() {
        let tmp = TempDir::new().unwrap();
        let root = tmp.path().join("repo");
        writeup(&root, ".git/objects");
        writeup(&root, "pwn/.draft");
        writeup(&root, "pwn/heap");

        let found = discover(&root, &ConverterConfig::default()).unwrap();
        assert_eq!(pairs(&found), vec![("pwn".into(), "heap".into())]);
    }

    #[test]
    fn no_recursion_beyond_two_levels() {
        let tmp = TempDir::new().unwrap();
        let root = tmp.path().join("repo");
        writeup(&root, "event/web/deep");
        // Single-category root: second level is not scanned.
        let cat = tmp.path().join("misc");
        writeup(&cat, "group/nested");

        assert!(discover(&root, &ConverterConfig::default()).unwrap().is_empty());
        assert!(discover(&cat, &ConverterConfig::default()).unwrap().is_empty());
    }

    #[test]
    fn readme_in_root_children_of_collection_is_not_an_item() {
        let tmp = TempDir::new().unwrap();
        let root = tmp.path().join("repo");
        // `repo/web/README.md` belongs to a category dir, not a challenge.
        writeup(&root, "web");
        assert!(discover(&root, &ConverterConfig::default()).unwrap().is_empty());
    }

    #[test]
    fn custom_categories_switch_mode() {
        let tmp = TempDir::new().unwrap();
        let root = tmp.path().join("osint");
        writeup(&root, "geoguess");

        let default = discover(&root, &ConverterConfig::default()).unwrap();
        assert!(default.is_empty());

        let config = ConverterConfig::builder()
            .categories(["osint"])
            .build()
            .unwrap();
        let found = discover(&root, &config).unwrap();
        assert_eq!(pairs(&found), vec![("osint".into(), "geoguess".into())]);
    }

    #[test]
    fn resolve_input_dir_errors() {
        let tmp = TempDir::new().unwrap();
        let missing = tmp.path().join("missing");
        assert!(matches!(
            resolve_input_dir(&missing),
            Err(WriteupsError::InputNotFound { .. })
        ));

        let file = tmp.path().join("file.md");
        fs::write(&file, "x").unwrap();
        assert!(matches!(
            resolve_input_dir(&file),
            Err(WriteupsError::InputNotADirectory { .. })
        ));

        assert!(resolve_input_dir(tmp.path()).is_ok());
    }
}
