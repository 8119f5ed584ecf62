//! Choosing the zip to upload
//!
//! An explicit path wins when it exists. Otherwise zips in the working
//! directory are offered, packager output first and most recently changed
//! next, and as a last resort the user types a path.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use std::time::SystemTime;

use colored::Colorize;
use regex::Regex;
use tracing::debug;

use crate::cli::prompts::Prompter;
use crate::constants::package;
use crate::errors::Result;

const NONE_OF_THE_ABOVE: &str = "None of the files listed";

fn zip_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(package::ZIP_PATTERN).expect("zip regex"))
}

fn packager_zip_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(package::PACKAGER_ZIP_PATTERN).expect("packager zip regex"))
}

/// A zip found in the working directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ZipCandidate {
    pub name: String,
    pub changed: SystemTime,
}

impl ZipCandidate {
    fn from_packager(&self) -> bool {
        packager_zip_regex().is_match(&self.name)
    }
}

/// Order candidates: packager output first, then most recently changed
pub fn sort_candidates(mut candidates: Vec<ZipCandidate>) -> Vec<String> {
    candidates.sort_by(|a, b| {
        b.from_packager()
            .cmp(&a.from_packager())
            .then_with(|| b.changed.cmp(&a.changed))
    });
    candidates.into_iter().map(|c| c.name).collect()
}

/// Zip files directly inside `dir`
pub fn zips_in_dir(dir: &Path) -> std::io::Result<Vec<ZipCandidate>> {
    let mut candidates = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let name = entry.file_name().to_string_lossy().into_owned();
        if !zip_regex().is_match(&name) {
            continue;
        }
        let metadata = entry.metadata()?;
        if !metadata.is_file() {
            continue;
        }
        candidates.push(ZipCandidate {
            name,
            changed: metadata.modified().unwrap_or(SystemTime::UNIX_EPOCH),
        });
    }
    Ok(candidates)
}

/// Absolute path of `path` if a file exists there; reports the miss otherwise
fn existing_file(path: &Path, cwd: &Path) -> Option<PathBuf> {
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        cwd.join(path)
    };

    if absolute.exists() {
        Some(absolute)
    } else {
        eprintln!("{}", format!("No file found at {}", absolute.display()).red());
        None
    }
}

/// Work out which zip to upload
///
/// # Errors
///
/// Returns `AppError::Io` if the working directory cannot be listed and
/// `AppError::Prompt` if a prompt fails
pub fn resolve_zip_path(
    arg: Option<&Path>,
    cwd: &Path,
    prompter: &dyn Prompter,
) -> Result<PathBuf> {
    if let Some(path) = arg.and_then(|arg| existing_file(arg, cwd)) {
        return Ok(path);
    }

    let zips = sort_candidates(zips_in_dir(cwd)?);
    debug!("Found {} zip files in {}", zips.len(), cwd.display());

    let chosen = match zips.as_slice() {
        [] => None,
        [only] => {
            let question = format!(
                "The zip file {} was found in the current directory. \
                 Is this the zip file you would like to upload?",
                only
            );
            prompter.confirm(&question, true)?.then(|| only.clone())
        }
        many => {
            let mut items = many.to_vec();
            items.push(NONE_OF_THE_ABOVE.to_string());
            let index = prompter.select(
                "Which of the following zip files would you like to upload?",
                &items,
            )?;
            many.get(index).cloned()
        }
    };

    if let Some(name) = chosen {
        return Ok(cwd.join(name));
    }

    loop {
        let entered = prompter.input(
            "Please enter the path (relative or absolute) to the zip file you would like to upload.",
        )?;
        if let Some(path) = existing_file(Path::new(&entered), cwd) {
            return Ok(path);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::prompts::testing::{Answer, ScriptedPrompter};
    use std::time::Duration;
    use tempfile::TempDir;

    fn candidate(name: &str, age_secs: u64) -> ZipCandidate {
        ZipCandidate {
            name: name.to_string(),
            changed: SystemTime::UNIX_EPOCH + Duration::from_secs(1_000_000 - age_secs),
        }
    }

    #[test]
    fn test_packager_output_sorts_first_then_newest() {
        let sorted = sort_candidates(vec![
            candidate("newest.zip", 1),
            candidate("package-old-1.0.0.zip", 500),
            candidate("older.zip", 100),
            candidate("package-new-1.0.1.zip", 10),
        ]);

        assert_eq!(
            sorted,
            vec![
                "package-new-1.0.1.zip",
                "package-old-1.0.0.zip",
                "newest.zip",
                "older.zip"
            ]
        );
    }

    #[test]
    fn test_existing_argument_is_used_without_prompting() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("my.zip"), b"zip").unwrap();
        let prompter = ScriptedPrompter::default();

        let path = resolve_zip_path(Some(Path::new("my.zip")), dir.path(), &prompter).unwrap();

        assert_eq!(path, dir.path().join("my.zip"));
        assert!(prompter.asked().is_empty());
    }

    #[test]
    fn test_single_zip_is_confirmed() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("package-hello-1.0.0.zip"), b"zip").unwrap();
        fs::write(dir.path().join("notes.txt"), b"text").unwrap();
        let prompter = ScriptedPrompter::new(vec![Answer::Yes]);

        let path = resolve_zip_path(None, dir.path(), &prompter).unwrap();

        assert_eq!(path, dir.path().join("package-hello-1.0.0.zip"));
        assert_eq!(prompter.asked().len(), 1);
        assert!(prompter.asked()[0].contains("package-hello-1.0.0.zip"));
    }

    #[test]
    fn test_missing_argument_falls_back_to_listing() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("a.zip"), b"zip").unwrap();
        fs::write(dir.path().join("package-b-1.0.0.zip"), b"zip").unwrap();
        let prompter = ScriptedPrompter::new(vec![Answer::Choice(0)]);

        let path = resolve_zip_path(Some(Path::new("missing.zip")), dir.path(), &prompter)
            .unwrap();

        assert_eq!(path, dir.path().join("package-b-1.0.0.zip"));
    }

    #[test]
    fn test_typed_path_is_asked_again_until_it_exists() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("a.zip"), b"zip").unwrap();
        fs::write(dir.path().join("b.zip"), b"zip").unwrap();
        let prompter = ScriptedPrompter::new(vec![
            Answer::Choice(2),
            Answer::Text("nope.zip".to_string()),
            Answer::Text("b.zip".to_string()),
        ]);

        let path = resolve_zip_path(None, dir.path(), &prompter).unwrap();

        assert_eq!(path, dir.path().join("b.zip"));
        assert_eq!(prompter.asked().len(), 3);
    }
}
