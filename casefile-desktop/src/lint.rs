//! Offline checks for authored dialogue.
//!
//! `*.cfm` files hold one line of markup per row (`#` starts a comment);
//! `*.toml` files are whole encounters and must build.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use log::{debug, info};
use walkdir::WalkDir;

use casefile_core::config::{DialogueConfig, EncounterConfig};

use crate::content;

#[derive(Debug, Default)]
pub struct LintReport {
    pub files: usize,
    pub lines: usize,
    pub errors: Vec<String>,
}

impl LintReport {
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }
}

pub fn lint_dir(root: impl AsRef<Path>, dialogue: &DialogueConfig) -> Result<LintReport> {
    let root = root.as_ref();
    info!("Linting dialogue under {:?}", root);
    if !root.exists() {
        anyhow::bail!("Nothing to lint at {:?}", root);
    }

    let mut report = LintReport::default();
    let mut paths: Vec<PathBuf> = WalkDir::new(root)
        .into_iter()
        .filter_map(|e| e.ok())
        .map(|e| e.into_path())
        .filter(|p| p.is_file())
        .collect();
    paths.sort();

    for path in paths {
        match path.extension().and_then(|e| e.to_str()) {
            Some("cfm") => lint_markup_file(&path, dialogue, &mut report)?,
            Some("toml") => lint_content_file(&path, dialogue, &mut report),
            _ => continue,
        }
        report.files += 1;
    }

    info!(
        "Lint done. Files: {}, Lines: {}, Errors: {}",
        report.files,
        report.lines,
        report.errors.len()
    );
    Ok(report)
}

fn lint_markup_file(path: &Path, dialogue: &DialogueConfig, report: &mut LintReport) -> Result<()> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("Failed to read markup: {:?}", path))?;
    debug!("Checking {:?}", path);

    let options = casefile_markup::ParseOptions { auto_aside: dialogue.auto_aside };
    for (n, line) in raw.lines().enumerate() {
        let line = line.trim_end();
        if line.trim().is_empty() || line.trim_start().starts_with('#') {
            continue;
        }
        report.lines += 1;
        if let Err(e) = casefile_markup::parse_with(line, &options) {
            report.errors.push(format!("{}:{}: {}", path.display(), n + 1, e));
        }
    }
    Ok(())
}

fn lint_content_file(path: &Path, dialogue: &DialogueConfig, report: &mut LintReport) {
    let result = content::load(path).and_then(|file| {
        report.lines += file.line_count();
        file.build(dialogue, EncounterConfig::default())
    });
    if let Err(e) = result {
        report.errors.push(format!("{}: {:#}", path.display(), e));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn reports_bad_lines_with_location() {
        let dir = tempdir().unwrap();
        fs::write(
            dir.path().join("a.cfm"),
            "# prologue\nHello[PAUSE=100].\n\n[EMOTION=]nope\n",
        )
        .unwrap();
        fs::create_dir(dir.path().join("chapter")).unwrap();
        fs::write(dir.path().join("chapter/b.cfm"), "(fine)\n[EMPHASIS]open").unwrap();
        fs::write(dir.path().join("notes.txt"), "[NOT A TAG").unwrap();

        let report = lint_dir(dir.path(), &DialogueConfig::default()).unwrap();
        assert_eq!(report.files, 2);
        assert_eq!(report.lines, 4);
        assert_eq!(report.errors.len(), 2);
        assert!(report.errors[0].contains("a.cfm:4:"));
        assert!(report.errors[1].contains("b.cfm:2:"));
    }

    #[test]
    fn content_files_must_build() {
        let dir = tempdir().unwrap();
        fs::write(
            dir.path().join("scene.toml"),
            "[[topic]]\nid = \"t\"\nlabel = \"T\"\nscript = \"nowhere\"\n",
        )
        .unwrap();
        let report = lint_dir(dir.path(), &DialogueConfig::default()).unwrap();
        assert!(!report.is_clean());
        assert!(report.errors[0].contains("unknown script 'nowhere'"));
    }

    #[test]
    fn missing_root_is_an_error() {
        let dir = tempdir().unwrap();
        assert!(lint_dir(dir.path().join("gone"), &DialogueConfig::default()).is_err());
    }
}
