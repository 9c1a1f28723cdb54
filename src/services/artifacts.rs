//! Artifact files: parsing their names, staging them for transfer, persisting
//! received ones and cleaning up after a delivered batch.

use std::{
    io::ErrorKind,
    path::{Path, PathBuf},
};

use thiserror::Error;
use tokio::fs;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::dto::transfer::ArtifactPayload;

/// What an artifact contains, derived from its extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactKind {
    /// Per-round CSV telemetry; the only kind charts are rendered for.
    Telemetry,
    /// Free-text story log.
    Story,
    /// Anything else; stored but never rendered.
    Other,
}

/// An artifact file name parsed once into typed parts.
///
/// `"12_@zlj.csv"` has sequence number 12, label `zlj` and stem `12_@zlj`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactDescriptor {
    /// Name as received.
    pub filename: String,
    /// File name without its extension; derived outputs are keyed by it.
    pub stem: String,
    /// Leading `<number>_` when the prefix is numeric.
    pub sequence_number: Option<u64>,
    /// Canonical label with any `<number>_@` or `<number>_` prefix removed.
    pub label: String,
    /// Kind derived from the extension.
    pub kind: ArtifactKind,
}

/// Per-file failure. Logged and counted, never fatal for a batch.
#[derive(Debug, Error)]
pub enum ArtifactError {
    /// The name is empty or could leave the target directory.
    #[error("invalid artifact name `{filename}`: {reason}")]
    InvalidName {
        /// Rejected name.
        filename: String,
        /// Why it was rejected.
        reason: &'static str,
    },
    /// A staged file could not be read.
    #[error("failed to read artifact `{path}`")]
    Read {
        /// Staged file.
        path: PathBuf,
        /// Underlying IO error.
        #[source]
        source: std::io::Error,
    },
    /// A received file could not be written.
    #[error("failed to write artifact `{path}`")]
    Write {
        /// Target file.
        path: PathBuf,
        /// Underlying IO error.
        #[source]
        source: std::io::Error,
    },
}

impl ArtifactDescriptor {
    /// Parse a bare file name. Anything that could escape the target
    /// directory is refused.
    pub fn parse(filename: &str) -> Result<Self, ArtifactError> {
        let invalid = |reason| ArtifactError::InvalidName {
            filename: filename.to_string(),
            reason,
        };

        if filename.is_empty() {
            return Err(invalid("empty name"));
        }
        if filename.contains(['/', '\\']) || filename == "." || filename == ".." {
            return Err(invalid("path components are not allowed"));
        }
        if filename.chars().any(char::is_control) {
            return Err(invalid("control characters are not allowed"));
        }

        let (stem, extension) = match filename.rsplit_once('.') {
            Some((stem, ext)) if !stem.is_empty() => (stem, Some(ext)),
            _ => (filename, None),
        };

        let kind = match extension.map(str::to_ascii_lowercase).as_deref() {
            Some("csv") => ArtifactKind::Telemetry,
            Some("txt") => ArtifactKind::Story,
            _ => ArtifactKind::Other,
        };

        let (sequence_number, label) = split_sequence_prefix(stem);

        Ok(Self {
            filename: filename.to_string(),
            stem: stem.to_string(),
            sequence_number,
            label: label.to_string(),
            kind,
        })
    }
}

fn split_sequence_prefix(stem: &str) -> (Option<u64>, &str) {
    let Some((prefix, rest)) = stem.split_once('_') else {
        return (None, stem);
    };
    let Ok(number) = prefix.parse::<u64>() else {
        return (None, stem);
    };
    let label = rest.strip_prefix('@').unwrap_or(rest);
    (Some(number), label)
}

/// A staged file read into memory, ready to travel in an envelope.
#[derive(Debug, Clone)]
pub struct StagedFile {
    /// Location in the staging directory, deleted after delivery.
    pub path: PathBuf,
    /// Wire form of the file.
    pub payload: ArtifactPayload,
}

/// Read every staged file whose extension is in `extensions`.
///
/// A missing directory yields nothing. Unreadable files are logged and left
/// out so they stay staged for the next attempt.
pub async fn collect_staged(dir: &Path, extensions: &[String]) -> Vec<StagedFile> {
    let mut entries = match fs::read_dir(dir).await {
        Ok(entries) => entries,
        Err(err) if err.kind() == ErrorKind::NotFound => {
            debug!(dir = %dir.display(), "staging directory missing; no files to send");
            return Vec::new();
        }
        Err(err) => {
            warn!(dir = %dir.display(), error = %err, "failed to list staging directory");
            return Vec::new();
        }
    };

    let mut staged = Vec::new();
    loop {
        let entry = match entries.next_entry().await {
            Ok(Some(entry)) => entry,
            Ok(None) => break,
            Err(err) => {
                warn!(dir = %dir.display(), error = %err, "failed to list staging directory");
                break;
            }
        };

        let path = entry.path();
        let Some(filename) = path.file_name().and_then(|name| name.to_str()) else {
            continue;
        };
        let matches_extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_ascii_lowercase())
            .is_some_and(|ext| extensions.iter().any(|wanted| *wanted == ext));
        if !matches_extension {
            continue;
        }
        match entry.file_type().await {
            Ok(file_type) if file_type.is_file() => {}
            _ => continue,
        }

        match fs::read(&path).await {
            Ok(content) => staged.push(StagedFile {
                payload: ArtifactPayload {
                    filename: filename.to_string(),
                    content: Some(content),
                },
                path,
            }),
            Err(source) => {
                let err = ArtifactError::Read { path, source };
                warn!(error = %err, "skipping unreadable staged file");
            }
        }
    }

    staged.sort_by(|a, b| a.payload.filename.cmp(&b.payload.filename));
    info!(count = staged.len(), dir = %dir.display(), "collected staged files");
    staged
}

/// Delete staged files that were part of a delivered batch. Returns how many
/// were removed.
pub async fn remove_staged(files: &[StagedFile]) -> usize {
    let mut removed = 0;
    for file in files {
        match fs::remove_file(&file.path).await {
            Ok(()) => removed += 1,
            Err(err) => warn!(
                path = %file.path.display(),
                error = %err,
                "failed to delete transferred staged file"
            ),
        }
    }
    removed
}

/// Outcome of writing a batch of received artifacts.
#[derive(Debug, Default)]
pub struct PersistReport {
    /// Files written, in arrival order.
    pub saved: Vec<ArtifactDescriptor>,
    /// Files rejected by name or content, or not written.
    pub failed: usize,
}

/// Write received artifacts into `dir`, each one through a uniquely named
/// temp file and a rename, so concurrent deliveries of the same name end up
/// with one complete file (last write wins).
pub async fn persist_received(dir: &Path, payloads: Vec<ArtifactPayload>) -> PersistReport {
    let mut report = PersistReport::default();
    if payloads.is_empty() {
        return report;
    }

    if let Err(source) = fs::create_dir_all(dir).await {
        let err = ArtifactError::Write {
            path: dir.to_path_buf(),
            source,
        };
        warn!(error = %err, count = payloads.len(), "cannot create files directory");
        report.failed = payloads.len();
        return report;
    }

    for payload in payloads {
        let descriptor = match ArtifactDescriptor::parse(&payload.filename) {
            Ok(descriptor) => descriptor,
            Err(err) => {
                warn!(error = %err, "rejecting received artifact");
                report.failed += 1;
                continue;
            }
        };

        let Some(content) = payload.content else {
            warn!(filename = %descriptor.filename, "undecodable artifact content");
            report.failed += 1;
            continue;
        };

        match write_atomic(dir, &descriptor.filename, &content).await {
            Ok(()) => {
                debug!(filename = %descriptor.filename, bytes = content.len(), "saved artifact");
                report.saved.push(descriptor);
            }
            Err(err) => {
                warn!(error = %err, "failed to save received artifact");
                report.failed += 1;
            }
        }
    }

    report
}

async fn write_atomic(dir: &Path, filename: &str, content: &[u8]) -> Result<(), ArtifactError> {
    let target = dir.join(filename);
    let temp = dir.join(format!(".{filename}.{}.part", Uuid::new_v4().simple()));
    let write_err = |source| ArtifactError::Write {
        path: target.clone(),
        source,
    };

    fs::write(&temp, content).await.map_err(write_err)?;
    if let Err(source) = fs::rename(&temp, &target).await {
        let _ = fs::remove_file(&temp).await;
        return Err(write_err(source));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    #[test]
    fn parses_sequence_and_label() {
        let descriptor = ArtifactDescriptor::parse("12_@zlj.csv").unwrap();
        assert_eq!(descriptor.sequence_number, Some(12));
        assert_eq!(descriptor.label, "zlj");
        assert_eq!(descriptor.stem, "12_@zlj");
        assert_eq!(descriptor.kind, ArtifactKind::Telemetry);

        let descriptor = ArtifactDescriptor::parse("3_Dr. Paul Farmer.TXT").unwrap();
        assert_eq!(descriptor.sequence_number, Some(3));
        assert_eq!(descriptor.label, "Dr. Paul Farmer");
        assert_eq!(descriptor.kind, ArtifactKind::Story);
    }

    #[test]
    fn non_numeric_prefix_is_part_of_label() {
        let descriptor = ArtifactDescriptor::parse("player_stats.csv").unwrap();
        assert_eq!(descriptor.sequence_number, None);
        assert_eq!(descriptor.label, "player_stats");

        let descriptor = ArtifactDescriptor::parse("Zoe.csv").unwrap();
        assert_eq!(descriptor.label, "Zoe");
    }

    #[test]
    fn path_like_names_are_rejected() {
        assert!(ArtifactDescriptor::parse("../evil.csv").is_err());
        assert!(ArtifactDescriptor::parse("a\\b.csv").is_err());
        assert!(ArtifactDescriptor::parse("..").is_err());
        assert!(ArtifactDescriptor::parse("").is_err());
    }

    #[tokio::test]
    async fn collects_only_wanted_extensions() {
        let tmp = TempDir::new().unwrap();
        std::fs::write(tmp.path().join("1_@a.csv"), b"round\n").unwrap();
        std::fs::write(tmp.path().join("1_@a.TXT"), b"story").unwrap();
        std::fs::write(tmp.path().join("notes.md"), b"skip").unwrap();
        std::fs::create_dir(tmp.path().join("dir.csv")).unwrap();

        let staged = collect_staged(tmp.path(), &["csv".into(), "txt".into()]).await;
        let names = staged
            .iter()
            .map(|file| file.payload.filename.as_str())
            .collect::<Vec<_>>();
        assert_eq!(names, vec!["1_@a.TXT", "1_@a.csv"]);
    }

    #[tokio::test]
    async fn missing_staging_directory_is_empty() {
        let tmp = TempDir::new().unwrap();
        let staged = collect_staged(&tmp.path().join("absent"), &["csv".into()]).await;
        assert!(staged.is_empty());
    }

    #[tokio::test]
    async fn persist_skips_bad_names_and_keeps_going() {
        let tmp = TempDir::new().unwrap();
        let dir = tmp.path().join("received");
        let report = persist_received(
            &dir,
            vec![
                ArtifactPayload {
                    filename: "../escape.csv".into(),
                    content: Some(b"x".to_vec()),
                },
                ArtifactPayload {
                    filename: "1_@undecoded.csv".into(),
                    content: None,
                },
                ArtifactPayload {
                    filename: "0_@zlj.csv".into(),
                    content: Some(b"round,money\n".to_vec()),
                },
            ],
        )
        .await;

        assert_eq!(report.failed, 2);
        assert_eq!(report.saved.len(), 1);
        assert_eq!(
            std::fs::read(dir.join("0_@zlj.csv")).unwrap(),
            b"round,money\n"
        );
        assert!(!tmp.path().join("escape.csv").exists());
        assert!(!dir.join("1_@undecoded.csv").exists());
    }

    #[tokio::test]
    async fn remove_staged_counts_deleted_files() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("0_@a.csv");
        std::fs::write(&path, b"x").unwrap();
        let files = vec![
            StagedFile {
                path: path.clone(),
                payload: ArtifactPayload {
                    filename: "0_@a.csv".into(),
                    content: Some(b"x".to_vec()),
                },
            },
            StagedFile {
                path: tmp.path().join("gone.csv"),
                payload: ArtifactPayload {
                    filename: "gone.csv".into(),
                    content: None,
                },
            },
        ];

        assert_eq!(remove_staged(&files).await, 1);
        assert!(!path.exists());
    }
}
