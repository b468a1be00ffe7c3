//! Write rendered artifacts to disk
//!
//! An existing file is merged, overwritten or sidestepped with a numbered
//! name, depending on configuration. Failures here skip one file and become
//! warnings; the run carries on with the next file.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::codegen::GeneratedArtifact;
use crate::config::{defaults, CodegenConfig};
use crate::context::RunContext;
use crate::error::{CodegenError, Result};
use crate::merge;

/// What happened to one artifact
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteOutcome {
    Created(PathBuf),
    Merged(PathBuf),
    Overwritten(PathBuf),
    /// Written next to an existing file under a numbered name
    Renamed(PathBuf),
    /// Dry run: nothing touched
    Planned(PathBuf),
    Skipped(PathBuf),
}

impl WriteOutcome {
    pub fn path(&self) -> &Path {
        match self {
            WriteOutcome::Created(p)
            | WriteOutcome::Merged(p)
            | WriteOutcome::Overwritten(p)
            | WriteOutcome::Renamed(p)
            | WriteOutcome::Planned(p)
            | WriteOutcome::Skipped(p) => p,
        }
    }

    /// Whether a file was written
    pub fn is_written(&self) -> bool {
        !matches!(self, WriteOutcome::Planned(_) | WriteOutcome::Skipped(_))
    }
}

/// Applies the merge / overwrite / rename policy of one configuration
pub struct ArtifactWriter<'a> {
    config: &'a CodegenConfig,
}

impl<'a> ArtifactWriter<'a> {
    pub fn new(config: &'a CodegenConfig) -> Self {
        Self { config }
    }

    /// Write one artifact. Directory and merge problems are recorded as
    /// warnings and reported as `Skipped`; only unexpected I/O fails.
    pub fn write(&self, artifact: &GeneratedArtifact, ctx: &mut RunContext) -> Result<WriteOutcome> {
        let target = artifact.target_project.join(artifact.relative_path());

        if self.config.dry_run {
            debug!("Dry run: would write {}", target.display());
            return Ok(WriteOutcome::Planned(target));
        }

        if let Err(e) = ensure_directory(&target) {
            ctx.warn(format!("{}; skipping {}", e, artifact.file_name));
            return Ok(WriteOutcome::Skipped(target));
        }

        if !target.exists() {
            fs::write(&target, artifact.render())?;
            debug!("Created {}", target.display());
            return Ok(WriteOutcome::Created(target));
        }

        if self.config.merge {
            let existing = fs::read_to_string(&target)?;
            return match merge::merge(&existing, artifact, &artifact.file_name) {
                Ok(merged) => {
                    if merged != existing {
                        fs::write(&target, merged)?;
                    }
                    debug!("Merged {}", target.display());
                    Ok(WriteOutcome::Merged(target))
                }
                Err(e) => {
                    ctx.warn(format!("{}; existing file left unchanged", e));
                    Ok(WriteOutcome::Skipped(target))
                }
            };
        }

        if self.config.overwrite {
            fs::write(&target, artifact.render())?;
            ctx.warn(format!("Existing file {} was overwritten", target.display()));
            return Ok(WriteOutcome::Overwritten(target));
        }

        match unique_path(&target) {
            Ok(renamed) => {
                fs::write(&renamed, artifact.render())?;
                ctx.warn(format!(
                    "Existing file {} was not overwritten, the generated file is saved as {}",
                    target.display(),
                    renamed.display()
                ));
                Ok(WriteOutcome::Renamed(renamed))
            }
            Err(e) => {
                ctx.warn(e.to_string());
                Ok(WriteOutcome::Skipped(target))
            }
        }
    }
}

fn ensure_directory(target: &Path) -> Result<()> {
    let Some(dir) = target.parent() else {
        return Ok(());
    };
    fs::create_dir_all(dir)
        .map_err(|e| CodegenError::DirectoryError(format!("{}: {}", dir.display(), e)))?;
    if dir.is_dir() {
        Ok(())
    } else {
        Err(CodegenError::DirectoryError(format!(
            "{} is not a directory",
            dir.display()
        )))
    }
}

/// First free `name.N` next to `target`
fn unique_path(target: &Path) -> Result<PathBuf> {
    let name = target
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    for n in 1..=defaults::MAX_UNIQUE_SUFFIX {
        let candidate = target.with_file_name(format!("{}.{}", name, n));
        if !candidate.exists() {
            return Ok(candidate);
        }
    }
    Err(CodegenError::FileNameExhausted(target.display().to_string()))
}
