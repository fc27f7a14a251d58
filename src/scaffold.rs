use anyhow::{bail, Context as _};
use fs_extra::dir::create_all;
use std::{fs, path::Path};

use crate::{config::RunConfig, template, trace};

/// Writes the scaffold into `root`, creating nested directories as needed.
///
/// # Errors
///
/// This function will return an error if `root` already exists or any
/// write fails; the message names the path that could not be written.
pub fn create_project(config: &RunConfig, root: &Path) -> anyhow::Result<()> {
    if root.exists() {
        bail!("Directory {} already exists", root.display());
    }

    create_all(root, false)
        .with_context(|| format!("Failed to create directory {}", root.display()))?;

    for rendered in template::render_all(config)? {
        let target = root.join(rendered.path);

        if let Some(parent) = target.parent() {
            create_all(parent, false)
                .with_context(|| format!("Failed to create directory {}", parent.display()))?;
        }

        fs::write(&target, rendered.contents)
            .with_context(|| format!("Failed to write {}", target.display()))?;

        trace!("wrote {}", target.display());
    }

    Ok(())
}

/// Confirms every expected file landed on disk. Catches partial writes
/// before the remote repository gets created.
///
/// # Errors
///
/// This function will return an error naming the first expected path that
/// is missing or not a regular file.
pub fn verify_project(root: &Path) -> anyhow::Result<()> {
    for path in template::EXPECTED_FILES {
        if !root.join(path).is_file() {
            bail!("Expected file {path} is missing from {}", root.display());
        }
    }

    Ok(())
}

/// Git does not record empty directories, so a workflows directory that
/// went missing would only surface after the push. Recreate it if absent.
pub fn ensure_workflow_dir(root: &Path) -> anyhow::Result<()> {
    let workflows = root.join(".github/workflows");

    if !workflows.is_dir() {
        create_all(&workflows, false)
            .with_context(|| format!("Failed to create directory {}", workflows.display()))?;
    }

    Ok(())
}
