use anyhow::{anyhow, bail, Context};
use derive_builder::Builder;
use std::path::PathBuf;

use crate::args::Args;

/// Parameters of a single run. Built once from the parsed arguments and
/// never mutated afterwards.
#[derive(Builder)]
pub struct RunConfig {
    pub name: String,
    pub description: String,
    pub author: String,
    pub token: String,
    pub private: bool,
}

impl RunConfig {
    /// Validates the tool name and assembles the configuration.
    ///
    /// # Errors
    ///
    /// This function will return an error if the name is empty or contains
    /// characters that are unsafe for a directory or repository name.
    pub fn from_args(args: &Args) -> anyhow::Result<RunConfig> {
        validate_name(&args.name)?;

        RunConfigBuilder::default()
            .name(args.name.clone())
            .description(args.description.clone())
            .author(args.author.clone())
            .token(args.github_token.clone())
            .private(args.private)
            .build()
            .map_err(|e| anyhow!("{e}"))
    }

    /// Directory the project is scaffolded into: `<cwd>/<name>`.
    pub fn project_dir(&self) -> anyhow::Result<PathBuf> {
        Ok(std::env::current_dir()
            .context("Failed to get current dir")?
            .join(&self.name))
    }
}

/// The name ends up as a directory, a cargo package name and a GitHub
/// repository name, so it is restricted to the intersection of what all
/// three accept.
pub fn validate_name(name: &str) -> anyhow::Result<()> {
    if name.is_empty() {
        bail!("Name must not be empty");
    }

    if name.starts_with('-') || name.starts_with('.') {
        bail!("Name `{name}` must not start with `-` or `.`");
    }

    if !name
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
    {
        bail!(
            "Name `{name}` may only contain ASCII letters, digits, `-`, `_` and `.`"
        );
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::validate_name;

    #[test]
    fn accepts_safe_names() {
        for name in ["mytool", "my-tool", "my_tool", "tool2", "a.b"] {
            assert!(validate_name(name).is_ok(), "rejected {name}");
        }
    }

    #[test]
    fn rejects_unsafe_names() {
        for name in ["", "-tool", ".tool", "my tool", "my/tool", "tool!", "caf\u{e9}"] {
            assert!(validate_name(name).is_err(), "accepted {name:?}");
        }
    }
}
