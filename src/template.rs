use anyhow::Context as _;
use tera::Tera;

use crate::config::RunConfig;

pub const MANIFEST: &str = "Cargo.toml";
pub const ENTRY_POINT: &str = "src/main.rs";
pub const IGNORE_FILE: &str = ".gitignore";
pub const README: &str = "README.md";
pub const CI_WORKFLOW: &str = ".github/workflows/ci.yml";

/// Relative paths the scaffold must produce, in write order. The verifier
/// walks this same list.
pub const EXPECTED_FILES: [&str; 5] = [MANIFEST, ENTRY_POINT, IGNORE_FILE, README, CI_WORKFLOW];

/// The scaffold is static text under `templates/`, parameterized only by
/// the values substituted below. The ignore file and CI workflow carry no
/// placeholders at all.
const TEMPLATES: [(&str, &str); 5] = [
    (MANIFEST, include_str!("../templates/Cargo.toml.tera")),
    (ENTRY_POINT, include_str!("../templates/main.rs.tera")),
    (IGNORE_FILE, include_str!("../templates/gitignore.tera")),
    (README, include_str!("../templates/README.md.tera")),
    (CI_WORKFLOW, include_str!("../templates/ci.yml.tera")),
];

pub struct Rendered {
    pub path: &'static str,
    pub contents: String,
}

/// Renders every template with the run's name, description and author.
///
/// # Errors
///
/// This function will return an error if a template fails to parse or
/// references a value that is not provided.
pub fn render_all(config: &RunConfig) -> anyhow::Result<Vec<Rendered>> {
    let mut tera = Tera::default();

    for (path, source) in TEMPLATES {
        tera.add_raw_template(path, source)
            .with_context(|| format!("Invalid template for {path}"))?;
    }

    let mut context = tera::Context::new();
    context.insert("name", &config.name);
    context.insert("description", &config.description);
    context.insert("author", &config.author);

    TEMPLATES
        .iter()
        .map(|(path, _)| {
            let contents = tera
                .render(path, &context)
                .with_context(|| format!("Failed to render {path}"))?;

            Ok(Rendered { path, contents })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> RunConfig {
        RunConfig {
            name: "mytool".into(),
            description: "demo".into(),
            author: "Jane".into(),
            token: "t".into(),
            private: false,
        }
    }

    fn rendered(path: &str) -> String {
        render_all(&config())
            .unwrap()
            .into_iter()
            .find(|r| r.path == path)
            .unwrap()
            .contents
    }

    #[test]
    fn renders_all_expected_files() {
        let files = render_all(&config()).unwrap();

        assert_eq!(files.len(), EXPECTED_FILES.len());
        for (file, expected) in files.iter().zip(EXPECTED_FILES) {
            assert_eq!(file.path, expected);
            assert!(!file.contents.is_empty(), "{expected} rendered empty");
        }
    }

    #[test]
    fn manifest_names_the_binary() {
        let manifest = rendered(MANIFEST);

        assert!(manifest.contains("name = \"mytool\""));
        assert!(manifest.contains("[[bin]]"));
    }

    #[test]
    fn readme_carries_name_and_description() {
        let readme = rendered(README);

        assert!(readme.contains("# mytool"));
        assert!(readme.contains("demo"));
    }

    #[test]
    fn workflow_triggers_on_both_primary_branches() {
        let workflow = rendered(CI_WORKFLOW);

        assert!(workflow.contains("branches: [main, master]"));
        assert!(workflow.contains("cargo test"));
    }
}
