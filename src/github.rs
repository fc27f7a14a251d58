use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::RunConfig;

const API_ROOT: &str = "https://api.github.com";
const USER_AGENT: &str = concat!("toolsmith/", env!("CARGO_PKG_VERSION"));

/// Scopes a classic token must grant: repository read/write, workflow
/// updates (the scaffold ships a CI workflow) and package writes.
pub const REQUIRED_SCOPES: [&str; 3] = ["repo", "workflow", "write:packages"];

#[derive(Debug, Error)]
pub enum GithubError {
    #[error("GitHub rejected the token; check that it is valid and has not expired")]
    Authentication,

    #[error(
        "the token only grants `{granted}`; it needs `repo`, `workflow` and `write:packages`. \
         Create one at https://github.com/settings/tokens/new?scopes=repo,workflow,write:packages"
    )]
    MissingScopes { granted: String },

    #[error("a repository named `{0}` already exists on this account; pick a different name")]
    NameCollision(String),

    #[error("GitHub rejected the repository: {0}")]
    Validation(String),

    #[error("GitHub API error: {0}")]
    Api(String),
}

#[derive(Debug, Deserialize)]
pub struct AuthenticatedUser {
    pub login: String,
}

/// What the rest of the run needs from the freshly created repository.
#[derive(Debug, Deserialize)]
pub struct RemoteRepo {
    pub full_name: String,
    pub clone_url: String,
    pub html_url: String,
}

#[derive(Serialize)]
struct CreateRepoRequest<'a> {
    name: &'a str,
    description: &'a str,
    private: bool,
    auto_init: bool,
    license_template: &'a str,
}

pub struct GithubClient {
    agent: ureq::Agent,
    token: String,
}

impl GithubClient {
    #[must_use]
    pub fn new(token: &str) -> GithubClient {
        GithubClient {
            agent: ureq::agent(),
            token: token.to_string(),
        }
    }

    fn request(&self, method: &str, path: &str) -> ureq::Request {
        self.agent
            .request(method, &format!("{API_ROOT}{path}"))
            .set("Authorization", &format!("token {}", self.token))
            .set("User-Agent", USER_AGENT)
            .set("Accept", "application/vnd.github+json")
    }

    /// The read-only "who am I" call, made before any side effect. Checks
    /// both that the token authenticates and, when GitHub reports granted
    /// scopes, that the required ones are present.
    ///
    /// # Errors
    ///
    /// This function will return an error if the token is rejected, lacks
    /// scopes, or the call fails outright.
    pub fn authenticated_user(&self) -> Result<AuthenticatedUser, GithubError> {
        match self.request("GET", "/user").call() {
            Ok(response) => {
                // Fine-grained tokens do not send the scope header; only
                // classic tokens can be checked up front.
                let scopes = response.header("x-oauth-scopes").map(str::to_owned);

                let user = response
                    .into_json()
                    .map_err(|e| GithubError::Api(e.to_string()))?;

                match scopes {
                    Some(granted) if !has_required_scopes(&granted) => {
                        Err(GithubError::MissingScopes { granted })
                    }
                    _ => Ok(user),
                }
            }
            Err(ureq::Error::Status(401, _)) => Err(GithubError::Authentication),
            Err(ureq::Error::Status(code, response)) => Err(GithubError::Api(format!(
                "GET /user returned {code}: {}",
                body_text(response)
            ))),
            Err(err) => Err(GithubError::Api(err.to_string())),
        }
    }

    /// Creates the remote repository without auto-initialization, so the
    /// pushed scaffold becomes the entire history.
    ///
    /// # Errors
    ///
    /// This function will return an error on a name collision, a
    /// validation rejection, or any other API failure.
    pub fn create_repository(&self, config: &RunConfig) -> Result<RemoteRepo, GithubError> {
        let body = CreateRepoRequest {
            name: &config.name,
            description: &config.description,
            private: config.private,
            auto_init: false,
            license_template: "mit",
        };

        match self.request("POST", "/user/repos").send_json(&body) {
            Ok(response) => response
                .into_json()
                .map_err(|e| GithubError::Api(e.to_string())),
            Err(ureq::Error::Status(401, _)) => Err(GithubError::Authentication),
            Err(ureq::Error::Status(code, response)) => {
                Err(classify_create_failure(code, &body_text(response), &config.name))
            }
            Err(err) => Err(GithubError::Api(err.to_string())),
        }
    }
}

fn body_text(response: ureq::Response) -> String {
    response.into_string().unwrap_or_default()
}

fn has_required_scopes(granted: &str) -> bool {
    let granted: Vec<&str> = granted
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect();

    REQUIRED_SCOPES.iter().all(|scope| granted.contains(scope))
}

/// Maps a failed create-repository response onto the error taxonomy. Pure
/// so the mapping is testable without a network.
fn classify_create_failure(status: u16, body: &str, name: &str) -> GithubError {
    if status != 422 {
        return GithubError::Api(format!("repository creation returned {status}: {body}"));
    }

    let detail = validation_messages(body);

    if detail.to_ascii_lowercase().contains("already exists") {
        GithubError::NameCollision(name.to_string())
    } else if detail.is_empty() {
        GithubError::Validation(body.to_string())
    } else {
        GithubError::Validation(detail)
    }
}

/// Flattens the `errors[].message` entries of a 422 body, falling back to
/// the top-level `message`.
fn validation_messages(body: &str) -> String {
    let Ok(value) = serde_json::from_str::<serde_json::Value>(body) else {
        return String::new();
    };

    let mut parts: Vec<String> = value
        .get("errors")
        .and_then(serde_json::Value::as_array)
        .map(|errors| {
            errors
                .iter()
                .filter_map(|e| e.get("message").and_then(serde_json::Value::as_str))
                .map(str::to_owned)
                .collect()
        })
        .unwrap_or_default();

    if parts.is_empty() {
        if let Some(message) = value.get("message").and_then(serde_json::Value::as_str) {
            parts.push(message.to_owned());
        }
    }

    parts.join("; ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scope_check_accepts_supersets_and_rejects_gaps() {
        assert!(has_required_scopes("repo, workflow, write:packages"));
        assert!(has_required_scopes("admin:org, repo, workflow, write:packages"));
        assert!(!has_required_scopes("repo, workflow"));
        assert!(!has_required_scopes(""));
    }

    #[test]
    fn collision_is_detected_from_the_error_detail() {
        let body = r#"{
            "message": "Repository creation failed.",
            "errors": [{ "resource": "Repository", "message": "name already exists on this account" }]
        }"#;

        match classify_create_failure(422, body, "mytool") {
            GithubError::NameCollision(name) => assert_eq!(name, "mytool"),
            other => panic!("expected a collision, got {other}"),
        }
    }

    #[test]
    fn other_422s_surface_the_provider_message() {
        let body = r#"{
            "message": "Validation Failed",
            "errors": [{ "message": "name is too long" }]
        }"#;

        match classify_create_failure(422, body, "mytool") {
            GithubError::Validation(detail) => assert!(detail.contains("name is too long")),
            other => panic!("expected a validation error, got {other}"),
        }
    }

    #[test]
    fn non_422_failures_are_generic_api_errors() {
        match classify_create_failure(503, "unavailable", "mytool") {
            GithubError::Api(detail) => assert!(detail.contains("503")),
            other => panic!("expected an api error, got {other}"),
        }
    }

    #[test]
    fn unparseable_bodies_still_produce_a_message() {
        match classify_create_failure(422, "not json", "mytool") {
            GithubError::Validation(detail) => assert_eq!(detail, "not json"),
            other => panic!("expected a validation error, got {other}"),
        }
    }
}
