use anyhow::Result;
use clap::Parser;
use std::process::ExitCode;
use toolsmith::{
    args::Args,
    config::RunConfig,
    error,
    git::{self, GitRepo},
    github::GithubClient,
    info, report, scaffold, trace,
};

fn app(args: &Args) -> Result<()> {
    let config = RunConfig::from_args(args)?;
    let project_dir = config.project_dir()?;

    let client = GithubClient::new(&config.token);
    let user = client.authenticated_user()?;
    trace!("token authenticated as {}", user.login);

    info!("Scaffolding {}", project_dir.display());
    scaffold::create_project(&config, &project_dir)?;
    scaffold::verify_project(&project_dir)?;

    scaffold::ensure_workflow_dir(&project_dir)?;
    let repo = GitRepo::init(&project_dir)?;

    info!("Creating repository {} on GitHub", config.name);
    let remote = client.create_repository(&config)?;

    // From here on a failure strands the freshly created remote repository;
    // there is no rollback.
    git::publish(&repo, &config, &remote)?;

    report::success(&config, &remote);

    Ok(())
}

fn main() -> ExitCode {
    let args = Args::parse();

    match app(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e:#}");
            ExitCode::FAILURE
        }
    }
}
