pub use clap::Parser;

#[derive(Parser)]
#[clap(version, about = "Scaffold a new command-line tool and publish it to GitHub")]
pub struct Args {
    /// Name of the tool; doubles as directory, binary and repository name
    #[clap(long)]
    pub name: String,

    /// One-line description used in the manifest and readme
    #[clap(long)]
    pub description: String,

    /// GitHub personal access token used to create the repository and push
    #[clap(long)]
    pub github_token: String,

    /// Author name recorded in the initial commit
    #[clap(long)]
    pub author: String,

    /// Create the remote repository as private
    #[clap(long)]
    pub private: bool,
}
