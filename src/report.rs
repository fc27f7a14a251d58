use crate::{config::RunConfig, github::RemoteRepo, info};

/// Success summary with copy-pasteable follow-ups. Console output only.
pub fn success(config: &RunConfig, remote: &RemoteRepo) {
    info!("Created {} ({})", remote.full_name, remote.html_url);

    println!();
    println!("Run it straight from the repository:");
    println!("    cargo install --git {}", remote.clone_url);
    println!("    {}", config.name);
    println!();
    println!("Or clone and keep working on it:");
    println!("    git clone {}", remote.clone_url);
    println!("    cd {}", config.name);
    println!("    cargo build --release");
    println!("    cargo test");
}
