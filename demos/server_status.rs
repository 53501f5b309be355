//! Server status example
//!
//! Connects with the `JENKINS_*` environment variables and prints the server
//! version, readiness, jobs, nodes and queue.
//!
//! Run with: cargo run --example server_status

use jenkins_async::{ClientConfig, Jenkins};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .init();

    let jenkins = Jenkins::from_config(ClientConfig::from_env()?)?;

    println!("Jenkins Server Status");
    println!("=====================\n");
    println!("Host:    {}", jenkins.host());
    println!("Version: {}", jenkins.get_version().await?);
    println!("Ready:   {}", jenkins.is_ready().await);
    println!("Crumb:   {:?}\n", jenkins.crumb());

    println!("Jobs:");
    for (name, job) in jenkins.jobs().get_all().await? {
        println!("  {} ({})", name, job.class);
    }

    println!("\nNodes:");
    for (name, node) in jenkins.nodes().get_all().await? {
        let offline = node["offline"].as_bool().unwrap_or(false);
        println!("  {} {}", name, if offline { "offline" } else { "online" });
    }

    println!("\nQueue:");
    for (id, item) in jenkins.queue().get_all().await? {
        println!("  #{} {}", id, item.why.as_deref().unwrap_or("-"));
    }

    jenkins.close().await;
    Ok(())
}
