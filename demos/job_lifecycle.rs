//! Job lifecycle example
//!
//! Creates a parameterized freestyle job, starts a build, waits for it to leave
//! the queue, prints its console output and deletes the job again.
//!
//! Run with: cargo run --example job_lifecycle

use jenkins_async::protocol::{JobConfig, JobParameter};
use jenkins_async::{BuildRequest, ClientConfig, Jenkins, RetryPolicy};
use std::time::Duration;

const JOB: &str = "jenkins-async-demo";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .init();

    let config = ClientConfig::from_env()?.with_retry(RetryPolicy::new(3));
    let jenkins = Jenkins::from_config(config)?;
    let jobs = jenkins.jobs();

    let job_config = jobs.construct_config(
        &JobConfig::new()
            .with_description("Created by the job_lifecycle demo")
            .with_parameter(JobParameter::new("GREETING").with_default("hello"))
            .with_command("echo $GREETING from $JOB_NAME"),
    );

    if jobs.is_exists(JOB).await? {
        jobs.delete(JOB).await?;
    }
    jobs.create(JOB, &job_config).await?;
    println!("Created {}", JOB);

    let queue_id = jenkins
        .builds()
        .start(JOB, BuildRequest::new().parameter("GREETING", "hi"))
        .await?
        .ok_or_else(|| anyhow::anyhow!("server did not report a queue item"))?;
    println!("Queued as item {}", queue_id);

    let number = loop {
        let item = jenkins.builds().get_queue_id_info(queue_id).await?;
        if let Some(number) = item.build_number() {
            break number;
        }
        tokio::time::sleep(Duration::from_secs(1)).await;
    };
    println!("Started build #{}", number);

    loop {
        let info = jenkins.builds().get_info(JOB, number).await?;
        if !info["building"].as_bool().unwrap_or(false) {
            println!("Result: {}", info["result"]);
            break;
        }
        tokio::time::sleep(Duration::from_secs(1)).await;
    }

    println!("\n{}", jenkins.builds().get_output(JOB, number).await?);

    jobs.delete(JOB).await?;
    jenkins.close().await;
    Ok(())
}
