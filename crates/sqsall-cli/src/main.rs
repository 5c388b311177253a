use std::process::ExitCode;

use anyhow::Context;
use aws_config::meta::region::RegionProviderChain;
use aws_config::Region;
use clap::{Args, Parser, Subcommand};
use sqsall::{DrainOptions, Drainer, Filler, QueueRef, SqsQueue};

const LOCALSTACK_ENDPOINT: &str = "http://localhost:4566";

const RECEIVE_ALL_ABOUT: &str = "\
For all messages: receive, print, delete.

If it's a FIFO queue, prefix each message with its MessageGroupId and '\\t'.
Stops as soon as a receive comes back empty.";

const SEND_ALL_ABOUT: &str = "\
Send a message for each line read from standard input.

If it's a FIFO queue, each line must be prefixed with its MessageGroupId and '\\t'.
Non-conforming lines are skipped with a warning.

The MessageDeduplicationId is a timestamp, to maximize the likelihood of
messages being accepted.";

const EXAMPLES: &str = "\
Examples:

  Redrive a DLQ except for messages that have some fault:
    sqsall receive-all-messages --queue my-dlq | sed '/some fault/d' | sqsall send-all-messages --queue my-queue

  Redrive a FIFO DLQ except for messages that have some fault:
    sqsall receive-all-messages --queue my-dlq.fifo | sed '/some fault/d' | sqsall send-all-messages --queue my-queue.fifo";

#[tokio::main]
pub async fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    if let Err(e) = Cli::parse().run().await {
        eprintln!("error: {:#}", e);
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}

#[derive(Debug, Parser)]
#[command(name = "sqsall", version)]
#[command(about = "treat AWS SQS queues like files", long_about = None)]
#[command(after_long_help = EXAMPLES)]
pub struct Cli {
    #[command(flatten)]
    aws: AwsArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Args)]
struct AwsArgs {
    /// Talk to LocalStack with static test credentials
    #[arg(long, global = true)]
    local: bool,

    /// Override the SQS endpoint (defaults to http://localhost:4566 with --local)
    #[arg(long, global = true, env = "AWS_ENDPOINT_URL")]
    endpoint_url: Option<String>,

    #[arg(long, global = true, env = "AWS_REGION")]
    region: Option<String>,
}

impl AwsArgs {
    async fn load(&self) -> aws_config::SdkConfig {
        let region = RegionProviderChain::first_try(self.region.clone().map(Region::new))
            .or_default_provider();
        let mut loader = aws_config::defaults(aws_config::BehaviorVersion::latest());

        if self.local {
            loader = loader
                .region(region.or_else(Region::from_static("us-east-1")))
                .credentials_provider(aws_sdk_sqs::config::Credentials::new(
                    "test", "test", None, None, "static",
                ))
                .endpoint_url(self.endpoint_url.as_deref().unwrap_or(LOCALSTACK_ENDPOINT));
        } else {
            loader = loader.region(region);
            if let Some(endpoint_url) = &self.endpoint_url {
                loader = loader.endpoint_url(endpoint_url);
            }
        }

        loader.load().await
    }
}

#[derive(Debug, Args)]
struct QueueArgs {
    /// Specifies the queue name. Mutually exclusive with --queue-url.
    #[arg(long)]
    queue: Option<String>,

    /// Specifies the queue url. Mutually exclusive with --queue.
    #[arg(long)]
    queue_url: Option<String>,
}

impl QueueArgs {
    fn queue_ref(&self) -> sqsall::Result<QueueRef> {
        QueueRef::new(self.queue.as_deref(), self.queue_url.as_deref())
    }
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Receive, print and delete every message in a queue
    #[command(long_about = RECEIVE_ALL_ABOUT, after_long_help = EXAMPLES)]
    ReceiveAllMessages {
        #[command(flatten)]
        queue: QueueArgs,

        /// Pass along wait-time-seconds. Unlike receive-message, the default is 1.
        #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(i32).range(0..=20))]
        wait_time_seconds: i32,

        /// Pass along max-number-of-messages. Unlike receive-message, the default is 10.
        #[arg(long, default_value_t = 10, value_parser = clap::value_parser!(i32).range(1..=10))]
        max_number_of_messages: i32,
    },
    /// Send one message per line of standard input
    #[command(long_about = SEND_ALL_ABOUT, after_long_help = EXAMPLES)]
    SendAllMessages {
        #[command(flatten)]
        queue: QueueArgs,
    },
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        let Cli { aws, command } = self;

        match command {
            Commands::ReceiveAllMessages {
                queue,
                wait_time_seconds,
                max_number_of_messages,
            } => {
                let queue_ref = queue.queue_ref()?;
                let sqs = SqsQueue::from_config(aws.load().await);
                let url = queue_ref
                    .resolve(&sqs)
                    .await
                    .context("failed to resolve queue")?;

                let options = DrainOptions {
                    wait_time_seconds,
                    max_number_of_messages,
                };
                let mut stdout = tokio::io::stdout();
                let summary = Drainer::new(&sqs, url.clone(), options)
                    .run(&mut stdout)
                    .await
                    .with_context(|| format!("failed to drain {url}"))?;

                log::info!(
                    "received {} message(s) from {url} in {} poll(s), {} redelivery(ies) skipped",
                    summary.emitted,
                    summary.polls,
                    summary.skipped_duplicates
                );
            }
            Commands::SendAllMessages { queue } => {
                let queue_ref = queue.queue_ref()?;
                let sqs = SqsQueue::from_config(aws.load().await);
                let url = queue_ref
                    .resolve(&sqs)
                    .await
                    .context("failed to resolve queue")?;

                let stdin = tokio::io::BufReader::new(tokio::io::stdin());
                let summary = Filler::new(&sqs, url.clone())
                    .run(stdin)
                    .await
                    .with_context(|| format!("failed to send to {url}"))?;

                log::info!(
                    "sent {} message(s) to {url}, {} line(s) skipped",
                    summary.sent,
                    summary.skipped
                );
            }
        }

        Ok(())
    }
}
