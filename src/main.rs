use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::info;

mod config;
mod dns;
mod domain;
mod error;
mod models;
mod name;
mod patterns;
mod processor;
mod smtp;
mod suggest;
mod syntax;
mod verifier;

#[derive(Parser)]
#[command(author, version, about = "Discovers and verifies corporate email addresses for sales prospects", long_about = None)]
struct Cli {
    #[command(flatten)]
    config: config::ConfigArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Verify a single person against a company domain
    Verify {
        /// The person's full name
        #[arg(long)]
        name: String,

        /// The company domain or website URL
        #[arg(long)]
        domain: String,

        /// Additional candidate addresses to merge into the generated list
        #[arg(long = "extra")]
        extras: Vec<String>,
    },
    /// Process a JSON file containing contact records
    Process {
        /// Path to the input JSON file
        #[arg(short, long)]
        input: PathBuf,

        /// Path to the output JSON file
        #[arg(short, long)]
        output: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let cli = Cli::parse();
    let config = config::build_config(&cli.config)?;

    let resolver = dns::DnsMxResolver::new(&config)?;
    let sender_pool = smtp::RandomSenderPool::new(config.sender_pool.clone());
    let probe = smtp::SmtpProbe::new(&config, sender_pool);
    let verifier = verifier::EmailVerifier::new(&config, resolver, probe);

    match cli.command {
        Commands::Verify {
            name,
            domain,
            extras,
        } => {
            run_single(&config, &verifier, name, domain, extras).await?;
        }
        Commands::Process { input, output } => {
            info!(
                "Processing contacts from {} to {}",
                input.display(),
                output.display()
            );
            process_file(&config, &verifier, input, output).await?;
        }
    }

    Ok(())
}

async fn run_single<R: dns::MxResolver, P: smtp::MailboxProbe>(
    config: &config::Config,
    verifier: &verifier::EmailVerifier<'_, R, P>,
    name: String,
    domain: String,
    extras: Vec<String>,
) -> Result<()> {
    let contact = models::Contact {
        full_name: Some(name),
        domain: Some(domain),
        extra_candidates: extras,
        other_fields: Default::default(),
    };

    let outcome =
        processor::process_record(config, verifier, &suggest::NoSuggestions, contact).await;
    println!("{}", serde_json::to_string_pretty(&outcome)?);

    Ok(())
}

async fn process_file<R: dns::MxResolver, P: smtp::MailboxProbe>(
    config: &config::Config,
    verifier: &verifier::EmailVerifier<'_, R, P>,
    input: PathBuf,
    output: PathBuf,
) -> Result<()> {
    let input_data = std::fs::read_to_string(&input)?;
    let contacts: Vec<models::Contact> = serde_json::from_str(&input_data)?;

    info!("Loaded {} contacts from {}", contacts.len(), input.display());

    let progress_bar = indicatif::ProgressBar::new(contacts.len() as u64);
    progress_bar.set_style(
        indicatif::ProgressStyle::default_bar()
            .template("[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} {msg}")
            .unwrap()
            .progress_chars("##-"),
    );

    // Records are verified one at a time: the probes are paced on purpose,
    // and fanning out across one target mail server defeats that pacing.
    let mut results = Vec::with_capacity(contacts.len());
    for contact in contacts {
        let result =
            processor::process_record(config, verifier, &suggest::NoSuggestions, contact).await;
        progress_bar.inc(1);
        results.push(result);
    }

    progress_bar.finish_with_message("Processing complete");

    let output_data = serde_json::to_string_pretty(&results)?;
    std::fs::write(&output, output_data)?;

    info!("Wrote {} results to {}", results.len(), output.display());

    Ok(())
}
