//! mailroom - entry point for the triage CLI

use anyhow::Context;
use clap::Parser;
use std::io::Write;

use mailroom::cli::{Args, Command};
use mailroom::config::Settings;
use mailroom::domain::{LabelId, SlugDirectory};
use mailroom::providers::{ContactSource, FileContacts, GmailMailbox};
use mailroom::services::{create_labels, delete_labels, LabelJob};

#[tokio::main]
async fn main() {
    let args = Args::parse();

    let default_level = if args.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(default_level.into()),
        )
        .init();

    if let Err(e) = run(args).await {
        tracing::error!("{e:#}");
        std::process::exit(1);
    }
}

async fn run(args: Args) -> anyhow::Result<()> {
    let settings_path = match &args.config {
        Some(path) => path.clone(),
        None => Settings::default_path()?,
    };
    let settings = Settings::load(&settings_path)
        .with_context(|| format!("loading settings from {}", settings_path.display()))?;

    let contacts = FileContacts::new(&settings.contacts.path);
    let groups = contacts
        .contacts_by_agency()
        .with_context(|| format!("loading contacts from {}", contacts.path().display()))?;
    let directory = SlugDirectory::new(groups.into_iter().map(|group| group.agency));

    let mut gateway = GmailMailbox::new(settings.account.id.clone());
    gateway.authenticate().await.context("authenticating")?;

    match args.command {
        Command::Run { date } => {
            let job = LabelJob::new(&gateway, &directory, &settings.labels)?;
            let report = job.run(date).await.context("running label job")?;
            println!(
                "processed {} message(s), {} failure(s)",
                report.processed(),
                report.failures()
            );
        }
        Command::CreateLabels => {
            let report = create_labels(&gateway, &directory, &settings.labels).await;
            println!(
                "created {} label(s), skipped {}",
                report.created.len(),
                report.skipped.len()
            );
        }
        Command::DeleteLabels { ids } => {
            let ids = (!ids.is_empty()).then(|| ids.into_iter().map(LabelId::from).collect());
            let deleted = delete_labels(&gateway, ids, confirm_wipe)
                .await
                .context("deleting labels")?;
            println!("deleted {} label(s)", deleted.len());
        }
    }

    Ok(())
}

/// Asks on stdin before wiping every user label.
fn confirm_wipe() -> bool {
    print!("delete ALL user labels? this is a first-time setup thing [y/N]: ");
    let _ = std::io::stdout().flush();
    let mut answer = String::new();
    if std::io::stdin().read_line(&mut answer).is_err() {
        return false;
    }
    answer.trim().eq_ignore_ascii_case("y")
}
