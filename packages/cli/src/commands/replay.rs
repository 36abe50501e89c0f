use anyhow::{bail, Context, Result};
use clap::Args;
use colored::Colorize;
use pagebuilder_editor::{Command, CommandOutcome, EditSession, SaveCoordinator, SaveResult};
use pagebuilder_model::PageId;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;

use super::open_project;

#[derive(Debug, Args)]
pub struct ReplayArgs {
    /// JSON-lines file with one command per line
    pub log: PathBuf,

    /// Page to apply the commands to
    #[arg(short, long, default_value = "home")]
    pub page: String,

    /// Group all commands into one undo step with this description
    #[arg(short, long)]
    pub batch: Option<String>,

    /// Save the page afterwards, autosaving during the replay if configured
    #[arg(short, long)]
    pub save: bool,

    /// Print every command, not only ignored ones
    #[arg(short, long)]
    pub verbose: bool,
}

pub async fn replay(args: ReplayArgs, cwd: &Path) -> Result<()> {
    let (config, gateway) = open_project(cwd)?;
    let page_id = PageId::from(args.page.as_str());

    let content = std::fs::read_to_string(&args.log)
        .with_context(|| format!("reading {}", args.log.display()))?;
    let commands = parse_log(&content)?;

    let session = EditSession::open(&gateway, page_id.clone(), &config).await?;
    let coordinator = Arc::new(SaveCoordinator::new(session, Arc::new(gateway)));

    // Long logs are saved periodically as well as at the end
    let autosave = if args.save {
        coordinator.spawn_autosave_from(&config.autosave)
    } else {
        None
    };

    println!(
        "{} {} command(s) on page {}",
        "▶".bright_blue(),
        commands.len(),
        page_id.to_string().bright_white()
    );

    if let Some(description) = &args.batch {
        coordinator.session().lock().await.begin_batch(description.clone());
    }

    let mut applied = 0;
    let mut ignored = 0;

    for (line, command) in commands {
        let name = command.name();
        match coordinator.dispatch(command).await {
            CommandOutcome::Applied { version } => {
                applied += 1;
                if args.verbose {
                    println!("  {} {:>4}  {} (v{})", "✓".green(), line, name, version);
                }
            }
            CommandOutcome::Ignored { reason } => {
                ignored += 1;
                println!("  {} {:>4}  {} {}", "∅".yellow(), line, name, reason.to_string().dimmed());
            }
        }
    }

    if let Some(task) = autosave {
        task.abort();
    }

    {
        let mut session = coordinator.session().lock().await;
        session.end_batch();
        info!(
            page = %page_id,
            applied,
            ignored,
            version = session.version(),
            "Replay finished"
        );
        println!();
        println!(
            "{} applied, {} ignored, {} sections, {} components",
            applied.to_string().green(),
            ignored.to_string().yellow(),
            session.document().section_count(),
            session.document().component_count()
        );
    }

    if args.save {
        match coordinator.save_if_dirty().await {
            SaveResult::Saved { version } => {
                println!("{} Saved {} (v{})", "✓".green(), page_id, version);
            }
            SaveResult::Clean => println!("{} Nothing to save", "✓".green()),
            SaveResult::Failed(e) => bail!("save failed: {}", e),
        }
    }

    Ok(())
}

/// Parse a command log. Blank lines and lines starting with `#` are skipped;
/// each command is paired with its 1-based line number.
pub fn parse_log(content: &str) -> Result<Vec<(usize, Command)>> {
    let mut commands = Vec::new();

    for (index, line) in content.lines().enumerate() {
        let line_no = index + 1;
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let command: Command = serde_json::from_str(line)
            .with_context(|| format!("line {}: invalid command", line_no))?;
        commands.push((line_no, command));
    }

    Ok(commands)
}
