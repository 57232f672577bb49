use std::path::PathBuf;

use anyhow::Context;
use chrono::{NaiveDate, Utc};
use clap::{Parser, Subcommand, ValueEnum};
use sqlx::postgres::PgPoolOptions;
use uuid::Uuid;

mod db;
mod lifecycle;
mod models;
mod ranking;
mod report;

use models::ReviewOutcome;

#[derive(Parser)]
#[command(name = "batch-performance-tracker")]
#[command(about = "Task submission and leaderboard tracker for student batches", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum OutcomeArg {
    /// Approve the submission and finish the task
    Approve,
    /// Send the submission back for another attempt
    Resubmit,
}

#[derive(Subcommand)]
enum Commands {
    /// Create or upgrade the database schema
    InitDb,
    /// Load realistic seed data
    Seed,
    /// Import participant metrics from a CSV file
    Import {
        #[arg(long)]
        csv: PathBuf,
    },
    /// List tasks with their lifecycle status
    Tasks {
        #[arg(long)]
        email: Option<String>,
    },
    /// Submit a task with an attached file
    Submit {
        #[arg(long)]
        task: Uuid,
        #[arg(long)]
        file: String,
        /// Submission date, defaults to today
        #[arg(long)]
        date: Option<NaiveDate>,
    },
    /// Review a submitted task as a mentor
    Review {
        #[arg(long)]
        task: Uuid,
        #[arg(long, value_enum)]
        outcome: OutcomeArg,
        #[arg(long, default_value = "")]
        feedback: String,
        #[arg(long)]
        rating: Option<i32>,
    },
    /// Mark pending tasks past their deadline as overdue
    SweepOverdue {
        /// Reference date, defaults to today
        #[arg(long)]
        as_of: Option<NaiveDate>,
    },
    /// Print the batch or national leaderboard
    Leaderboard {
        /// Restrict to one batch; omit for the national board
        #[arg(long)]
        batch: Option<String>,
        #[arg(long, default_value_t = 10)]
        limit: usize,
        /// Highlight one participant's standing by email
        #[arg(long)]
        highlight: Option<String>,
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Generate a markdown report
    Report {
        #[arg(long)]
        batch: Option<String>,
        #[arg(long, default_value_t = 10)]
        top: usize,
        #[arg(long, default_value = "report.md")]
        out: PathBuf,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let database_url = std::env::var("DATABASE_URL")
        .context("DATABASE_URL must be set to a Postgres instance")?;

    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&database_url)
        .await
        .context("failed to connect to Postgres")?;

    match cli.command {
        Commands::InitDb => {
            db::init_db(&pool).await?;
            println!("Schema ready.");
        }
        Commands::Seed => {
            db::seed(&pool).await?;
            println!("Seed data inserted.");
        }
        Commands::Import { csv } => {
            let imported = db::import_csv(&pool, &csv).await?;
            println!("Imported {imported} participants from {}.", csv.display());
        }
        Commands::Tasks { email } => {
            let tasks = db::fetch_tasks(&pool, email.as_deref()).await?;
            if tasks.is_empty() {
                println!("No tasks found.");
                return Ok(());
            }

            let counts = lifecycle::status_counts(&tasks);
            println!(
                "{} tasks: {} pending ({} overdue), {} to resubmit, {} submitted, {} completed",
                tasks.len(),
                counts.pending,
                counts.overdue,
                counts.resubmit,
                counts.submitted,
                counts.completed
            );
            for task in lifecycle::display_order(&tasks) {
                let rating = task
                    .rating
                    .map(|r| format!(", rated {r}/5"))
                    .unwrap_or_default();
                println!(
                    "- [{}] {} (due {}{rating}) {}",
                    task.status, task.title, task.deadline, task.task_id
                );
            }
        }
        Commands::Submit { task, file, date } => {
            let current = db::fetch_task(&pool, task).await?;
            let submitted_at = date.unwrap_or_else(|| Utc::now().date_naive());
            let updated = lifecycle::submit(&current, submitted_at, &file)?;
            db::store_task(&pool, &updated).await?;
            println!("Task '{}' submitted on {submitted_at}.", updated.title);
        }
        Commands::Review {
            task,
            outcome,
            feedback,
            rating,
        } => {
            let current = db::fetch_task(&pool, task).await?;
            let outcome = match outcome {
                OutcomeArg::Approve => ReviewOutcome::Approve,
                OutcomeArg::Resubmit => ReviewOutcome::RequestResubmit,
            };
            let updated = lifecycle::review(&current, outcome, &feedback, rating)?;
            db::store_task(&pool, &updated).await?;
            println!("Task '{}' is now {}.", updated.title, updated.status);
        }
        Commands::SweepOverdue { as_of } => {
            let today = as_of.unwrap_or_else(|| Utc::now().date_naive());
            let tasks = db::fetch_tasks(&pool, None).await?;
            let mut flipped = 0usize;
            for (before, after) in tasks.iter().zip(lifecycle::sweep_overdue(&tasks, today)) {
                if after.status != before.status {
                    db::store_task(&pool, &after).await?;
                    flipped += 1;
                }
            }
            println!("Marked {flipped} tasks overdue as of {today}.");
        }
        Commands::Leaderboard {
            batch,
            limit,
            highlight,
            json,
        } => {
            let metrics = db::fetch_metrics(&pool).await?;
            let board = match batch.as_deref() {
                Some(name) => ranking::rank(&metrics, ranking::batch_scope(name)),
                None => ranking::rank(&metrics, ranking::national_scope),
            };

            if board.is_empty() {
                println!("No participants in this scope.");
                return Ok(());
            }

            if json {
                let top: Vec<_> = board.iter().take(limit).collect();
                println!("{}", serde_json::to_string_pretty(&top)?);
                return Ok(());
            }

            let label = batch.as_deref().unwrap_or("national");
            println!("Leaderboard ({label}):");
            for entry in board.iter().take(limit) {
                println!(
                    "{:>3}. {} ({}) score {:.1}",
                    entry.rank, entry.metric.display_name, entry.metric.batch, entry.score
                );
            }

            if let Some(email) = highlight {
                let standing = metrics
                    .iter()
                    .find(|m| m.email == email)
                    .and_then(|m| ranking::standing(&board, m.participant_id));
                match standing {
                    Some(entry) => println!(
                        "Your rank: #{} with score {:.1}",
                        entry.rank, entry.score
                    ),
                    None => println!("{email} is not on this board."),
                }
            }
        }
        Commands::Report { batch, top, out } => {
            let metrics = db::fetch_metrics(&pool).await?;
            let tasks = db::fetch_tasks(&pool, None).await?;
            let report = report::build_report(batch.as_deref(), &metrics, &tasks, top);
            std::fs::write(&out, report)?;
            println!("Report written to {}.", out.display());
        }
    }

    Ok(())
}
