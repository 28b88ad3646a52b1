//! SchoolDesk command line
//!
//! Main application entry point

use std::sync::Arc;
use anyhow::Context;
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing::{error, info};

use SchoolDesk::{
    SchoolDeskError,
    config::Settings,
    utils::logging,
    database::{DatabaseService, create_pool, run_migrations, health_check},
    services::ServiceFactory,
};

#[derive(Parser)]
#[command(name = "schooldesk", version, about = "School events, attendance and grade reports")]
struct Cli {
    /// Configuration file, without extension
    #[arg(short, long, default_value = "config")]
    config: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Apply pending database migrations
    Migrate,
    /// Check database connectivity
    Health,
    /// Print a student's attendance and grade report
    StudentReport {
        #[arg(long)]
        token: String,
        #[arg(long)]
        student_id: i64,
        #[arg(long)]
        term: Option<String>,
        /// Earlier term to compute subject trends against
        #[arg(long)]
        baseline_term: Option<String>,
    },
    /// Print attendance of one class
    ClassAttendance {
        #[arg(long)]
        token: String,
        #[arg(long)]
        class_id: i64,
        #[arg(long)]
        from: Option<NaiveDate>,
        #[arg(long)]
        to: Option<NaiveDate>,
    },
    /// Print an event with its registration count
    EventSummary {
        #[arg(long)]
        token: String,
        #[arg(long)]
        event_id: i64,
    },
    /// Print the dashboard for the token's role
    Dashboard {
        #[arg(long)]
        token: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    let cli = Cli::parse();

    // Load configuration
    let settings = Settings::from_file(&cli.config).context("loading configuration")?;
    settings.validate()?;

    // Initialize logging; the guard flushes the log file on exit
    let _guard = logging::init_logging(&settings.logging)?;
    info!("Starting {}", SchoolDesk::info());

    if let Err(e) = run(&settings, cli.command).await {
        if let Some(err) = e.downcast_ref::<SchoolDeskError>() {
            error!(
                code = err.code(),
                severity = ?err.severity(),
                recoverable = err.is_recoverable(),
                "{}",
                err
            );
        }
        return Err(e);
    }

    Ok(())
}

async fn run(settings: &Settings, command: Command) -> anyhow::Result<()> {
    let pool = create_pool(&settings.database).await?;

    match command {
        Command::Migrate => {
            run_migrations(&pool).await?;
        }
        Command::Health => {
            health_check(&pool).await?;
            let events = DatabaseService::new(pool).events.count().await?;
            println!("ok ({} events)", events);
        }
        command => {
            let services = ServiceFactory::new(settings, Arc::new(DatabaseService::new(pool)));
            run_query(&services, command).await?;
        }
    }

    Ok(())
}

async fn run_query(services: &ServiceFactory, command: Command) -> anyhow::Result<()> {
    match command {
        Command::StudentReport { token, student_id, term, baseline_term } => {
            let actor = services.session_service.authenticate(&token)?;
            let report = services
                .report_service
                .student_report(&actor, student_id, term, baseline_term)
                .await?;
            print_json(&report)
        }
        Command::ClassAttendance { token, class_id, from, to } => {
            let actor = services.session_service.authenticate(&token)?;
            let report = services
                .report_service
                .class_attendance_report(&actor, class_id, from, to)
                .await?;
            print_json(&report)
        }
        Command::EventSummary { token, event_id } => {
            let actor = services.session_service.authenticate(&token)?;
            let summary = services.event_service.event_summary(&actor, event_id).await?;
            print_json(&summary)
        }
        Command::Dashboard { token } => {
            let actor = services.session_service.authenticate(&token)?;
            let dashboard = services.report_service.dashboard(&actor).await?;
            print_json(&dashboard)
        }
        Command::Migrate | Command::Health => Ok(()),
    }
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
