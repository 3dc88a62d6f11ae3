//! study-admin entry point
//!
//! Run with:
//! ```bash
//! cargo run -p study-admin -- recount
//! cargo run -p study-admin -- recount --question q1 --question q2
//! cargo run -p study-admin -- partners --user u1
//! ```
//!
//! Configuration is loaded from environment variables (and `.env`).

use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing::{error, info, warn};

use study_common::{try_init_tracing_with_config, AppConfig, AppError, AppResult, TracingConfig};
use study_core::entities::ANSWERS_COLLECTION;
use study_core::{DocumentId, DocumentStore, TargetRef, UserId};
use study_db::{create_pool, ensure_schema, DatabaseConfig, PgDocumentStore};
use study_service::{PartnerService, ReactionLedger, ServiceContext};

#[derive(Parser)]
#[command(name = "study-admin")]
#[command(about = "Maintenance tasks for the study-hub document store")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Rebuild question and answer counters from their reactions
    Recount {
        /// Question to reconcile (repeatable); all questions when omitted
        #[arg(short, long = "question")]
        questions: Vec<String>,

        /// Skip the answers of each question
        #[arg(long)]
        questions_only: bool,
    },

    /// Print the best study partners for a user as JSON
    Partners {
        /// User id of the searching student
        #[arg(short, long, env = "STUDY_ADMIN_USER")]
        user: String,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Configuration first: APP_ENV picks the log format
    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load configuration: {e}");
            std::process::exit(1);
        }
    };

    // Initialize tracing
    if let Err(e) = try_init_tracing_with_config(&TracingConfig::for_environment(config.app.env)) {
        eprintln!("Warning: Failed to initialize tracing: {e}");
    }

    info!(env = ?config.app.env, "Configuration loaded");

    if let Err(e) = run(&config, cli.command).await {
        error!(error = %e, code = e.error_code(), "study-admin failed");
        std::process::exit(1);
    }
}

async fn run(config: &AppConfig, command: Command) -> AppResult<()> {
    // Connect to the document store
    let pool = create_pool(&DatabaseConfig::from(&config.database))
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;
    ensure_schema(&pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;
    let store: Arc<dyn DocumentStore> = Arc::new(PgDocumentStore::new(pool));

    let ctx = ServiceContext::from_config(store, config);

    match command {
        Command::Recount {
            questions,
            questions_only,
        } => recount(&ctx, questions, questions_only).await,
        Command::Partners { user } => partners(&ctx, &user).await,
    }
}

async fn recount(
    ctx: &ServiceContext,
    questions: Vec<String>,
    questions_only: bool,
) -> AppResult<()> {
    let root = ctx.questions_collection();
    let question_ids = if questions.is_empty() {
        ctx.store()
            .list(root)
            .await?
            .into_iter()
            .map(|(id, _)| id)
            .collect()
    } else {
        questions
            .into_iter()
            .map(DocumentId::parse)
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| AppError::Validation(format!("--question: {e}")))?
    };

    let mut targets = Vec::new();
    for question_id in question_ids {
        let question = TargetRef::question(question_id.clone());
        if !questions_only {
            let answers = question.document_path(root).sub_collection(ANSWERS_COLLECTION);
            for (answer_id, _) in ctx.store().list(&answers).await? {
                targets.push(TargetRef::answer(question_id.clone(), answer_id));
            }
        }
        targets.push(question);
    }

    let ledger = ReactionLedger::new(ctx);
    let mut repaired = 0usize;
    let mut failed = 0usize;
    for target in &targets {
        match ledger.recount(target).await {
            Ok(report) if report.repaired => repaired += 1,
            Ok(_) => {}
            Err(e) => {
                warn!(target = %target, error = %e, "Recount failed");
                failed += 1;
            }
        }
    }

    info!(
        targets = targets.len(),
        repaired,
        failed,
        "Recount finished"
    );
    Ok(())
}

async fn partners(ctx: &ServiceContext, user: &str) -> AppResult<()> {
    let user_id = UserId::parse(user).map_err(|e| AppError::Validation(format!("--user: {e}")))?;
    let ranked = PartnerService::new(ctx).find_partners(&user_id).await?;
    let json = serde_json::to_string_pretty(&ranked).map_err(|e| AppError::Internal(e.into()))?;
    println!("{json}");
    Ok(())
}
