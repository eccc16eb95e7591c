use std::path::Path;

use anyhow::{Context, Result, bail};
use clap::Parser;
use log::info;

use lesson_core::model::{LessonCatalog, LessonId, VocabularyScope};
use services::{AppServices, Clock};
use storage::KeySpace;

mod cli;
mod db;
mod play;
mod render;

use cli::{Cli, Commands};

async fn load_catalog(path: &Path) -> Result<LessonCatalog> {
    let raw = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("reading catalog {}", path.display()))?;
    let catalog = LessonCatalog::from_json(&raw)
        .with_context(|| format!("parsing catalog {}", path.display()))?;
    info!("loaded {} lesson(s) from {}", catalog.lessons().len(), path.display());
    Ok(catalog)
}

async fn open_services(cli: &Cli) -> Result<AppServices> {
    // Open + migrate SQLite here so the library crates stay free of CLI concerns.
    let db_url = db::normalize_sqlite_url(&cli.db_url);
    db::prepare_sqlite_file(&db_url)?;
    let services = AppServices::new_sqlite(&db_url, KeySpace::new(&cli.namespace), Clock::default())
        .await
        .with_context(|| format!("opening {db_url}"))?;
    Ok(services)
}

async fn list(services: &AppServices, catalog: &LessonCatalog) {
    let progress = services.progress();
    for lesson in catalog.lessons() {
        let marker = if !progress.can_open(lesson).await {
            "🔒"
        } else if progress.progress_record(lesson.id()).await.completed() {
            "✓"
        } else {
            " "
        };
        println!(
            "{marker} {:<24} {} · {} ({} items)",
            lesson.id(),
            lesson.topic(),
            lesson.title(),
            lesson.item_count()
        );
    }
    println!("\nXP: {}", progress.total_xp().await);
}

async fn show_progress(services: &AppServices, lesson: &LessonId) {
    let progress = services.progress();
    println!("{lesson}: {}", render::record(&progress.progress_record(lesson).await));
    match progress.last_result(lesson).await {
        Some(result) => println!("{}", render::result(&result)),
        None => println!("no result yet"),
    }
}

fn validate(catalog: &LessonCatalog) -> Result<()> {
    let issues = catalog.lint();
    if issues.is_empty() {
        println!("{} lesson(s), no issues", catalog.lessons().len());
        return Ok(());
    }
    for issue in &issues {
        println!("{}: {}", issue.lesson, issue.issue);
    }
    bail!("{} authoring issue(s) found", issues.len())
}

async fn vocab(
    services: &AppServices,
    scope: &VocabularyScope,
    toggle: Option<&str>,
    total: Option<usize>,
) {
    let vocabulary = services.vocabulary();
    let learned = match toggle {
        Some(term) => vocabulary.toggle(scope, term).await,
        None => vocabulary.load(scope).await,
    };

    let summary = format!(
        "{} {}: {} learned",
        scope.level(),
        scope.category(),
        learned.completed_count()
    );
    match total {
        Some(total) => println!("{summary} ({}%)", learned.percent(total)),
        None => println!("{summary}"),
    }
    for term in learned.terms() {
        println!("  ✓ {term}");
    }
}

async fn run() -> Result<()> {
    let cli = Cli::parse();

    match &cli.command {
        Commands::Validate => validate(&load_catalog(&cli.catalog).await?),
        Commands::Index => {
            let catalog = load_catalog(&cli.catalog).await?;
            println!("{}", serde_json::to_string_pretty(&catalog.index())?);
            Ok(())
        }
        Commands::List => {
            let catalog = load_catalog(&cli.catalog).await?;
            list(&open_services(&cli).await?, &catalog).await;
            Ok(())
        }
        Commands::Run {
            lesson,
            challenge,
            seconds,
        } => {
            let catalog = load_catalog(&cli.catalog).await?;
            let Some(definition) = catalog.get(&LessonId::new(lesson.as_str())) else {
                bail!("no lesson {lesson} in {}", cli.catalog.display());
            };
            let services = open_services(&cli).await?;
            play::run(&services, definition.clone(), *challenge, *seconds).await
        }
        Commands::Progress { lesson } => {
            show_progress(&open_services(&cli).await?, &LessonId::new(lesson.as_str())).await;
            Ok(())
        }
        Commands::Xp => {
            let services = open_services(&cli).await?;
            println!("{}", services.progress().total_xp().await);
            Ok(())
        }
        Commands::Vocab {
            level,
            category,
            toggle,
            total,
        } => {
            let scope = VocabularyScope::new(level.as_str(), category.as_str());
            vocab(&open_services(&cli).await?, &scope, toggle.as_deref(), *total).await;
            Ok(())
        }
    }
}

#[tokio::main]
async fn main() {
    env_logger::init();
    if let Err(err) = run().await {
        // At this layer (binary glue), printing once is fine.
        eprintln!("{err:#}");
        std::process::exit(2);
    }
}
