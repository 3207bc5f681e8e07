use std::{
    io::{self, Write},
    process,
    sync::Arc,
};

use quire::{
    application::{
        error::AppError,
        provision::{ProvisionOptions, provision, quizbin_fixture},
        render::{ModeRegistry, PageRenderer, RegistryOptions, RenderOptions},
        repos::{LayoutsRepo, ModesRepo, PagesRepo},
    },
    cache::{CacheConfig, RenderCache},
    config,
    domain::layouts::lint_layout,
    infra::{db::PostgresRepositories, error::InfraError, telemetry},
};
use time::format_description::well_known::Rfc3339;
use tracing::{Dispatch, Level, dispatcher, error, info, warn};
use tracing_subscriber::fmt as tracing_fmt;

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        report_application_error(&error);
        process::exit(error.exit_code().into());
    }
}

fn report_application_error(error: &AppError) {
    let report = error.report();
    if dispatcher::has_been_set() {
        error!(
            error = %error,
            chain = ?report.messages,
            summary = error.presentation_message(),
            "application error"
        );
        return;
    }

    let subscriber = tracing_fmt()
        .with_writer(io::stderr)
        .with_max_level(Level::ERROR)
        .finish();
    let dispatch = Dispatch::new(subscriber);
    dispatcher::with_default(&dispatch, || {
        error!(
            error = %error,
            chain = ?report.messages,
            summary = error.presentation_message(),
            "application error"
        );
    });
}

async fn run() -> Result<(), AppError> {
    let (cli_args, settings) = config::load_with_cli()
        .map_err(|err| InfraError::configuration(format!("failed to load configuration: {err}")))?;

    telemetry::init(&settings.logging)?;

    match cli_args.command {
        config::Command::Render(args) => run_render(&settings, args).await,
        config::Command::Seed(args) => run_seed(&settings, args).await,
        config::Command::LintLayouts => run_lint_layouts(&settings).await,
    }
}

async fn connect(settings: &config::Settings) -> Result<Arc<PostgresRepositories>, AppError> {
    let database_url = settings
        .database
        .url
        .as_ref()
        .ok_or_else(|| InfraError::configuration("database url is not configured"))?;

    let pool = PostgresRepositories::connect(database_url, settings.database.max_connections.get())
        .await
        .map_err(InfraError::from)?;

    Ok(Arc::new(PostgresRepositories::new(pool)))
}

async fn run_render(settings: &config::Settings, args: config::RenderArgs) -> Result<(), AppError> {
    let repositories = connect(settings).await?;

    let pages: Arc<dyn PagesRepo> = repositories.clone();
    let modes: Arc<dyn ModesRepo> = repositories.clone();
    let layouts: Arc<dyn LayoutsRepo> = repositories;
    let registry = Arc::new(ModeRegistry::builtin(RegistryOptions {
        sanitize_html: settings.render.sanitize_html,
    }));

    let mut renderer = PageRenderer::new(pages, modes, layouts, registry).with_options(
        RenderOptions {
            markdown_byline: settings.render.markdown_byline,
        },
    );
    let cache_config = CacheConfig::from(&settings.cache);
    if cache_config.enabled {
        renderer = renderer.with_cache(Arc::new(RenderCache::new(&cache_config)));
    }

    let document = renderer.render(&args.page_id).await?;

    let output = if args.json {
        let last_modified = document
            .last_modified
            .format(&Rfc3339)
            .map_err(|err| AppError::unexpected(err.to_string()))?;
        let value = serde_json::json!({
            "page_id": args.page_id,
            "last_modified": last_modified,
            "body": document.body,
        });
        serde_json::to_string_pretty(&value)
            .map_err(|err| AppError::unexpected(err.to_string()))?
    } else {
        document.body
    };

    let mut stdout = io::stdout().lock();
    stdout.write_all(output.as_bytes()).map_err(InfraError::from)?;
    stdout.write_all(b"\n").map_err(InfraError::from)?;
    Ok(())
}

async fn run_seed(settings: &config::Settings, args: config::SeedArgs) -> Result<(), AppError> {
    let repositories = connect(settings).await?;

    PostgresRepositories::run_migrations(repositories.pool())
        .await
        .map_err(InfraError::migration)?;

    let report = provision(
        repositories.as_ref(),
        &quizbin_fixture(),
        ProvisionOptions {
            refresh_layouts: args.refresh_layouts,
        },
    )
    .await?;

    info!(
        inserted = report.inserted,
        skipped = report.skipped,
        refreshed = report.refreshed,
        "seed complete"
    );
    Ok(())
}

async fn run_lint_layouts(settings: &config::Settings) -> Result<(), AppError> {
    let repositories = connect(settings).await?;
    let layouts = repositories.list_layouts().await?;

    let mut failures = 0usize;
    for layout in &layouts {
        match lint_layout(layout) {
            Ok(()) => info!(layout_id = layout.id, "layout ok"),
            Err(err) => {
                failures += 1;
                warn!(layout_id = layout.id, error = %err, "layout failed lint");
            }
        }
    }

    if failures > 0 {
        return Err(AppError::validation(format!(
            "{failures} of {} layouts failed lint",
            layouts.len()
        )));
    }

    info!(count = layouts.len(), "all layouts passed lint");
    Ok(())
}
