//! # CLI Layer
//!
//! One possible UI client for the Natura core, and the only place that
//! knows about terminal I/O, argument parsing and logging setup.
//!
//! - `run()`: parse, install logging, build the context, dispatch
//! - `handle_*()`: call the API and render the `CmdResult`

use super::print::{print_creations, print_full_creations, print_messages, print_status};
use super::setup::{Cli, Commands, KeyAction};
use clap::Parser;
use naturaapp::api::{CmdResult, CreationFilter, NaturaApi};
use naturaapp::backup::HttpFetcher;
use naturaapp::commands::add::image_reference;
use naturaapp::error::Result;
use naturaapp::init::initialize;
use naturaapp::model::{CreationKind, NewCreation};
use naturaapp::store::Backend;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

const LOG_ENV: &str = "NATURA_LOG";

struct AppContext {
    api: NaturaApi<Backend>,
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let cwd = std::env::current_dir()?;
    let ctx = AppContext {
        api: initialize(&cwd, cli.data_dir.clone(), cli.environment)?.api,
    };

    match cli.command {
        Some(Commands::Add {
            kind,
            name,
            image,
            scientific_name,
            description,
        }) => handle_add(&ctx, kind, name, image, scientific_name, description),
        Some(Commands::List { kind }) => handle_list(&ctx, kind),
        None => handle_list(&ctx, None),
        Some(Commands::View { selectors }) => handle_view(&ctx, &selectors),
        Some(Commands::Delete { selectors }) => handle_delete(&ctx, &selectors),
        Some(Commands::Export) => handle_export(&ctx),
        Some(Commands::Import { file, replace }) => handle_import(&ctx, file, replace),
        Some(Commands::Doctor) => handle_doctor(&ctx),
        Some(Commands::Key { action }) => handle_key(&ctx, action),
        Some(Commands::Status) => handle_status(&ctx),
    }
}

/// Diagnostics go to stderr. `--verbose` forces debug; otherwise
/// `NATURA_LOG` is honoured, defaulting to warnings only.
fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn handle_add(
    ctx: &AppContext,
    kind: CreationKind,
    name: String,
    image: String,
    scientific_name: String,
    description: String,
) -> Result<()> {
    let new = NewCreation::new(kind, name, image_reference(&image)?)
        .with_scientific_name(scientific_name)
        .with_description(description);
    let result = ctx.api.add_creation(new)?;
    render_affected(&result);
    Ok(())
}

fn handle_list(ctx: &AppContext, kind: Option<CreationKind>) -> Result<()> {
    let filter = CreationFilter { kind };
    let result = ctx.api.list_creations(&filter)?;
    print_creations(&result.listed);
    print_messages(&result.messages);
    Ok(())
}

fn handle_view(ctx: &AppContext, selectors: &[String]) -> Result<()> {
    let result = ctx.api.view_creations(selectors)?;
    print_full_creations(&result.listed);
    print_messages(&result.messages);
    Ok(())
}

fn handle_delete(ctx: &AppContext, selectors: &[String]) -> Result<()> {
    let result = ctx.api.delete_creations(selectors)?;
    render_affected(&result);
    Ok(())
}

fn handle_export(ctx: &AppContext) -> Result<()> {
    let result = ctx.api.export_backup(&HttpFetcher::new())?;
    print_messages(&result.messages);
    Ok(())
}

fn handle_import(ctx: &AppContext, file: PathBuf, replace: bool) -> Result<()> {
    let result = ctx.api.import_backup(&file, replace)?;
    render_affected(&result);
    Ok(())
}

fn handle_doctor(ctx: &AppContext) -> Result<()> {
    let result = ctx.api.doctor()?;
    print_messages(&result.messages);
    Ok(())
}

fn handle_key(ctx: &AppContext, action: KeyAction) -> Result<()> {
    let result = match action {
        KeyAction::Get { reveal } => ctx.api.get_credential(reveal)?,
        KeyAction::Set { value } => ctx.api.set_credential(&value)?,
    };
    print_messages(&result.messages);
    Ok(())
}

fn handle_status(ctx: &AppContext) -> Result<()> {
    let result = ctx.api.status()?;
    if let Some(report) = &result.status {
        print_status(report);
    }
    print_messages(&result.messages);
    Ok(())
}

fn render_affected(result: &CmdResult) {
    if !result.affected.is_empty() {
        print_creations(&result.affected);
    }
    print_messages(&result.messages);
}
