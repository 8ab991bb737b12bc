//! CLI binary entrypoint.

mod commands;
mod context;
mod error;
mod format;

use clap::{Parser, Subcommand, ValueEnum};
use commands::{
    CartAction, SearchCommandInput, ThemeAction, run_cart, run_categories, run_product,
    run_search, run_theme,
};
use context::CliContext;
use error::{CliError, ExitCode};
use foodify_config::{to_pretty_json, to_pretty_toml};
use foodify_domain::{CategoryId, ProductId, SortKey, Theme};
use format::{OutputArgs, OutputMode};
use std::io::{self, Write};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(
    name = "foodify",
    version,
    about = "Browse the Open Food Facts catalog",
    long_about = None
)]
struct Cli {
    #[command(flatten)]
    output: OutputArgs,

    /// Optional config file path (JSON/TOML).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Preference file holding the cart and theme.
    #[arg(long, global = true)]
    prefs: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Search products by text, barcode or category.
    Search {
        /// Search text. A purely numeric value is looked up as a barcode.
        #[arg(default_value = "")]
        text: String,
        /// Category id to filter by (e.g. `en:breakfast-cereals`).
        #[arg(long)]
        category: Option<String>,
        /// Sort order: popularity, name, newest or grade.
        #[arg(long, value_parser = parse_sort, default_value = "popularity")]
        sort: SortKey,
        /// Hide products flagged as non-vegetarian.
        #[arg(long)]
        veg: bool,
        /// Number of pages to load.
        #[arg(long, default_value_t = 1)]
        pages: u32,
    },
    /// Show one product with its nutrition facts.
    Product {
        /// Product barcode.
        #[arg(value_parser = parse_product_id)]
        id: ProductId,
    },
    /// List popular categories.
    Categories,
    /// Shopping cart commands.
    Cart {
        #[command(subcommand)]
        command: CartCommands,
    },
    /// Theme preference commands.
    Theme {
        #[command(subcommand)]
        command: ThemeCommands,
    },
    /// Config-related commands.
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(Debug, Subcommand)]
enum CartCommands {
    /// Show the cart.
    List,
    /// Add a product by barcode (quantity +1 when already present).
    Add {
        #[arg(value_parser = parse_product_id)]
        id: ProductId,
    },
    /// Remove a product.
    Remove {
        #[arg(value_parser = parse_product_id)]
        id: ProductId,
    },
    /// Set a quantity; zero or less removes the line.
    Set {
        #[arg(value_parser = parse_product_id)]
        id: ProductId,
        #[arg(allow_negative_numbers = true)]
        quantity: i64,
    },
    /// Empty the cart.
    Clear,
}

#[derive(Debug, Subcommand)]
enum ThemeCommands {
    /// Show the active theme.
    Show,
    /// Switch between light and dark.
    Toggle,
    /// Set the theme explicitly.
    Set {
        #[arg(value_parser = parse_theme)]
        theme: Theme,
    },
}

#[derive(Debug, Subcommand)]
enum ConfigCommands {
    /// Print the effective config (defaults, file and env merged).
    Show {
        #[arg(long, value_enum, default_value_t)]
        format: ConfigFormat,
    },
}

#[derive(Debug, Clone, Copy, Default, ValueEnum)]
enum ConfigFormat {
    #[default]
    Toml,
    Json,
}

pub(crate) struct CliOutput {
    pub(crate) stdout: String,
    pub(crate) stderr: String,
    pub(crate) exit_code: ExitCode,
}

fn main() -> std::process::ExitCode {
    let cli = Cli::parse();
    let mode = OutputMode::from_args(&cli.output);
    init_tracing(mode);

    match run(&cli, mode) {
        Ok(output) => match write_output(&output) {
            Ok(()) => std::process::ExitCode::from(output.exit_code.as_u8()),
            Err(error) => exit_with_error(&error),
        },
        Err(error) => exit_with_error(&error),
    }
}

fn exit_with_error(error: &CliError) -> std::process::ExitCode {
    let _ = writeln!(io::stderr(), "error: {error}");
    std::process::ExitCode::from(error.exit_code().as_u8())
}

fn init_tracing(mode: OutputMode) {
    let fallback = match mode.verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr);
    let _ = if mode.is_json() {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
}

fn run(cli: &Cli, mode: OutputMode) -> Result<CliOutput, CliError> {
    let ctx = CliContext::load(mode, cli.config.as_deref(), cli.prefs.as_deref())?;
    if let Commands::Config { command } = &cli.command {
        return config_command(&ctx, command);
    }

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    runtime.block_on(dispatch(&ctx, &cli.command, mode))
}

async fn dispatch(
    ctx: &CliContext,
    command: &Commands,
    mode: OutputMode,
) -> Result<CliOutput, CliError> {
    match command {
        Commands::Search {
            text,
            category,
            sort,
            veg,
            pages,
        } => {
            let category = CategoryId::parse_selection(category.as_deref().unwrap_or_default())
                .map_err(|error| CliError::InvalidInput(error.to_string()))?;
            let input = SearchCommandInput {
                text: text.clone(),
                category,
                sort: *sort,
                veg_only: *veg,
                pages: *pages,
            };
            run_search(ctx, mode, input).await
        },
        Commands::Product { id } => run_product(ctx, mode, id.clone()).await,
        Commands::Categories => run_categories(ctx, mode).await,
        Commands::Cart { command } => {
            let action = match command {
                CartCommands::List => CartAction::List,
                CartCommands::Add { id } => CartAction::Add(id.clone()),
                CartCommands::Remove { id } => CartAction::Remove(id.clone()),
                CartCommands::Set { id, quantity } => CartAction::Set(id.clone(), *quantity),
                CartCommands::Clear => CartAction::Clear,
            };
            run_cart(ctx, mode, action).await
        },
        Commands::Theme { command } => {
            let action = match command {
                ThemeCommands::Show => ThemeAction::Show,
                ThemeCommands::Toggle => ThemeAction::Toggle,
                ThemeCommands::Set { theme } => ThemeAction::Set(*theme),
            };
            run_theme(ctx, mode, action).await
        },
        Commands::Config { command } => config_command(ctx, command),
    }
}

fn config_command(ctx: &CliContext, command: &ConfigCommands) -> Result<CliOutput, CliError> {
    let ConfigCommands::Show { format } = command;
    let config = ctx.config().as_config();
    let mut stdout = match format {
        ConfigFormat::Toml => to_pretty_toml(config)?,
        ConfigFormat::Json => to_pretty_json(config)?,
    };
    if !stdout.ends_with('\n') {
        stdout.push('\n');
    }
    Ok(CliOutput {
        stdout,
        stderr: String::new(),
        exit_code: ExitCode::Ok,
    })
}

fn parse_sort(value: &str) -> Result<SortKey, String> {
    value.parse().map_err(|error: foodify_domain::UnknownSortKey| error.to_string())
}

fn parse_product_id(value: &str) -> Result<ProductId, String> {
    ProductId::parse(value).map_err(|error| error.to_string())
}

fn parse_theme(value: &str) -> Result<Theme, String> {
    value.parse().map_err(|error: foodify_domain::UnknownTheme| error.to_string())
}

fn write_output(output: &CliOutput) -> Result<(), CliError> {
    let mut stdout = io::stdout();
    stdout.write_all(output.stdout.as_bytes())?;

    if !output.stderr.is_empty() {
        let mut stderr = io::stderr();
        stderr.write_all(output.stderr.as_bytes())?;
        stderr.flush()?;
    }

    Ok(())
}
