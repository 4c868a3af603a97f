use chrono::Local;
use clap::{Parser, Subcommand};
use handreceipt::naming::default_output_name;
use handreceipt::{
    ConfigError, GenerateError, Generator, HeaderMeta, IssuedItem, LayoutConfig, LayoutStore,
    StaticPassword,
};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use thiserror::Error;

#[derive(Parser, Debug)]
#[command(
    version,
    about = "Stamp issued equipment onto a DA 2062 hand receipt template",
    long_about = None
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Generate a hand receipt PDF.
    Generate(GenerateArgs),
    /// Inspect or edit the layout calibration.
    Calibrate {
        /// Calibration file.
        #[arg(long, global = true, default_value = LayoutStore::DEFAULT_PATH)]
        layout: PathBuf,
        #[command(subcommand)]
        action: CalibrateAction,
    },
}

#[derive(clap::Args, Debug)]
struct GenerateArgs {
    /// Flattened PDF form used as the page background.
    #[arg(long)]
    template: PathBuf,
    /// JSON array of issued items ({model, category, serial, asset_tag}).
    #[arg(long)]
    items: PathBuf,
    /// Name printed in the issued-from block.
    #[arg(long)]
    from: String,
    /// Custodian name printed in the issued-to block.
    #[arg(long)]
    to: String,
    /// Custodian contact details.
    #[arg(long, default_value = "")]
    contact: String,
    /// Output file; defaults to DA2062_<custodian>_<date>.pdf in --out-dir.
    #[arg(long)]
    output: Option<PathBuf>,
    #[arg(long, default_value = ".")]
    out_dir: PathBuf,
    /// Calibration file.
    #[arg(long, default_value = LayoutStore::DEFAULT_PATH)]
    layout: PathBuf,
    /// Password for a protected template.
    #[arg(long, env = "HANDRECEIPT_TEMPLATE_PASSWORD", hide_env_values = true)]
    template_password: Option<String>,
}

#[derive(Subcommand, Debug)]
enum CalibrateAction {
    /// Print the effective calibration as JSON.
    Show,
    /// Change one field and save.
    Set { field: String, value: String },
    /// Restore the default calibration.
    Reset,
}

#[derive(Error, Debug)]
enum CliError {
    #[error("Could not read items file {}: {source}", .path.display())]
    ItemsRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Items file {} is not a JSON array of items: {source}", .path.display())]
    ItemsParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error(transparent)]
    Generate(#[from] GenerateError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Failed to print calibration: {0}")]
    Json(#[from] serde_json::Error),
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let result = match cli.command {
        Command::Generate(args) => generate(args),
        Command::Calibrate { layout, action } => calibrate(&layout, action),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn generate(args: GenerateArgs) -> Result<(), CliError> {
    let items = read_items(&args.items)?;
    let cfg = LayoutStore::new(&args.layout).load();
    let meta = HeaderMeta::new(&args.from, &args.to, &args.contact);
    let output = args.output.unwrap_or_else(|| {
        args.out_dir.join(default_output_name(&args.to, Local::now().date_naive()))
    });

    let generator = Generator::new(&args.template);
    let summary = match args.template_password {
        Some(password) => generator
            .with_credentials(StaticPassword(password))
            .generate(&output, &meta, &items, &cfg)?,
        None => generator.generate(&output, &meta, &items, &cfg)?,
    };

    println!(
        "Generated {} ({} page(s), {} row(s))",
        summary.output_path.display(),
        summary.pages_written,
        summary.rows_written
    );
    if summary.truncated_lines > 0 {
        println!(
            "Warning: {} wrapped line(s) did not fit and were left out",
            summary.truncated_lines
        );
    }
    Ok(())
}

fn read_items(path: &Path) -> Result<Vec<IssuedItem>, CliError> {
    let text = fs::read_to_string(path)
        .map_err(|source| CliError::ItemsRead { path: path.to_path_buf(), source })?;
    serde_json::from_str(&text)
        .map_err(|source| CliError::ItemsParse { path: path.to_path_buf(), source })
}

fn calibrate(layout: &Path, action: CalibrateAction) -> Result<(), CliError> {
    let store = LayoutStore::new(layout);
    let cfg = match action {
        CalibrateAction::Show => store.load(),
        CalibrateAction::Set { field, value } => {
            let mut cfg = store.load();
            cfg.set_field(&field, &value)?;
            store.save(&cfg)?;
            cfg
        }
        CalibrateAction::Reset => store.reset()?,
    };
    print_layout(&cfg)
}

fn print_layout(cfg: &LayoutConfig) -> Result<(), CliError> {
    println!("{}", serde_json::to_string_pretty(cfg)?);
    Ok(())
}
