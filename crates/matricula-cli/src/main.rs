//! `matricula`: validate national identifiers, look up enrollment roster records and generate
//! enrollment certificates from a `.docx` template.
//!
//! Diagnostics go to stderr and are filtered with `RUST_LOG` (default `warn`).

mod output;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand, ValueEnum};
use matricula_certificate::{
    generate, suggested_file_name, CertificateConfig, CertificateFields, StrategyKind,
};
use matricula_id::NationalId;
use matricula_roster::{find, load_roster, RecordCollection, RecordMatch};
use tracing_subscriber::EnvFilter;

const EXIT_INVALID: i32 = 1;
const EXIT_NOT_FOUND: i32 = 2;

#[derive(Clone, Copy, Debug, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum StrategyArg {
    /// Replace the stock template's sample values.
    Literal,
    /// Recognize placeholders by shape (dates, identifiers, uppercase runs).
    Pattern,
}

impl From<StrategyArg> for StrategyKind {
    fn from(arg: StrategyArg) -> Self {
        match arg {
            StrategyArg::Literal => StrategyKind::Literal,
            StrategyArg::Pattern => StrategyKind::Pattern,
        }
    }
}

#[derive(Parser)]
#[command(
    name = "matricula",
    version,
    about = "Validate student identifiers, look them up in an enrollment roster and issue enrollment certificates."
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Check an identifier's check character and print its canonical form.
    Validate {
        /// Identifier including its check character, e.g. `12.345.678-5`.
        id: String,
    },
    /// Find the roster record for an identifier.
    Lookup {
        /// Identifier, with or without check character and separators.
        id: String,

        #[command(flatten)]
        roster: RosterArgs,

        /// Output format.
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },
    /// Fill the certificate template for an identifier and write it to disk.
    Generate(GenerateArgs),
}

#[derive(Args)]
struct RosterArgs {
    /// Roster workbook or CSV file. Overrides `roster` in the config file.
    #[arg(long)]
    roster: Option<PathBuf>,

    /// Worksheet to read (default: the first one).
    #[arg(long)]
    sheet: Option<String>,

    /// JSON settings file.
    #[arg(long)]
    config: Option<PathBuf>,
}

#[derive(Args)]
struct GenerateArgs {
    /// Identifier, with or without check character and separators.
    id: String,

    #[command(flatten)]
    roster: RosterArgs,

    /// Certificate template (.docx). Overrides `template` in the config file.
    #[arg(long)]
    template: Option<PathBuf>,

    /// Student name; falls back to the roster's name column.
    #[arg(long)]
    name: Option<String>,

    /// Issue date as `YYYY-MM-DD` (default: today).
    #[arg(long)]
    date: Option<NaiveDate>,

    /// Output file, or a directory to place the suggested file name in.
    #[arg(long)]
    out: Option<PathBuf>,

    /// Placeholder substitution strategy. Overrides `strategy` in the config file.
    #[arg(long, value_enum)]
    strategy: Option<StrategyArg>,
}

impl RosterArgs {
    /// The config file (or defaults) with command-line overrides applied.
    fn config(&self) -> Result<CertificateConfig> {
        let mut config = match &self.config {
            Some(path) => CertificateConfig::from_path(path)
                .with_context(|| format!("failed to read config {}", path.display()))?,
            None => CertificateConfig::default(),
        };
        if let Some(roster) = &self.roster {
            config.roster = Some(roster.clone());
        }
        if let Some(sheet) = &self.sheet {
            config.sheet = Some(sheet.clone());
        }
        Ok(config)
    }
}

fn open_roster(config: &CertificateConfig) -> Result<RecordCollection> {
    let path = config
        .roster
        .as_deref()
        .context("no roster given; pass --roster or set `roster` in the config file")?;
    let records = load_roster(path, config.sheet.as_deref(), &config.columns)
        .with_context(|| format!("failed to load roster {}", path.display()))?;
    let stats = records.stats();
    log::info!(
        "loaded {} records from {} ({} institutions, {} communes)",
        stats.total_records,
        path.display(),
        stats.institutions,
        stats.communes
    );
    Ok(records)
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    init_logging();
    let cli = Cli::parse();

    match cli.command {
        Command::Validate { id } => validate(&id),
        Command::Lookup { id, roster, format } => lookup(&id, &roster, format),
        Command::Generate(args) => generate_certificate(&args),
    }
}

fn validate(raw: &str) -> Result<()> {
    match NationalId::parse(raw) {
        Ok(id) => {
            println!("{id}");
            Ok(())
        }
        Err(err) => {
            eprintln!("invalid identifier {raw:?}: {err}");
            std::process::exit(EXIT_INVALID);
        }
    }
}

fn lookup(raw: &str, roster: &RosterArgs, format: OutputFormat) -> Result<()> {
    let config = roster.config()?;
    let records = open_roster(&config)?;
    warn_if_unverified(raw);
    let Some(found) = find(&records, raw) else {
        not_found(raw);
    };

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&found)?);
        }
        OutputFormat::Text => print_match(&found),
    }
    Ok(())
}

fn print_match(found: &RecordMatch<'_>) {
    let record = found.record;
    println!(
        "{} (matched by {})",
        NationalId::from_base(record.id_base),
        found.strategy
    );
    if let Some(name) = &record.name {
        println!("  name:        {name}");
    }
    println!(
        "  institution: {} (RBD {})",
        record.institution, record.institution_code
    );
    println!(
        "  course:      {}",
        matricula_certificate::format_course(&record.grade, &record.section)
    );
    println!("  school year: {}", record.school_year);
    println!("  commune:     {}", record.commune);
}

fn generate_certificate(args: &GenerateArgs) -> Result<()> {
    let mut config = args.roster.config()?;
    if let Some(template) = &args.template {
        config.template = Some(template.clone());
    }
    if let Some(strategy) = args.strategy {
        config.strategy = strategy.into();
    }
    let template_path = config
        .template
        .clone()
        .context("no template given; pass --template or set `template` in the config file")?;

    let records = open_roster(&config)?;
    warn_if_unverified(&args.id);
    let Some(found) = find(&records, &args.id) else {
        not_found(&args.id);
    };

    let today = chrono::Local::now().date_naive();
    let fields = CertificateFields::from_record(
        found.record,
        args.name.as_deref(),
        args.date.unwrap_or(today),
    )
    .context("cannot fill the certificate; pass --name")?;

    let template = read_template(&template_path)?;
    let document = generate(&template, &fields, &config.substitution_strategy())
        .with_context(|| format!("failed to fill template {}", template_path.display()))?;

    let dest = output::destination(
        args.out.as_deref(),
        &suggested_file_name(found.record.id_base, today),
    );
    output::write_atomic(&dest, &document)
        .with_context(|| format!("failed to write {}", dest.display()))?;

    println!("{}", dest.display());
    Ok(())
}

fn read_template(path: &Path) -> Result<Vec<u8>> {
    std::fs::read(path).with_context(|| format!("failed to read template {}", path.display()))
}

/// Lookups accept input without (or with a wrong) check character, but say so.
fn warn_if_unverified(raw: &str) {
    if matricula_id::normalize(raw).chars().count() < 2 {
        return;
    }
    if let Err(err) = NationalId::parse(raw) {
        eprintln!("warning: identifier {raw:?} did not verify ({err}); searching anyway");
    }
}

fn not_found(raw: &str) -> ! {
    eprintln!("no roster record for identifier {raw:?}");
    std::process::exit(EXIT_NOT_FOUND);
}
