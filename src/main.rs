use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use course_extraction::{
    build_config, collections, count_documents, load_export, run_extraction, CliOverrides,
    CsvWorkbook, ExtractConfig, ExtractionRequest, SqliteCourseStore,
};

/// Course catalogue extraction into CSV workbooks
#[derive(Parser, Debug)]
#[command(name = "course-extract")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Configuration file path (TOML format)
    #[arg(short, long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// SQLite course store
    #[arg(long, global = true, value_name = "FILE")]
    database: Option<PathBuf>,

    /// Root directory for CSV workbooks
    #[arg(long, global = true, value_name = "DIR")]
    output_dir: Option<PathBuf>,

    /// Pause between modules, in milliseconds
    #[arg(long, global = true)]
    write_delay_ms: Option<u64>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Load a JSON catalogue export into the course store
    Import {
        /// Export file: an object of collection name to document array
        export: PathBuf,
    },
    /// Flatten object ids and coerce numeric strings in stored documents
    Normalize,
    /// Run every extraction module for one university
    Extract {
        #[arg(long = "university")]
        university_id: String,

        #[arg(long = "spreadsheet")]
        spreadsheet_id: String,
    },
}

impl Cli {
    fn overrides(&self) -> CliOverrides {
        CliOverrides {
            config_file: self.config.clone(),
            database: self.database.clone(),
            output_dir: self.output_dir.clone(),
            write_delay_ms: self.write_delay_ms,
            log_level: self.log_level.clone(),
            ..Default::default()
        }
    }
}

fn init_tracing(log_level: &str) {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level)),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = build_config(&cli.overrides())?;

    init_tracing(config.log_level.as_filter_str());

    match &cli.command {
        Command::Import { export } => run_import(&config, export),
        Command::Normalize => run_normalize(&config),
        Command::Extract {
            university_id,
            spreadsheet_id,
        } => run_extract(&config, university_id, spreadsheet_id),
    }
}

fn open_store(config: &ExtractConfig) -> Result<SqliteCourseStore> {
    let store = SqliteCourseStore::open(&config.database_path)
        .with_context(|| format!("Failed to open {}", config.database_path.display()))?;
    Ok(store.with_degree_level(config.degree_level_id.clone()))
}

fn run_import(config: &ExtractConfig, export_path: &Path) -> Result<()> {
    println!("🗄️  Catalogue Import - JSON export → SQLite + WAL");
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");

    println!("\n📂 Loading export...");
    let export = load_export(export_path)?;
    println!("✓ Loaded {} collections", export.len());

    println!("\n🔧 Opening course store...");
    let store = open_store(config)?;
    println!("✓ {} ready", config.database_path.display());

    println!("\n💾 Importing documents...");
    let stats = store.import(&export)?;
    println!(
        "✓ {} inserted, {} updated, {} unchanged, {} skipped",
        stats.inserted, stats.updated, stats.unchanged, stats.skipped
    );

    println!("\n🔍 Verifying store...");
    let courses = count_documents(store.connection(), collections::COURSES)?;
    println!("✓ Store contains {} courses", courses);

    println!("\n━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    println!("✅ Import complete");
    if stats.skipped > 0 {
        println!("⚠️  {} documents had no usable _id", stats.skipped);
    }

    Ok(())
}

fn run_normalize(config: &ExtractConfig) -> Result<()> {
    println!("🧹 Normalizing stored documents...");
    let store = open_store(config)?;
    let changed = store.normalize()?;
    println!("✅ {} documents rewritten", changed);
    Ok(())
}

fn run_extract(config: &ExtractConfig, university_id: &str, spreadsheet_id: &str) -> Result<()> {
    println!("📊 Extracting {} → {}", university_id, spreadsheet_id);

    let store = open_store(config)?;
    let mut workbook = CsvWorkbook::open(&config.output_dir, spreadsheet_id)?;
    let request = ExtractionRequest::new(university_id, spreadsheet_id);

    let report = run_extraction(&store, &mut workbook, &request, config);

    for outcome in &report.outcomes {
        let mark = if outcome.error.is_none() { "✓" } else { "❌" };
        println!("{} {:<24} {:>6} rows  → {}", mark, outcome.module, outcome.rows, outcome.tab);
    }

    println!("\n{}", report.summary());
    println!("📁 Workbook: {}", workbook.dir().display());

    if !report.all_succeeded() {
        anyhow::bail!("{} module(s) failed", report.failed_modules().len());
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parses_extract() {
        let cli = Cli::parse_from([
            "course-extract",
            "--output-dir",
            "/tmp/out",
            "extract",
            "--university",
            "uni1",
            "--spreadsheet",
            "sheet-1",
        ]);

        match &cli.command {
            Command::Extract {
                university_id,
                spreadsheet_id,
            } => {
                assert_eq!(university_id, "uni1");
                assert_eq!(spreadsheet_id, "sheet-1");
            }
            other => panic!("unexpected command {:?}", other),
        }

        let overrides = cli.overrides();
        assert_eq!(overrides.output_dir, Some(PathBuf::from("/tmp/out")));
        assert!(overrides.port.is_none());
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::parse_from([
            "course-extract",
            "import",
            "export.json",
            "--database",
            "catalogue.db",
            "--write-delay-ms",
            "0",
        ]);

        assert!(matches!(cli.command, Command::Import { .. }));
        assert_eq!(cli.overrides().database, Some(PathBuf::from("catalogue.db")));
        assert_eq!(cli.overrides().write_delay_ms, Some(0));
    }

    #[test]
    fn test_extract_requires_ids() {
        assert!(Cli::try_parse_from(["course-extract", "extract", "--university", "u"]).is_err());
    }
}
