use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::{info, warn};

use refsplit_core::storage::{self, json_records, marcxml};
use refsplit_core::{AppConfig, ExitCode, OutputFormat, Record, RecordId};
use refsplit_references::references::clean_reference;
use refsplit_references::{BatchRunner, CatalogMatcher, ReferenceSplitter, SplitOptions};

// ─── CLI Definition ─────────────────────────────────────────────────────────

#[derive(Parser)]
#[command(
    name = "refsplit",
    about = "Split reference fields that cite several works at once",
    version,
    long_about = None
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output in JSON format (for scripts).
    /// Also enabled by setting REFSPLIT_JSON=1.
    #[arg(long, global = true)]
    json: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Clean and split the reference fields of a record collection.
    Split {
        /// Records to process (JSON array, or MARCXML when ending in .xml).
        records: PathBuf,
        /// Catalog of known records used to resolve reference parts.
        #[arg(long)]
        catalog: PathBuf,
        /// Only process the record with this id.
        #[arg(long)]
        record: Option<RecordId>,
        #[arg(long)]
        output_dir: Option<PathBuf>,
        /// Base name of the output files.
        #[arg(long)]
        name: Option<String>,
        /// Reference field tag.
        #[arg(long)]
        tag: Option<String>,
        /// Records split into more parts than this go to the `.many` output.
        #[arg(long)]
        limit_split: Option<usize>,
        /// Output format: marcxml or json.
        #[arg(long)]
        format: Option<String>,
    },

    /// Show the cleanup each reference field would get, without resolving it.
    Clean {
        records: PathBuf,
        #[arg(long)]
        tag: Option<String>,
    },

    /// Config management.
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// Show version information.
    Version,
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Show all config values.
    List,
    /// Get a specific config key.
    Get { key: String },
    /// Print the config file location.
    Path,
}

// ─── Main ────────────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    let start = Instant::now();
    let cli = Cli::parse();

    let json_output = cli.json || std::env::var("REFSPLIT_JSON").as_deref() == Ok("1");

    let mut config = AppConfig::load()?;
    config.apply_env_overrides();
    init_logging(&config.logging.level);

    match cli.command {
        Commands::Split {
            records,
            catalog,
            record,
            output_dir,
            name,
            tag,
            limit_split,
            format,
        } => {
            if let Some(tag) = tag {
                config.split.tag = tag;
            }
            if let Some(limit) = limit_split {
                config.split.limit_split = limit;
            }
            if let Some(format) = format {
                config.core.output_format = format.parse()?;
            }
            if let Some(dir) = output_dir {
                config.core.output_dir = dir.to_string_lossy().to_string();
            }
            config.validate()?;

            require_file(&records, json_output, start)?;
            require_file(&catalog, json_output, start)?;
            run_split(&config, &records, &catalog, record, name, json_output, start)?;
        }

        Commands::Clean { records, tag } => {
            let tag = tag.unwrap_or_else(|| config.split.tag.clone());
            require_file(&records, json_output, start)?;
            run_clean(&records, &tag, json_output, start)?;
        }

        Commands::Config { action } => {
            let dur = start.elapsed().as_millis();
            match action {
                ConfigAction::List => {
                    let kv: Vec<(&str, String)> = AppConfig::KEYS
                        .iter()
                        .filter_map(|key| config.get(key).map(|value| (*key, value)))
                        .collect();
                    if json_output {
                        let data: serde_json::Map<String, serde_json::Value> = kv
                            .iter()
                            .map(|(k, v)| (k.to_string(), serde_json::Value::from(v.as_str())))
                            .collect();
                        print_json(&serde_json::json!({"status":"ok","data":data,"meta":{"duration_ms":dur}}))?;
                    } else {
                        for (k, v) in &kv {
                            println!("{k} = {v}");
                        }
                    }
                }
                ConfigAction::Get { key } => match config.get(&key) {
                    Some(val) => {
                        if json_output {
                            print_json(&serde_json::json!({"status":"ok","data":{"key":key,"value":val},"meta":{"duration_ms":dur}}))?;
                        } else {
                            println!("{val}");
                        }
                    }
                    None => {
                        if json_output {
                            print_json(&serde_json::json!({"status":"error","error":"not_found","message":format!("Unknown config key: {key}"),"meta":{"duration_ms":dur}}))?;
                        } else {
                            eprintln!("Unknown config key: {key}");
                        }
                        std::process::exit(ExitCode::NotFound as i32);
                    }
                },
                ConfigAction::Path => {
                    let path = AppConfig::config_path();
                    if json_output {
                        print_json(&serde_json::json!({"status":"ok","data":{"path":path,"exists":path.exists()},"meta":{"duration_ms":dur}}))?;
                    } else {
                        println!("{}", path.display());
                    }
                }
            }
        }

        Commands::Version => {
            let version = env!("CARGO_PKG_VERSION");
            let dur = start.elapsed().as_millis();
            if json_output {
                print_json(&serde_json::json!({"status":"ok","data":{"version":version},"meta":{"duration_ms":dur}}))?;
            } else {
                println!("refsplit v{version}");
            }
        }
    }

    Ok(())
}

// ─── Commands ────────────────────────────────────────────────────────────────

fn run_split(
    config: &AppConfig,
    records_path: &Path,
    catalog_path: &Path,
    only: Option<RecordId>,
    name: Option<String>,
    json_output: bool,
    start: Instant,
) -> Result<()> {
    let mut records = storage::load_any(records_path)
        .with_context(|| format!("failed to load records from {}", records_path.display()))?;
    let matcher = CatalogMatcher::load(catalog_path)?.with_years_from_records(
        &records,
        &config.split.year_tag,
        config.split.year_code,
    );
    info!(
        records = records.len(),
        catalog = matcher.len(),
        tag = %config.split.tag,
        "starting split"
    );

    if let Some(id) = only {
        records = vec![json_records::find_record(&records, id)?.clone()];
    }

    let name = name.unwrap_or_else(|| default_output_name(&records));
    let output_dir = config.output_dir();
    std::fs::create_dir_all(&output_dir)?;
    let correct_path = output_dir.join(format!("{name}.correct"));
    let many_path = output_dir.join(format!("{name}.many.correct"));
    let log_path = output_dir.join(format!("{name}.log"));

    let splitter = ReferenceSplitter::new(&matcher, SplitOptions::from(&config.split));
    let runner = BatchRunner::new(splitter, &config.split);
    let report = runner.run(records);

    let format = config.core.output_format;
    write_records(&correct_path, &report.regular, format)?;
    write_records(&many_path, &report.many, format)?;
    std::fs::write(&log_path, report.render_log())?;

    let dur = start.elapsed().as_millis();
    if json_output {
        print_json(&serde_json::json!({
            "status": "ok",
            "data": {
                "processed": report.processed,
                "updated": report.updated(),
                "many": report.many.len(),
                "stats": report.stats,
                "outputs": {
                    "correct": correct_path,
                    "many": many_path,
                    "log": log_path,
                },
            },
            "meta": {
                "duration_ms": dur,
                "finished_at": chrono::Utc::now().to_rfc3339(),
            }
        }))?;
    } else {
        println!("{}", report.summary());
        println!("  Updated records: {}", report.updated());
        println!("  Over limit:      {}", report.many.len());
        println!("  Output:          {}", correct_path.display());
        println!("  Log:             {}", log_path.display());
    }
    Ok(())
}

fn run_clean(records_path: &Path, tag: &str, json_output: bool, start: Instant) -> Result<()> {
    let records = storage::load_any(records_path)
        .with_context(|| format!("failed to load records from {}", records_path.display()))?;

    let mut items = Vec::new();
    for record in &records {
        for (index, field) in record.fields_with_tag(tag).enumerate() {
            let (reference, log) = clean_reference(&field.subfields);
            if log.is_empty() {
                continue;
            }
            if json_output {
                items.push(serde_json::json!({
                    "record": record.id,
                    "field": index,
                    "changes": log.entries(),
                    "cleaned": reference.to_string(),
                }));
            } else {
                println!("Cleanup in {} : {log}", record.id);
            }
        }
    }

    if json_output {
        let dur = start.elapsed().as_millis();
        print_json(&serde_json::json!({"status":"ok","data":{"items":items,"records":records.len()},"meta":{"duration_ms":dur}}))?;
    }
    Ok(())
}

// ─── Helpers ────────────────────────────────────────────────────────────────

fn init_logging(level: &str) {
    use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "refsplit={level},refsplit_core={level},refsplit_references={level}"
        ))
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr)
                .compact(),
        )
        .init();
}

/// `multiple_s.<recid>` for a single record, `multiple_s.out` otherwise.
fn default_output_name(records: &[Record]) -> String {
    match records {
        [record] => format!("multiple_s.{}", record.id),
        _ => "multiple_s.out".to_string(),
    }
}

fn write_records(path: &Path, records: &[Record], format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Marcxml => std::fs::write(path, marcxml::to_collection_xml(records)?)?,
        OutputFormat::Json => json_records::save_records(path, records)?,
    }
    Ok(())
}

fn require_file(path: &Path, json_output: bool, start: Instant) -> Result<()> {
    if path.is_file() {
        return Ok(());
    }
    let message = format!("File not found: {}", path.display());
    warn!(path = %path.display(), "input file missing");
    if json_output {
        let dur = start.elapsed().as_millis();
        print_json(&serde_json::json!({"status":"error","error":"not_found","message":message,"meta":{"duration_ms":dur}}))?;
    } else {
        eprintln!("{message}");
    }
    std::process::exit(ExitCode::FileSystemError as i32);
}

fn print_json(val: &serde_json::Value) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(val)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn output_name_depends_on_record_count() {
        assert_eq!(default_output_name(&[Record::new(1791872)]), "multiple_s.1791872");
        assert_eq!(default_output_name(&[]), "multiple_s.out");
        assert_eq!(
            default_output_name(&[Record::new(1), Record::new(2)]),
            "multiple_s.out"
        );
    }

    #[test]
    fn cli_parses_split_flags() {
        let cli = Cli::parse_from([
            "refsplit",
            "split",
            "records.json",
            "--catalog",
            "catalog.json",
            "--limit-split",
            "3",
            "--record",
            "1791872",
            "--json",
        ]);
        assert!(cli.json);
        match cli.command {
            Commands::Split {
                catalog,
                record,
                limit_split,
                ..
            } => {
                assert_eq!(catalog, PathBuf::from("catalog.json"));
                assert_eq!(record, Some(RecordId(1_791_872)));
                assert_eq!(limit_split, Some(3));
            }
            _ => panic!("expected split"),
        }
    }
}
