use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use logsift::analysis::{AnalysisRun, LogMetrics, ProgressEvent};
use logsift::config::{LogFormat, LogsiftConfig};
use logsift::detect::{AnalysisReport, LogInsightEngine};
use chrono::NaiveDateTime;
use logsift::logs::sample::{default_base, SampleGenerator, DEFAULT_SAMPLE_SIZE};
use logsift::logs::source::{FileSource, LogSource, SampleSource};
use logsift::logs::{parse_timestamp, LogLevel, LogRecord};
use logsift::search::{highlight, SearchFilter};

#[derive(Parser)]
#[command(
    name = "logsift",
    about = "Heuristic log insights: anomalies, recurring patterns and recommendations",
    version,
    long_about = None
)]
struct Cli {
    /// Path to a logsift.toml configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log output format (overrides the config file)
    #[arg(long, global = true, value_enum)]
    log_format: Option<LogFormat>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args, Clone)]
struct InputArgs {
    /// Log batch file (JSON array or JSON lines). Without it a sample batch is generated.
    #[arg(long, short)]
    input: Option<PathBuf>,

    /// Seed for the generated sample batch
    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// Size of the generated sample batch
    #[arg(long, default_value_t = DEFAULT_SAMPLE_SIZE)]
    count: usize,

    /// Newest timestamp of the generated sample batch (default 2024-01-15 15:00:00)
    #[arg(long, value_parser = parse_base)]
    base: Option<NaiveDateTime>,
}

#[derive(Args, Clone)]
struct FilterArgs {
    /// Case-insensitive text matched against message, service and level
    #[arg(long, short)]
    query: Option<String>,

    /// Keep only these levels (repeatable)
    #[arg(long = "level")]
    levels: Vec<LogLevel>,

    /// Keep only these services (repeatable)
    #[arg(long = "service")]
    services: Vec<String>,
}

impl FilterArgs {
    fn to_filter(&self) -> SearchFilter {
        SearchFilter {
            query: self.query.clone(),
            levels: self.levels.clone(),
            services: self.services.clone(),
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Detect anomalies and patterns and derive insights
    Analyze {
        #[command(flatten)]
        input: InputArgs,

        #[command(flatten)]
        filter: FilterArgs,

        /// JSON output for machine parsing
        #[arg(long)]
        json: bool,

        /// Show a progress bar while the analysis runs (Ctrl-C cancels)
        #[arg(long)]
        progress: bool,
    },

    /// Filter a batch and print matching records
    Search {
        #[command(flatten)]
        input: InputArgs,

        #[command(flatten)]
        filter: FilterArgs,

        /// Maximum number of records to print
        #[arg(long, default_value = "50")]
        limit: usize,

        /// JSON output for machine parsing
        #[arg(long)]
        json: bool,
    },

    /// Summarize a batch by level, service and hour
    Metrics {
        #[command(flatten)]
        input: InputArgs,

        /// JSON output for machine parsing
        #[arg(long)]
        json: bool,
    },

    /// Write a generated sample batch as JSON lines
    Sample {
        #[arg(long, default_value_t = 42)]
        seed: u64,

        #[arg(long, default_value_t = DEFAULT_SAMPLE_SIZE)]
        count: usize,

        /// Newest timestamp of the batch (default 2024-01-15 15:00:00)
        #[arg(long, value_parser = parse_base)]
        base: Option<NaiveDateTime>,

        /// Output file (stdout when omitted)
        #[arg(long, short)]
        output: Option<PathBuf>,
    },

    /// Serve the HTTP API over a loaded batch
    Serve {
        /// Bind address (defaults to server.bind from config)
        #[arg(long)]
        bind: Option<String>,

        /// Log batch file. Without it the configured sample batch is served.
        #[arg(long, short)]
        input: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = LogsiftConfig::resolve(cli.config.as_deref())?;
    if let Some(format) = cli.log_format {
        config.logging.format = format;
    }
    logsift::telemetry::init_tracing(&config.logging);

    match cli.command {
        Commands::Analyze {
            input,
            filter,
            json,
            progress,
        } => {
            let records = filter.to_filter().apply(&load_batch(&input).await?);
            let engine = LogInsightEngine::new(config.thresholds.clone());
            tracing::info!(records = records.len(), "Running analysis");

            let report = if progress {
                match run_with_progress(engine, records, &config).await? {
                    Some(report) => report,
                    None => {
                        eprintln!("Analysis cancelled.");
                        return Ok(());
                    }
                }
            } else {
                engine.analyze(&records)
            };

            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                print_report(&report);
            }
        }
        Commands::Search {
            input,
            filter,
            limit,
            json,
        } => {
            let records = load_batch(&input).await?;
            let filter = filter.to_filter();
            let hits = filter.apply(&records);

            if json {
                println!("{}", serde_json::to_string_pretty(&hits)?);
            } else {
                let query = filter.query.as_deref().map(str::trim).unwrap_or_default();
                for record in hits.iter().take(limit) {
                    println!(
                        "{} {:<7} {:<22} {}",
                        record.timestamp,
                        record.level.as_str().to_uppercase(),
                        record.service,
                        render_highlight(&record.message, query)?
                    );
                }
                match filter.active_filters() {
                    0 => println!("\n{} of {} records matched", hits.len(), records.len()),
                    n => println!(
                        "\n{} of {} records matched ({} level/service filters active)",
                        hits.len(),
                        records.len(),
                        n
                    ),
                }
            }
        }
        Commands::Metrics { input, json } => {
            let records = load_batch(&input).await?;
            let metrics = LogMetrics::compute(&records);
            if json {
                println!("{}", serde_json::to_string_pretty(&metrics)?);
            } else {
                print_metrics(&metrics);
            }
        }
        Commands::Sample {
            seed,
            count,
            base,
            output,
        } => {
            let base = base.unwrap_or_else(default_base);
            let records = SampleGenerator::with_base(seed, base).generate(count);
            let mut out: Box<dyn Write> = match &output {
                Some(path) => Box::new(std::io::BufWriter::new(
                    std::fs::File::create(path)
                        .with_context(|| format!("failed to create {}", path.display()))?,
                )),
                None => Box::new(std::io::stdout().lock()),
            };
            for record in &records {
                writeln!(out, "{}", serde_json::to_string(record)?)?;
            }
            out.flush()?;
            if let Some(path) = output {
                tracing::info!(path = %path.display(), records = records.len(), "Sample batch written");
            }
        }
        Commands::Serve { bind, input } => {
            let bind = bind.unwrap_or_else(|| config.server.bind.clone());
            let input = InputArgs {
                input,
                seed: config.server.sample_seed,
                count: config.server.sample_size,
                base: None,
            };
            let records = load_batch(&input).await?;
            tracing::info!(%bind, "Starting logsift server");
            logsift::serve(&bind, &config, records).await?;
        }
    }

    Ok(())
}

async fn load_batch(args: &InputArgs) -> Result<Vec<LogRecord>> {
    let source: Box<dyn LogSource> = match &args.input {
        Some(path) => Box::new(FileSource::new(path)),
        None => Box::new(SampleSource {
            seed: args.seed,
            count: args.count,
            base: args.base.unwrap_or_else(default_base),
        }),
    };
    let records = source
        .fetch()
        .await
        .with_context(|| format!("failed to load batch from {}", source.describe()))?;
    Ok(records)
}

async fn run_with_progress(
    engine: LogInsightEngine,
    records: Vec<LogRecord>,
    config: &LogsiftConfig,
) -> Result<Option<AnalysisReport>> {
    let mut run = AnalysisRun::spawn(Arc::new(engine), Arc::new(records), &config.progress);
    let cancel = run.cancel_token();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            cancel.cancel();
        }
    });

    let mut report = None;
    while let Some(event) = run.next_event().await {
        match event {
            ProgressEvent::Started { records } => eprintln!("Analyzing {} records...", records),
            ProgressEvent::Progress { percent } => {
                let filled = usize::from(percent / 5);
                eprint!("\r[{:<20}] {:>3}%", "#".repeat(filled), percent);
            }
            ProgressEvent::Completed(done) => {
                eprintln!();
                report = Some(*done);
            }
            ProgressEvent::Cancelled { percent } => {
                eprintln!("\nCancelled at {}%", percent);
            }
        }
    }
    run.finish().await?;
    Ok(report)
}

fn parse_base(raw: &str) -> Result<NaiveDateTime, String> {
    parse_timestamp(raw).ok_or_else(|| format!("unrecognized timestamp '{}'", raw))
}

fn render_highlight(text: &str, query: &str) -> Result<String> {
    let rendered = highlight(text, query)?
        .into_iter()
        .map(|seg| {
            if seg.matched {
                format!("[{}]", seg.text)
            } else {
                seg.text
            }
        })
        .collect();
    Ok(rendered)
}

fn print_report(report: &AnalysisReport) {
    println!("\n=== logsift Analysis Report ===");
    println!("Run:     {}", report.run_id);
    println!("Records: {}", report.record_count);

    println!("\nAnomalies ({}):", report.anomalies.len());
    for a in &report.anomalies {
        let severity = format!("{:?}", a.severity).to_uppercase();
        println!(" - [{:<8}] {} ({}) -- {}", severity, a.kind, a.count, a.description);
        println!("   services: {}", join(&a.services));
    }

    println!("\nPatterns ({}):", report.patterns.len());
    for p in &report.patterns {
        println!(
            " - \"{}\" x{} [{:?}] {}, {} services",
            p.pattern,
            p.frequency,
            p.category,
            p.time_range,
            p.services.len()
        );
    }

    println!("\nInsights ({}):", report.insights.len());
    for i in &report.insights {
        println!(" - [{:?}] {}: {}", i.impact, i.title, i.description);
        println!("   -> Recommendation: {}", i.recommendation);
    }
    println!("===============================\n");
}

fn print_metrics(m: &LogMetrics) {
    println!("\nlogsift Batch Metrics");
    println!("{:<15} | {}", "Total", m.total);
    println!(
        "{:<15} | {:.1}% ({}){}",
        "Error rate",
        m.error_rate,
        m.error_count,
        if m.error_rate_elevated { "  elevated" } else { "" }
    );
    println!(
        "{:<15} | {:.1}% ({}){}",
        "Success rate",
        m.success_rate,
        m.success_count,
        if m.success_rate_healthy { "  healthy" } else { "" }
    );

    println!("\n{:<22} | {:<7} | Errors", "Service", "Logs");
    println!("{:-<22}-|-{:-<7}-|-{:-<6}", "", "", "");
    for s in &m.top_services {
        println!("{:<22} | {:<7} | {}", s.service, s.count, s.error_count);
    }

    println!("\n{:<6} | {:<7} | Errors", "Hour", "Logs");
    println!("{:-<6}-|-{:-<7}-|-{:-<6}", "", "", "");
    for h in &m.hourly {
        println!("{:<6} | {:<7} | {}", h.time, h.total, h.errors);
    }
    if m.skipped_timestamps > 0 {
        println!("({} records with unparseable timestamps left out)", m.skipped_timestamps);
    }
    println!();
}

fn join<'a>(items: impl IntoIterator<Item = &'a String>) -> String {
    items.into_iter().map(String::as_str).collect::<Vec<_>>().join(", ")
}
