use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use datamantri::mock::{NewDashboard, ResourceApi};
use datamantri::{parse_file, DataSourceManager, MockConfig, MockService, UploadedFile};
use serde_json::json;
use tracing::info;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[clap(author, version, about)]
struct Cli {
    #[clap(short, long, global = true)]
    log_level: Option<String>,
    #[clap(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse a csv/xlsx/xls file and summarise its tables
    Parse { file: String },
    /// Register files as data sources and list every table
    Tables {
        #[clap(required = true)]
        files: Vec<String>,
    },
    /// Run a scripted session against the seeded mock backend
    Demo {
        #[clap(short, long)]
        config: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Cli::parse();
    setup_logging(args.log_level.as_deref());

    match args.command {
        Commands::Parse { file } => {
            let upload = UploadedFile::from_path(&file)
                .with_context(|| format!("Failed to read {}", file))?;
            let parsed = parse_file(&upload).await?;
            for (name, table) in &parsed {
                println!(
                    "{}: {} columns, {} rows [{}]",
                    name,
                    table.column_count,
                    table.row_count,
                    table.headers.join(", ")
                );
            }
        }
        Commands::Tables { files } => {
            let mut manager = DataSourceManager::new();
            for file in &files {
                let upload = UploadedFile::from_path(file)
                    .with_context(|| format!("Failed to read {}", file))?;
                let parsed = parse_file(&upload)
                    .await
                    .with_context(|| format!("Failed to parse {}", file))?;
                manager.add_data_source(&upload, parsed);
            }
            println!(
                "{}",
                serde_json::to_string_pretty(&manager.get_all_table_names())?
            );
        }
        Commands::Demo { config } => {
            let config = match config {
                Some(path) => MockConfig::from_yaml_file(&path)
                    .with_context(|| format!("Failed to load config {}", path))?,
                None => MockConfig::default(),
            };
            run_demo(MockService::seeded(config)).await?;
        }
    }

    Ok(())
}

async fn run_demo(service: MockService) -> Result<()> {
    let dashboards = service.dashboards();
    let existing = dashboards.list().await?;
    info!("Found {} dashboards", existing.len());

    let created = dashboards
        .create(NewDashboard {
            name: "Demo dashboard".to_string(),
            description: Some("Created by the demo command".to_string()),
            ..Default::default()
        })
        .await?;

    let run = service.trigger_pipeline("1").await?;
    info!("Waiting for run {} to finish", run.id);
    let finished = service.wait_for_run(&run.id).await?;

    let summary = json!({
        "dashboards_before": existing.len(),
        "created_dashboard": created,
        "pipeline_run": finished,
        "overview": service.overview_stats().await?,
    });
    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}

/// `RUST_LOG` wins when set; otherwise `--log-level` (default info) with calamine kept quiet
fn setup_logging(log_level: Option<&str>) {
    let level = log_level
        .and_then(|level| level.parse::<LevelFilter>().ok())
        .unwrap_or(LevelFilter::INFO);
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("calamine=warn,{}", level)));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .without_time()
        .init();
}
