use std::path::PathBuf;

use clap::{Parser, Subcommand};
use indicatif::ProgressBar;
use snafu::{Report, ResultExt, Whatever};
use tracing::{error, info};

use omics_tools::intensity::{self, IntensityRecord};
use omics_tools::inventory::{self, regions::OMICS_REGIONS, report, report::ReportFormat, OmicsCatalog};
use omics_tools::storage::{self, S3Config};

#[derive(Parser)]
#[command(name = "omics-tools", version, about = "HealthOmics store inventory and DICOM intensity statistics")]
struct Cli {
    /// verbose mode
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Consolidate HealthOmics data stores from every supported region
    /// into a dated inventory file
    Inventory {
        /// output file format
        #[arg(long, value_enum, default_value_t = ReportFormat::Csv)]
        format: ReportFormat,

        /// directory the dated inventory file is written to
        #[arg(long, default_value = ".")]
        output_dir: PathBuf,
    },

    /// Compute pixel intensity statistics for the DICOM files in an
    /// S3 bucket or a local directory
    Intensity {
        /// the S3 bucket containing the DICOM files
        #[arg(required_unless_present = "dir", conflicts_with = "dir")]
        bucket: Option<String>,

        /// read DICOM files from a local directory instead of a bucket
        #[arg(long)]
        dir: Option<PathBuf>,

        /// object key prefix to list under
        #[arg(long, default_value = "")]
        prefix: String,

        /// AWS region of the bucket
        #[arg(long, default_value = "us-east-1")]
        region: String,

        /// S3 endpoint (e.g., "http://localhost:9000" for MinIO)
        #[arg(long)]
        endpoint: Option<String>,

        /// AWS access key ID; falls back to the default credential chain
        #[arg(long, requires = "secret_key")]
        access_key: Option<String>,

        /// AWS secret access key
        #[arg(long, requires = "access_key")]
        secret_key: Option<String>,

        /// process only the first matching file and print one JSON record
        #[arg(long)]
        first_only: bool,

        /// output CSV file
        #[arg(long, default_value = intensity::OUTPUT_FILE)]
        output: PathBuf,
    },
}

fn init_tracing(verbose: bool) {
    use tracing_subscriber::EnvFilter;
    // RUST_LOG wins over the verbose flag
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if verbose {
            EnvFilter::new("debug")
        } else {
            EnvFilter::new("info")
        }
    });
    let _ = tracing::subscriber::set_global_default(
        tracing_subscriber::FmtSubscriber::builder()
            .with_env_filter(filter)
            .finish(),
    );
}

/// Query every region offering the service and write the dated
/// consolidated inventory file.
async fn run_inventory(format: ReportFormat, output_dir: &std::path::Path) -> Result<(), Whatever> {
    let date = chrono::Local::now().date_naive();
    let base = aws_config::defaults(aws_config::BehaviorVersion::latest())
        .load()
        .await;

    let catalogs: Vec<Box<OmicsCatalog>> = OMICS_REGIONS
        .iter()
        .map(|region| Box::new(OmicsCatalog::new(&base, region)))
        .collect();
    let progress = ProgressBar::new(catalogs.len() as u64);
    let records = inventory::collect_inventory(&catalogs, date, Some(&progress)).await;
    progress.finish_and_clear();

    let path = report::write_report(output_dir, format, date, &records)
        .whatever_context("could not write inventory report")?;
    info!("Wrote {} store records to {}", records.len(), path.display());
    Ok(())
}

struct IntensityArgs {
    bucket: Option<String>,
    dir: Option<PathBuf>,
    prefix: String,
    region: String,
    endpoint: Option<String>,
    access_key: Option<String>,
    secret_key: Option<String>,
    first_only: bool,
}

async fn run_intensity(args: &IntensityArgs) -> Result<Vec<IntensityRecord>, intensity::Error> {
    if let Some(dir) = &args.dir {
        return intensity::collect_dir_statistics(dir, args.first_only);
    }
    let config = S3Config {
        // clap guarantees the bucket when --dir is absent
        bucket: args.bucket.clone().unwrap_or_default(),
        region: args.region.clone(),
        access_key: args.access_key.clone(),
        secret_key: args.secret_key.clone(),
        endpoint: args.endpoint.clone(),
    };
    let bucket = storage::build_bucket(&config).context(intensity::StorageSnafu)?;
    intensity::collect_bucket_statistics(&bucket, &args.prefix, args.first_only).await
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Command::Inventory { format, output_dir } => {
            if let Err(e) = run_inventory(format, &output_dir).await {
                error!("{}", Report::from_error(e));
                std::process::exit(1);
            }
        }
        Command::Intensity {
            bucket,
            dir,
            prefix,
            region,
            endpoint,
            access_key,
            secret_key,
            first_only,
            output,
        } => {
            let args = IntensityArgs {
                bucket,
                dir,
                prefix,
                region,
                endpoint,
                access_key,
                secret_key,
                first_only,
            };
            let result = run_intensity(&args).await;
            if args.first_only {
                // single-record JSON response on stdout, errors included
                match result {
                    Ok(records) => match records.first().map(|r| serde_json::to_string(r)) {
                        Some(Ok(json)) => println!("{}", json),
                        Some(Err(e)) => {
                            error!("{}", Report::from_error(e));
                            std::process::exit(1);
                        }
                        None => {
                            println!("{}", serde_json::json!({ "error": "no records produced" }));
                            std::process::exit(1);
                        }
                    },
                    Err(e) => {
                        let message = Report::from_error(e).to_string();
                        println!("{}", serde_json::json!({ "error": message.trim() }));
                        std::process::exit(1);
                    }
                }
            } else {
                match result {
                    Ok(records) => {
                        if let Err(e) = intensity::write_statistics_file(&output, &records) {
                            error!("{}", Report::from_error(e));
                            std::process::exit(1);
                        }
                        info!("Results written to {}", output.display());
                    }
                    Err(e) => {
                        error!("{}", Report::from_error(e));
                        std::process::exit(1);
                    }
                }
            }
        }
    }
}
