//! s3-upload: upload a local file to an S3-compatible endpoint, as a
//! single signed PUT or as a parallel multipart upload. Prints the final
//! object ETag on stdout; diagnostics go to stderr.

use clap::Parser;
use s3part::credentials::Credentials;
use s3part::error::ClientError;
use s3part::multipart::{UploadConfig, Uploader};
use s3part::sigv4::Endpoint;
use std::path::PathBuf;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

/// Upload file to S3 bucket
#[derive(Parser, Debug)]
#[command(name = "s3-upload")]
#[command(version, about, long_about = None)]
struct Cli {
    /// AWS access key (falls back to the credentials file)
    #[arg(short = 'a', long = "access_key")]
    access_key: Option<String>,

    /// AWS secret key (falls back to the credentials file)
    #[arg(short = 's', long = "secret_key")]
    secret_key: Option<String>,

    /// Credentials file, ini format with [profile] sections
    #[arg(short = 'c', long = "credentials")]
    credentials: Option<PathBuf>,

    /// Profile name in the credentials file
    #[arg(short = 'p', long = "profile", default_value = "default")]
    profile: String,

    /// Endpoint URL: http[s]://hostname[:port]
    #[arg(short = 'e', long = "endpoint")]
    endpoint: String,

    /// Bucket name
    #[arg(short = 'b', long = "bucket")]
    bucket: String,

    /// Key name
    #[arg(short = 'k', long = "key")]
    key: String,

    /// File to upload
    #[arg(short = 'f', long = "file")]
    file: PathBuf,

    /// Number of parallel jobs (= part count)
    #[arg(short = 'j', long = "jobs", default_value_t = 1)]
    jobs: usize,

    /// Per-request timeout in seconds
    #[arg(long = "timeout", default_value_t = 300)]
    timeout: u64,

    /// Disable TLS certificate verification (insecure, debugging only)
    #[arg(long = "insecure")]
    insecure: bool,
}

fn default_credentials_path() -> PathBuf {
    let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
    PathBuf::from(home).join(".aws").join("credentials")
}

/// Keys from flags when both are given, from the credentials file when
/// neither is. Exactly one of the two flags is an error.
fn load_credentials(cli: &Cli) -> Result<Credentials, ClientError> {
    match (&cli.access_key, &cli.secret_key) {
        (Some(access_key), Some(secret_key)) => {
            let creds = Credentials::new(access_key.clone(), secret_key.clone());
            creds.validate()?;
            Ok(creds)
        }
        (None, None) => {
            let path = cli
                .credentials
                .clone()
                .unwrap_or_else(default_credentials_path);
            Credentials::from_profile(&path, &cli.profile)
        }
        _ => Err(ClientError::InvalidArgument(
            "both access and secret keys have to be specified".to_string(),
        )),
    }
}

async fn run(cli: &Cli) -> Result<String, ClientError> {
    let creds = load_credentials(cli)?;
    let endpoint = Endpoint::parse(&cli.endpoint)?;
    let config = UploadConfig {
        jobs: cli.jobs,
        timeout: Duration::from_secs(cli.timeout),
        insecure: cli.insecure,
        ..UploadConfig::default()
    };
    Uploader::new(creds, endpoint, config)
        .upload(&cli.bucket, &cli.key, &cli.file)
        .await
}

#[tokio::main]
async fn main() {
    // stdout carries only the ETag; all logging goes to stderr
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("s3part=warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    // exit 1 on flag errors; --help and --version still exit 0
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let _ = e.print();
            std::process::exit(if e.use_stderr() { 1 } else { 0 });
        }
    };
    match run(&cli).await {
        Ok(etag) => println!("{}", etag),
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}
