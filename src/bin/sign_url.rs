//! sign-url: print a time-limited pre-signed URL for an S3-compatible
//! endpoint (AWS, Ceph RADOS Gateway, MinIO, ...).

use clap::Parser;
use s3part::credentials::Credentials;
use s3part::error::ClientError;
use s3part::sigv4::{presigned_url, Endpoint, Method, SigningTime};

/// Pre-sign S3 URLs
#[derive(Parser, Debug)]
#[command(name = "sign-url")]
#[command(version, about, long_about = None)]
struct Cli {
    /// AWS access key
    #[arg(short = 'a', long = "access_key")]
    access_key: String,

    /// AWS secret key
    #[arg(short = 's', long = "secret_key")]
    secret_key: String,

    /// Endpoint URL: http[s]://hostname[:port]
    #[arg(short = 'e', long = "endpoint")]
    endpoint: String,

    /// HTTP method: get | put | post | delete
    #[arg(short = 'm', long = "method")]
    method: String,

    /// Bucket name
    #[arg(short = 'b', long = "bucket", default_value = "")]
    bucket: String,

    /// Key name
    #[arg(short = 'k', long = "key", default_value = "")]
    key: String,

    /// URL request parameters: key1=value1;key2=...
    #[arg(short = 'p', long = "params", default_value = "")]
    params: String,

    /// Expiration time in seconds
    #[arg(short = 't', long = "expiration", default_value_t = 3600)]
    expiration: u64,
}

/// Parse `key1=value1;key2=;key3` into pairs. Bare keys get empty values.
fn parse_params(s: &str) -> Vec<(String, String)> {
    s.split(';')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(|item| match item.split_once('=') {
            Some((k, v)) => (k.trim().to_string(), v.trim().to_string()),
            None => (item.to_string(), String::new()),
        })
        .collect()
}

fn run(cli: &Cli) -> Result<String, ClientError> {
    let method: Method = cli.method.parse()?;
    if method == Method::Head {
        return Err(ClientError::InvalidArgument(
            "method must be one of get, put, post, delete".to_string(),
        ));
    }
    let endpoint = Endpoint::parse(&cli.endpoint)?;
    let creds = Credentials::new(cli.access_key.clone(), cli.secret_key.clone());
    let params = parse_params(&cli.params);

    presigned_url(
        &creds,
        &endpoint,
        method,
        &cli.bucket,
        &cli.key,
        &params,
        cli.expiration,
        &SigningTime::now(),
    )
}

fn main() {
    // exit 1 on flag errors; --help and --version still exit 0
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let _ = e.print();
            std::process::exit(if e.use_stderr() { 1 } else { 0 });
        }
    };
    match run(&cli) {
        Ok(url) => println!("{}", url),
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}
