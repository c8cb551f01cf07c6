use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;
use youscan_ir::config::{DEFAULT_BASE_URL, DEFAULT_DETECT_PATH};
use youscan_ir::{AnalysisAttribute, AnalysisClient, ClientConfig, Image, ImageDetectRequest};

/// youscan-ir - YouScan Image Recognition client
///
/// Submit images for analysis and print the per-image results as JSON.
///
/// Credentials are read from YOUSCAN_CLIENT_ID and YOUSCAN_CLIENT_SECRET
/// unless given on the command line.
///
/// Examples:
///   youscan-ir detect --url https://example.com/cat.jpg
///   youscan-ir detect --file photo.png --attribute objects --attribute colors
#[derive(Parser, Debug)]
#[command(author, version = env!("YOUSCAN_IR_VERSION"), about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// API base URL
    #[arg(long, env = "YOUSCAN_BASE_URL", default_value = DEFAULT_BASE_URL, global = true)]
    pub base_url: String,

    /// Detect endpoint path, relative to the base URL
    #[arg(long, default_value = DEFAULT_DETECT_PATH, global = true)]
    pub detect_path: String,

    /// Client id sent as CF-Access-Client-Id
    #[arg(long, env = "YOUSCAN_CLIENT_ID", hide_env_values = true, global = true)]
    pub client_id: Option<String>,

    /// Client secret sent as CF-Access-Client-Secret
    #[arg(long, env = "YOUSCAN_CLIENT_SECRET", hide_env_values = true, global = true)]
    pub client_secret: Option<String>,

    /// Attempts per request before giving up
    #[arg(
        long,
        env = "YOUSCAN_RETRIES",
        default_value_t = 3,
        value_parser = clap::value_parser!(u32).range(1..),
        global = true
    )]
    pub retries: u32,

    /// Request timeout in seconds
    #[arg(long = "timeout", env = "YOUSCAN_TIMEOUT", default_value_t = 300, global = true)]
    pub timeout_secs: u64,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Analyse one batch of images
    Detect(DetectArgs),
}

#[derive(clap::Args, Debug)]
pub struct DetectArgs {
    /// Remote image URL (repeatable)
    #[arg(long = "url", value_name = "URL")]
    pub urls: Vec<String>,

    /// Local image file sent inline as base64 (repeatable)
    #[arg(long = "file", value_name = "PATH")]
    pub files: Vec<PathBuf>,

    /// Analysis attribute to request (repeatable, defaults to all)
    #[arg(long = "attribute", short = 'a', value_name = "NAME")]
    pub attributes: Vec<AnalysisAttribute>,

    /// Ask the API to favour throughput over latency
    #[arg(long)]
    pub optimize_throughput: bool,
}

impl Cli {
    fn client_config(&self) -> ClientConfig {
        ClientConfig::new(
            self.client_id.clone().unwrap_or_default(),
            self.client_secret.clone().unwrap_or_default(),
        )
        .with_base_url(&self.base_url)
        .with_detect_path(&self.detect_path)
        .with_retries(self.retries)
        .with_timeout(Duration::from_secs(self.timeout_secs))
    }
}

fn build_request(args: &DetectArgs) -> Result<ImageDetectRequest> {
    let mut images = Vec::with_capacity(args.urls.len() + args.files.len());
    for url in &args.urls {
        images.push(Image::from_url(url.as_str())?);
    }
    for path in &args.files {
        let bytes =
            std::fs::read(path).with_context(|| format!("Failed to read image file {:?}", path))?;
        images.push(Image::from_bytes(&bytes)?);
    }

    let mut request = ImageDetectRequest::new(images)
        .context("Provide at least one image with --url or --file")?
        .with_optimize_throughput(args.optimize_throughput);
    if !args.attributes.is_empty() {
        request = request.with_attributes(args.attributes.iter().copied())?;
    }
    Ok(request)
}

async fn detect(cli: &Cli, args: &DetectArgs) -> Result<()> {
    let request = build_request(args)?;
    let client = AnalysisClient::new(cli.client_config())?;

    let result = client
        .analyse_until(&request, async {
            // Ctrl-C aborts the call, including a pending retry.
            if tokio::signal::ctrl_c().await.is_err() {
                std::future::pending::<()>().await;
            }
        })
        .await;
    client.close()?;

    let response = result?;
    println!("{}", serde_json::to_string_pretty(&response)?);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let cli = Cli::parse();

    match &cli.command {
        Commands::Detect(args) => detect(&cli, args).await?,
    }
    Ok(())
}
