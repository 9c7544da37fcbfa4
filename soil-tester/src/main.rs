use anyhow::{Context, bail};
use capture::{
    CaptureSession, ImageSource, RecommendationClient, SelectedFile, StillCamera, SubmissionStatus,
};
use clap::Parser;
use std::{path::PathBuf, sync::Arc};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// Submit a soil image to the fertilizer endpoint and print the recommendation.
#[derive(Parser)]
#[command(author, version, about)]
struct Args {
    /// Upload this image file
    #[arg(long, conflicts_with = "camera")]
    file: Option<PathBuf>,
    /// Capture one frame from image files matching this glob, as if from a camera
    #[arg(long)]
    camera: Option<String>,
    /// Only query the health probe
    #[arg(long)]
    health: bool,
    #[arg(long, default_value = "http://127.0.0.1:3000/api/fertilizer")]
    url: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
    let args = Args::parse();
    let client = RecommendationClient::new(&args.url);

    if args.health {
        info!(endpoint = client.endpoint(), "checking health");
        let health = client.health().await?;
        println!("{}", serde_json::to_string_pretty(&health)?);
        return Ok(());
    }

    let camera = match &args.camera {
        Some(pattern) => StillCamera::new(pattern).context("invalid camera pattern")?,
        None => StillCamera::from_paths(Vec::new()),
    };
    info!(endpoint = client.endpoint(), "submitting soil image");
    let mut session = CaptureSession::new(ImageSource::new(Arc::new(camera)), client);

    match (args.file, args.camera) {
        (Some(path), _) => {
            let file = SelectedFile::from_path(&path)
                .await
                .with_context(|| format!("cannot open {}", path.display()))?;
            session
                .select_file(file)
                .await
                .map_err(|e| anyhow::anyhow!(e.user_message()))?;
        }
        (None, Some(_)) => {
            session.start_camera().await.map_err(|e| anyhow::anyhow!(e.user_message()))?;
            session.capture_frame().await.map_err(|e| anyhow::anyhow!(e.user_message()))?;
        }
        (None, None) => bail!("pass --file, --camera or --health"),
    }

    println!("Analyzing...");
    match session.settled().await {
        SubmissionStatus::Succeeded(result) => {
            info!(soil_health = %result.soil_health, "analysis complete");
            println!("Soil Health: {}", result.soil_health);
            for rec in &result.recommendations {
                println!("  - {rec}");
            }
            println!(
                "Analysis performed at: {}",
                contract::timestamp::format(&result.timestamp)
            );
            Ok(())
        }
        SubmissionStatus::Failed(message) => {
            warn!(%message, "analysis failed");
            bail!(message)
        }
        other => bail!("submission did not settle: {other:?}"),
    }
}
