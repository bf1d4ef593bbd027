mod render;
mod repl;

use anyhow::{Context, Result, bail};
use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use alma_chat::{ChatController, EarPhoto};
use alma_client::{BASE_URL_ENV, ClientConfig, DEFAULT_BASE_URL, RecommendationClient, Scenario};
use alma_models::{EarAnalysis, EarAnalysisRequest, Idr, RecommendationRequest, UseCase};

use crate::render::{print_ear_analysis, print_response};

/// ALMA - audio assistant for choosing earphones
#[derive(Parser)]
#[command(name = "alma")]
#[command(about = "Ask the ALMA service for earphone recommendations", long_about = None)]
struct Cli {
    /// Root URL of the recommendation service
    #[arg(long, env = BASE_URL_ENV, default_value = DEFAULT_BASE_URL)]
    api_url: String,

    /// Give up on a request after this many seconds
    #[arg(long)]
    timeout: Option<u64>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check that the service is up
    Health,

    /// Fetch the service's canned test recommendation
    Debug,

    /// Get earphone recommendations for a query
    Recommend(RecommendArgs),

    /// Measure an ear photo without asking for products
    AnalyzeEar {
        /// Photo of the ear
        #[arg(long)]
        image: PathBuf,

        /// Write the annotated photo here
        #[arg(long)]
        save_annotated: Option<PathBuf>,

        /// Print the raw JSON answer
        #[arg(long)]
        json: bool,
    },

    /// Interactive chat
    Chat,
}

#[derive(Args)]
struct RecommendArgs {
    /// What you are looking for, in your own words
    #[arg(long)]
    query: String,

    /// Lowest price in IDR
    #[arg(long)]
    budget_min: Option<Idr>,

    /// Highest price in IDR
    #[arg(long)]
    budget_max: Option<Idr>,

    /// One of: listening-music, commuting, professional-audio, gaming,
    /// fitness-sports, video-calls, noise-cancellation, studio-recording
    #[arg(long)]
    use_case: Option<UseCase>,

    /// Ear photo to get a fit analysis with the answer
    #[arg(long)]
    image: Option<PathBuf>,

    /// Start from a preset (gaming, fitness, travel, office, audiophile,
    /// commuting); explicit flags win over the preset
    #[arg(long)]
    scenario: Option<Scenario>,

    /// Write the annotated ear photo here
    #[arg(long)]
    save_annotated: Option<PathBuf>,

    /// Print the raw JSON answer
    #[arg(long)]
    json: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    let mut config = ClientConfig::new(cli.api_url);
    if let Some(secs) = cli.timeout {
        config = config.with_timeout(Duration::from_secs(secs));
    }
    let client =
        RecommendationClient::from_config(&config).context("Failed to create HTTP client")?;

    match cli.command {
        Commands::Health => handle_health(&client).await?,
        Commands::Debug => handle_debug(&client).await?,
        Commands::Recommend(args) => handle_recommend(&client, args).await?,
        Commands::AnalyzeEar {
            image,
            save_annotated,
            json,
        } => handle_analyze_ear(&client, &image, save_annotated.as_deref(), json).await?,
        Commands::Chat => repl::run(ChatController::new(client)).await?,
    }

    Ok(())
}

/// Handle the 'health' command
async fn handle_health(client: &RecommendationClient) -> Result<()> {
    let health = client
        .health_check()
        .await
        .with_context(|| format!("Could not reach {}", client.base_url()))?;

    if !health.is_healthy() {
        bail!("Service reports status '{}': {}", health.status, health.message);
    }
    println!("{} {} ({})", "✓".green(), health.message, health.timestamp.dimmed());
    Ok(())
}

/// Handle the 'debug' command
async fn handle_debug(client: &RecommendationClient) -> Result<()> {
    let body = client
        .debug_test_recommendation()
        .await
        .context("Debug endpoint failed")?;
    println!("{}", serde_json::to_string_pretty(&body)?);
    Ok(())
}

/// Handle the 'recommend' command
async fn handle_recommend(client: &RecommendationClient, args: RecommendArgs) -> Result<()> {
    let mut request = match args.scenario {
        Some(scenario) => {
            scenario.request_with_budget(args.query, args.budget_min, args.budget_max)
        }
        None => RecommendationRequest {
            budget_min: args.budget_min,
            budget_max: args.budget_max,
            ..RecommendationRequest::new(args.query)
        },
    };
    if args.use_case.is_some() {
        request.use_case = args.use_case;
    }
    if let Some(path) = &args.image {
        let photo = EarPhoto::load(path)?;
        request.image = Some(photo.upload().clone());
    }

    let start = Instant::now();
    let response = client
        .get_recommendation(&request)
        .await
        .context("Could not get recommendations")?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&response)?);
    } else {
        print_response(&response);
        println!("{}", format!("Answered in {:.2?}", start.elapsed()).dimmed());
    }

    if let Some(path) = &args.save_annotated {
        save_annotated(response.visual_analysis(), path)?;
    }
    Ok(())
}

/// Handle the 'analyze-ear' command
async fn handle_analyze_ear(
    client: &RecommendationClient,
    image: &Path,
    save_to: Option<&Path>,
    json: bool,
) -> Result<()> {
    let photo = EarPhoto::load(image)?;
    let analysis = client
        .analyze_ear(&EarAnalysisRequest::new(photo.upload().clone()))
        .await
        .context("Could not analyze the ear photo")?;

    if json {
        println!("{}", serde_json::to_string_pretty(&analysis)?);
    } else {
        print_ear_analysis(&analysis);
    }

    if let Some(path) = save_to {
        save_annotated(Some(&analysis), path)?;
    }
    Ok(())
}

fn save_annotated(analysis: Option<&EarAnalysis>, path: &Path) -> Result<()> {
    let Some(image) = analysis
        .map(|analysis| &analysis.annotated_image)
        .filter(|image| image.is_available())
    else {
        println!("{} No annotated image came back", "!".yellow());
        return Ok(());
    };

    let bytes = image
        .decode()
        .context("Annotated image is not valid base64")?;
    std::fs::write(path, &bytes)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    println!("{} Saved annotated image to {}", "✓".green(), path.display());
    Ok(())
}
