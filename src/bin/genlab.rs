//! CLI for genlab - grounded search and image-to-video on the Gemini API.

use async_trait::async_trait;
use base64::Engine;
use clap::{Args, Parser, Subcommand};
use genlab::media::ImageFormat;
use genlab::{
    AspectRatio, Config, Credential, GenLab, GenLabError, KeySelector, SearchModel,
    SearchRequest, VeoModel, VideoRequest,
};
use std::io::{BufRead, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "genlab")]
#[command(about = "Grounded web search and image-to-video generation via the Gemini API")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output as JSON
    #[arg(long, global = true)]
    json: bool,

    /// API key (overrides GOOGLE_API_KEY / API_KEY)
    #[arg(long, global = true)]
    api_key: Option<String>,

    /// Prompt for a key on the terminal when none is available
    #[arg(long, global = true)]
    select_key: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Ask a question answered with Google Search grounding
    Search(SearchArgs),

    /// Animate a source image
    Video(VideoArgs),

    /// List known models
    Models,
}

#[derive(Args)]
struct SearchArgs {
    /// The question to research
    query: String,

    /// Model identifier
    #[arg(short, long)]
    model: Option<SearchModel>,
}

#[derive(Args)]
struct VideoArgs {
    /// Optional motion prompt
    #[arg(default_value = "")]
    prompt: String,

    /// Source image file
    #[arg(short, long)]
    image: PathBuf,

    /// Output aspect ratio (16:9 or 9:16)
    #[arg(long, default_value = "16:9")]
    aspect_ratio: AspectRatio,

    /// Model identifier
    #[arg(short, long)]
    model: Option<VeoModel>,

    /// Give up after this many seconds of polling
    #[arg(long)]
    max_wait: Option<u64>,
}

/// Reads a key from stdin when the resolver needs one.
#[derive(Default)]
struct TerminalKeySelector {
    key: Mutex<Option<Credential>>,
}

#[async_trait]
impl KeySelector for TerminalKeySelector {
    async fn has_selected_key(&self) -> bool {
        self.key.lock().map(|k| k.is_some()).unwrap_or(false)
    }

    async fn open_select_key(&self) {
        let line = tokio::task::spawn_blocking(|| {
            eprint!("Enter a Gemini API key: ");
            let _ = std::io::stderr().flush();
            let mut line = String::new();
            std::io::stdin().lock().read_line(&mut line).map(|_| line)
        })
        .await;

        match line {
            Ok(Ok(line)) if !line.trim().is_empty() => {
                if let Ok(mut key) = self.key.lock() {
                    *key = Some(Credential::new(line.trim()));
                }
            }
            _ => tracing::warn!("no key entered"),
        }
    }

    fn current_key(&self) -> Option<Credential> {
        self.key.lock().ok().and_then(|k| k.clone())
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("genlab=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::debug!(error = %err, "command failed");
            eprintln!("Error: {}", describe_error(&err));
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let mut lab = GenLab::new(Config::from_env());
    if cli.select_key {
        lab = lab.with_host(Arc::new(TerminalKeySelector::default()));
    }
    let credential = cli.api_key.map(Credential::new);

    match cli.command {
        Commands::Search(args) => {
            run_search(&lab, args, credential.as_ref(), cli.json).await?;
        }
        Commands::Video(args) => {
            run_video(&lab, args, credential.as_ref(), cli.json).await?;
        }
        Commands::Models => {
            list_models(cli.json)?;
        }
    }

    Ok(())
}

/// End-user text for a failed command.
fn describe_error(err: &anyhow::Error) -> String {
    let Some(err) = err.downcast_ref::<GenLabError>() else {
        return format!("{err:#}");
    };
    let mut message = err.user_message();
    if err.is_retryable() {
        match err.retry_after() {
            Some(delay) => message.push_str(&format!(" Retry in {}s.", delay.as_secs())),
            None => message.push_str(" This may be temporary."),
        }
    }
    message
}

async fn run_search(
    lab: &GenLab,
    args: SearchArgs,
    credential: Option<&Credential>,
    json_output: bool,
) -> anyhow::Result<()> {
    let mut request = SearchRequest::new(&args.query);
    if let Some(model) = args.model {
        request = request.with_model(model);
    }

    let mut print_token = |token: &str| {
        print!("{token}");
        let _ = std::io::stdout().flush();
    };
    let on_token = if json_output {
        None
    } else {
        Some(&mut print_token as &mut (dyn FnMut(&str) + Send))
    };

    let result = lab.search(&request, credential, on_token).await?;

    if json_output {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        println!();
        if !result.citations.is_empty() {
            println!("\nSources:");
            for (i, citation) in result.citations.iter().enumerate() {
                println!("  [{}] {} <{}>", i + 1, citation.title, citation.uri);
            }
        }
    }

    Ok(())
}

async fn run_video(
    lab: &GenLab,
    args: VideoArgs,
    credential: Option<&Credential>,
    json_output: bool,
) -> anyhow::Result<()> {
    let bytes = std::fs::read(&args.image)?;
    let image = base64::engine::general_purpose::STANDARD.encode(&bytes);
    let mime_type = args
        .image
        .extension()
        .and_then(|e| e.to_str())
        .and_then(ImageFormat::from_extension)
        .map(|f| f.mime_type().to_string())
        .unwrap_or_default();

    let mut request = VideoRequest::new(image, mime_type)
        .with_prompt(&args.prompt)
        .with_aspect_ratio(args.aspect_ratio);
    if let Some(model) = args.model {
        request = request.with_model(model);
    }

    let cancel = CancellationToken::new();
    let mut policy = lab.config().poll_policy().cancel_on(cancel.clone());
    if let Some(secs) = args.max_wait {
        policy = policy.timeout(Duration::from_secs(secs));
    }

    let on_interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            eprintln!("Cancelling...");
            on_interrupt.cancel();
        }
    });

    let url = lab.generate_video_with(&request, credential, &policy).await?;

    if json_output {
        let result = serde_json::json!({
            "type": "video",
            "success": true,
            "url": url,
            "aspect_ratio": args.aspect_ratio.as_str(),
        });
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        println!("{url}");
    }

    Ok(())
}

fn list_models(json_output: bool) -> anyhow::Result<()> {
    #[derive(serde::Serialize)]
    struct ModelInfo {
        id: String,
        name: &'static str,
        kind: &'static str,
        default: bool,
    }

    let search = SearchModel::known().into_iter().map(|(model, name)| ModelInfo {
        default: model == SearchModel::default(),
        id: model.to_string(),
        name,
        kind: "search",
    });
    let video = VeoModel::known().into_iter().map(|(model, name)| ModelInfo {
        default: model == VeoModel::default(),
        id: model.to_string(),
        name,
        kind: "video",
    });
    let models: Vec<ModelInfo> = search.chain(video).collect();

    if json_output {
        println!("{}", serde_json::to_string_pretty(&models)?);
    } else {
        println!("Available models:\n");
        println!("SEARCH:");
        for m in models.iter().filter(|m| m.kind == "search") {
            let marker = if m.default { "*" } else { " " };
            println!("  {} {} ({})", marker, m.name, m.id);
        }
        println!("\nVIDEO:");
        for m in models.iter().filter(|m| m.kind == "video") {
            let marker = if m.default { "*" } else { " " };
            println!("  {} {} ({})", marker, m.name, m.id);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_describe_error_uses_friendly_text() {
        let err = anyhow::Error::new(GenLabError::Api {
            status: 404,
            message: "Requested entity was not found.".into(),
        });
        assert_eq!(
            describe_error(&err),
            "Model not found (404). Verify your API key has access to this model."
        );
    }

    #[test]
    fn test_describe_error_marks_transient_failures() {
        let err = anyhow::Error::new(GenLabError::RateLimited {
            retry_after: Some(Duration::from_secs(30)),
        });
        assert_eq!(describe_error(&err), "Quota exceeded. Try again later. Retry in 30s.");

        let err = anyhow::Error::new(GenLabError::Timeout(Duration::from_secs(600)));
        assert!(describe_error(&err).ends_with("This may be temporary."));
    }

    #[test]
    fn test_describe_error_other_errors() {
        let err = anyhow::anyhow!("image file missing");
        assert_eq!(describe_error(&err), "image file missing");
    }
}
