//! Image-to-video example.
//!
//! Run with: `cargo run --example generate_video -- path/to/image.png`
//!
//! Requires `GOOGLE_API_KEY` environment variable.

use base64::Engine;
use genlab::{AspectRatio, Config, GenLab, VideoRequest};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let path = std::env::args().nth(1).unwrap_or_else(|| "input.png".to_string());
    let image = base64::engine::general_purpose::STANDARD.encode(std::fs::read(&path)?);

    let lab = GenLab::new(Config::from_env());

    // Empty MIME type: detected from the image bytes.
    let request = VideoRequest::new(image, "")
        .with_prompt("Slow push-in as the light shifts to golden hour")
        .with_aspect_ratio(AspectRatio::Landscape);

    println!("Generating video (this may take a few minutes)...");
    let url = lab.generate_video(&request, None).await?;

    println!("Download URL (contains your API key): {url}");

    Ok(())
}
