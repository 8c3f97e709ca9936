//! Grounded search example.
//!
//! Run with: `cargo run --example search -- "your question"`
//!
//! Requires `GOOGLE_API_KEY` environment variable.

use genlab::{Config, GenLab, SearchRequest};
use std::io::Write;

#[tokio::main]
async fn main() -> genlab::Result<()> {
    let query = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "What changed in the latest stable Rust release?".to_string());

    let lab = GenLab::new(Config::from_env());

    let mut print = |token: &str| {
        print!("{token}");
        let _ = std::io::stdout().flush();
    };
    let result = lab
        .search(&SearchRequest::new(query), None, Some(&mut print))
        .await?;

    println!("\n\nSources:");
    for (i, citation) in result.citations.iter().enumerate() {
        println!("  [{}] {} <{}>", i + 1, citation.title, citation.uri);
    }

    Ok(())
}
