#![warn(missing_docs)]
//! genlab - Grounded web search and image-to-video generation on the Gemini API.
//!
//! Two flows share one key-handling layer:
//!
//! - **Grounded search** streams a Gemini answer backed by Google Search and
//!   collects the cited web sources.
//! - **Video generation** animates a source image with Veo, polls the
//!   long-running job and returns a download URL.
//!
//! Keys come from the caller, from a host [`KeySelector`], or from the
//! environment. When an implicit key is rejected with "Requested entity was
//! not found", the host is asked to select a new one and the call is retried
//! once.
//!
//! # Quick Start - Search
//!
//! ```no_run
//! use genlab::{Config, GenLab, SearchRequest};
//!
//! #[tokio::main]
//! async fn main() -> genlab::Result<()> {
//!     let lab = GenLab::new(Config::from_env());
//!     let mut print = |token: &str| print!("{token}");
//!     let result = lab
//!         .search(&SearchRequest::new("Latest Rust release"), None, Some(&mut print))
//!         .await?;
//!     for citation in &result.citations {
//!         println!("{} <{}>", citation.title, citation.uri);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! # Quick Start - Video
//!
//! ```no_run
//! use genlab::{AspectRatio, Config, GenLab, VideoRequest};
//!
//! #[tokio::main]
//! async fn main() -> genlab::Result<()> {
//!     let lab = GenLab::new(Config::from_env());
//!     let request = VideoRequest::new("data:image/png;base64,iVBORw0KGgo...", "image/png")
//!         .with_prompt("Slow dolly zoom")
//!         .with_aspect_ratio(AspectRatio::Portrait);
//!     let url = lab.generate_video(&request, None).await?;
//!     println!("{url}");
//!     Ok(())
//! }
//! ```
//!
//! # Features
//!
//! - `cli`: the `genlab` command-line tool

mod client;
pub mod config;
mod credential;
mod error;
pub mod gemini;
mod host;
pub mod media;
mod resolver;
pub mod search;
pub mod video;

#[cfg(test)]
mod test_support;

pub use client::GenLab;
pub use config::{Config, ConfigBuilder};
pub use credential::Credential;
pub use error::{GenLabError, Result};
pub use host::KeySelector;
pub use resolver::KeyResolver;
pub use search::{Citation, SearchModel, SearchRequest, SearchResult, StreamChunk};
pub use video::{AspectRatio, PollPolicy, VeoModel, VideoJob, VideoRequest};

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::client::GenLab;
    pub use crate::config::Config;
    pub use crate::credential::Credential;
    pub use crate::error::{GenLabError, Result};
    pub use crate::host::KeySelector;
    pub use crate::search::{SearchRequest, SearchResult};
    pub use crate::video::{PollPolicy, VideoRequest};
}
