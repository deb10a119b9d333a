//! Receipt analysis: send a photographed receipt to a multimodal model and
//! get back the purchased items plus recipe suggestions.
//!
//! # Example
//!
//! ```no_run
//! use receipt_recipes::{AppConfig, Analyze, ReceiptAnalyzer};
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let analyzer = ReceiptAnalyzer::from_config(&AppConfig::load()?)?;
//! let result = analyzer.analyze("receipt.jpg", "<base64 image>").await;
//! for item in &result.items {
//!     println!("{}", item);
//! }
//! # Ok(())
//! # }
//! ```

pub mod acquisition;
pub mod analyzer;
pub mod config;
pub mod controller;
pub mod error;
pub mod ffi;
pub mod model;
pub mod notify;
pub mod presentation;
pub mod providers;

pub use acquisition::{Acquisition, FileAcquirer, ImageAcquirer, ImageOrigin};
pub use analyzer::{Analyze, ReceiptAnalyzer};
pub use config::{load_config, AppConfig, ProviderConfig};
pub use controller::{Completion, PendingAnalysis, ScreenController, ScreenState};
pub use error::ReceiptError;
pub use model::{AnalysisOutcome, AnalysisResult, CapturedImage, MimeType, Recipe};
pub use notify::{LogNotifier, Notice, NoticeKind, Notifier};
pub use presentation::{render, ConsoleNotifier};
pub use providers::{InferenceRequest, ProviderFactory, ProviderReply, VisionProvider};

/// Analyze an image file with the default configuration.
///
/// Reads `config.toml` and `RECEIPT__*` environment variables, then sends the
/// file to the configured provider. Configuration and I/O problems are
/// returned as errors; analysis problems are reported inside the result.
pub async fn analyze_file(path: impl AsRef<std::path::Path>) -> Result<AnalysisResult, ReceiptError> {
    let config = AppConfig::load()?;
    let analyzer = ReceiptAnalyzer::from_config(&config)?;

    let path = path.as_ref();
    let bytes = tokio::fs::read(path).await?;
    let image = CapturedImage::from_bytes(path.to_string_lossy(), &bytes);
    let payload = image.encoded_payload.unwrap_or_default();

    Ok(analyzer.analyze(&image.locator, &payload).await)
}
