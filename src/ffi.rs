//! UniFFI bindings for receipt-recipes
//!
//! This module provides FFI-compatible types and functions for use with iOS and Android.
//! It wraps the async Rust API with synchronous functions that manage their own tokio runtime.

use crate::analyzer::{Analyze, ReceiptAnalyzer};
use crate::config::AppConfig;
use crate::model::{AnalysisResult, MimeType, Recipe};

// Re-export UniFFI macro
#[cfg(feature = "uniffi")]
uniffi::setup_scaffolding!();

/// FFI-compatible recipe structure
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "uniffi", derive(uniffi::Record))]
pub struct FfiRecipe {
    pub name: String,
    pub ingredients: Vec<String>,
    pub instructions: String,
    /// Receipt items this recipe consumes
    pub used_items: Vec<String>,
}

impl From<Recipe> for FfiRecipe {
    fn from(recipe: Recipe) -> Self {
        FfiRecipe {
            name: recipe.name,
            ingredients: recipe.ingredients,
            instructions: recipe.instructions,
            used_items: recipe.used_items,
        }
    }
}

/// FFI-compatible analysis result
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "uniffi", derive(uniffi::Record))]
pub struct FfiAnalysisResult {
    pub items: Vec<String>,
    pub recipes: Vec<FfiRecipe>,
    /// Unparsed model text, only present when JSON parsing failed
    pub raw_text: Option<String>,
    pub error_message: Option<String>,
}

impl From<AnalysisResult> for FfiAnalysisResult {
    fn from(result: AnalysisResult) -> Self {
        FfiAnalysisResult {
            items: result.items,
            recipes: result.recipes.into_iter().map(FfiRecipe::from).collect(),
            raw_text: result.raw_text,
            error_message: result.error_message,
        }
    }
}

/// Optional overrides for the analysis
#[derive(Debug, Clone, Default)]
#[cfg_attr(feature = "uniffi", derive(uniffi::Record))]
pub struct FfiAnalyzerConfig {
    /// Provider name: "anthropic", "openai" or "google"
    pub provider: Option<String>,
    /// Optional API key (uses environment variable if not specified)
    pub api_key: Option<String>,
    /// Optional model name (uses provider default if not specified)
    pub model: Option<String>,
    /// Optional timeout in seconds (uses default if not specified)
    pub timeout_seconds: Option<u64>,
}

impl FfiAnalyzerConfig {
    fn into_app_config(self) -> AppConfig {
        let mut config = AppConfig::default();
        if let Some(provider) = self.provider {
            config.default_provider = provider;
        }
        if let Some(timeout) = self.timeout_seconds {
            config.timeout = timeout;
        }

        let provider_name = config.default_provider.clone();
        if let Some(mut provider_config) = config.provider_config(&provider_name) {
            if self.api_key.is_some() {
                provider_config.api_key = self.api_key;
            }
            if let Some(model) = self.model {
                provider_config.model = model;
            }
            config.providers.insert(provider_name, provider_config);
        }

        config
    }
}

/// Analyze a receipt image
///
/// # Arguments
/// * `locator` - URI or path of the image, used to pick the MIME type
/// * `encoded_payload` - Base64-encoded image bytes
/// * `config` - Optional overrides for provider, key, model and timeout
///
/// # Returns
/// An `FfiAnalysisResult`; failures are reported in `error_message`
#[cfg_attr(feature = "uniffi", uniffi::export)]
pub fn analyze_receipt(
    locator: String,
    encoded_payload: String,
    config: Option<FfiAnalyzerConfig>,
) -> FfiAnalysisResult {
    let config = config.unwrap_or_default().into_app_config();

    let analyzer = match ReceiptAnalyzer::from_config(&config) {
        Ok(analyzer) => analyzer,
        Err(e) => return AnalysisResult::failure(e.to_string()).into(),
    };

    let rt = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            return AnalysisResult::failure(format!("Failed to create async runtime: {}", e))
                .into()
        }
    };

    rt.block_on(analyzer.analyze(&locator, &encoded_payload))
        .into()
}

/// MIME type the analyzer will declare for an image locator
#[cfg_attr(feature = "uniffi", uniffi::export)]
pub fn mime_type_for_locator(locator: String) -> String {
    MimeType::from_locator(&locator).as_str().to_string()
}
