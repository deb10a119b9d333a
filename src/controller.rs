use crate::acquisition::{Acquisition, ImageAcquirer, ImageOrigin};
use crate::analyzer::Analyze;
use crate::model::{AnalysisResult, CapturedImage};
use crate::notify::{Notice, Notifier};
use log::{debug, error, info, warn};
use std::sync::Arc;

/// Everything the presentation layer needs to draw the screen
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScreenState {
    pub image: Option<CapturedImage>,
    pub result: Option<AnalysisResult>,
    pub analyzing: bool,
}

/// An analysis that has been started but not yet applied to the screen.
///
/// Running it does not borrow the controller, so the host can keep handling
/// `select_image` and `reset` while the provider call is outstanding.
pub struct PendingAnalysis {
    token: u64,
    locator: String,
    payload: String,
    analyzer: Arc<dyn Analyze>,
}

impl PendingAnalysis {
    pub fn token(&self) -> u64 {
        self.token
    }

    pub async fn run(self) -> Completion {
        let result = self.analyzer.analyze(&self.locator, &self.payload).await;
        Completion {
            token: self.token,
            result,
        }
    }
}

/// A finished analysis tagged with the request token that started it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Completion {
    token: u64,
    result: AnalysisResult,
}

impl Completion {
    pub fn token(&self) -> u64 {
        self.token
    }

    pub fn result(&self) -> &AnalysisResult {
        &self.result
    }
}

/// Owns the screen state and applies the user's actions to it
pub struct ScreenController {
    analyzer: Arc<dyn Analyze>,
    notifier: Arc<dyn Notifier>,
    state: ScreenState,
    // Advanced by every transition that makes an outstanding completion stale
    token: u64,
}

impl ScreenController {
    pub fn new(analyzer: Arc<dyn Analyze>, notifier: Arc<dyn Notifier>) -> Self {
        ScreenController {
            analyzer,
            notifier,
            state: ScreenState::default(),
            token: 0,
        }
    }

    pub fn state(&self) -> &ScreenState {
        &self.state
    }

    /// Replace the current image and drop any previous result
    pub fn select_image(&mut self, image: CapturedImage) {
        debug!("Selected image {}", image.locator);
        self.token += 1;
        self.state.image = Some(image);
        self.state.result = None;
        self.state.analyzing = false;
    }

    /// Ask the host for an image and select it.
    ///
    /// Cancellation is a no-op; denial and picker failures raise a notice and
    /// leave the state untouched. Returns whether a new image was selected.
    pub async fn acquire(&mut self, acquirer: &dyn ImageAcquirer, origin: ImageOrigin) -> bool {
        match acquirer.acquire(origin).await {
            Ok(Acquisition::Selected(image)) => {
                self.select_image(image);
                true
            }
            Ok(Acquisition::Cancelled) => {
                debug!("Image acquisition cancelled");
                false
            }
            Ok(Acquisition::PermissionDenied) => {
                warn!("Permission denied for {:?}", origin);
                self.notifier.notify(Notice::permission_denied());
                false
            }
            Err(e) => {
                let message = match origin {
                    ImageOrigin::Camera => "Failed to take photo",
                    ImageOrigin::Gallery => "Failed to pick image from gallery",
                };
                error!("{}: {}", message, e);
                self.notifier.notify(Notice::acquisition_failed(message));
                false
            }
        }
    }

    /// Validate the selection and mark the screen as analyzing.
    ///
    /// Returns `None` (after notifying the user) when there is no image or the
    /// image has no encoded payload. Starting again while a call is
    /// outstanding supersedes it.
    pub fn begin_analysis(&mut self) -> Option<PendingAnalysis> {
        let Some((locator, payload)) = self
            .state
            .image
            .as_ref()
            .and_then(|image| Some((image.locator.clone(), image.payload()?.to_string())))
        else {
            self.notifier.notify(Notice::validation());
            return None;
        };

        self.token += 1;
        self.state.analyzing = true;
        info!("Analyzing receipt {}", locator);

        Some(PendingAnalysis {
            token: self.token,
            locator,
            payload,
            analyzer: Arc::clone(&self.analyzer),
        })
    }

    /// Apply a completion if it is still current. Returns whether it was applied.
    pub fn finish_analysis(&mut self, completion: Completion) -> bool {
        if completion.token != self.token {
            debug!(
                "Discarding stale analysis result (token {}, current {})",
                completion.token, self.token
            );
            return false;
        }

        if let Some(message) = &completion.result.error_message {
            self.notifier.notify(Notice::analysis_error(message.clone()));
        }

        self.state.result = Some(completion.result);
        self.state.analyzing = false;
        true
    }

    /// Run a full analysis of the selected image. Returns whether a result was stored.
    pub async fn start_analysis(&mut self) -> bool {
        match self.begin_analysis() {
            Some(pending) => {
                let completion = pending.run().await;
                self.finish_analysis(completion)
            }
            None => false,
        }
    }

    /// Return to the initial state, abandoning any outstanding analysis
    pub fn reset(&mut self) {
        self.token += 1;
        self.state = ScreenState::default();
    }
}
