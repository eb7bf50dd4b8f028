//! The upload → analyze → display session as an explicit state machine.
//!
//! All transitions go through [`Workflow::handle`]; the UI only raises
//! events and executes the commands the reducer hands back. Generic over
//! the preview payload so the machine can be exercised without a GPU
//! context.

use crate::api::AnalysisResult;
use crate::upload::ValidatedImage;

/// Identity of one analysis request. A response is applied only if its
/// token still matches the in-flight one, so answers that arrive after a
/// reset or a re-select fall on the floor.
pub type RequestToken = u64;

pub enum WorkflowState<P> {
    Idle,
    ImageSelected {
        image: ValidatedImage,
        preview: P,
    },
    Analyzing {
        image: ValidatedImage,
        preview: P,
        token: RequestToken,
    },
    Ready {
        image: ValidatedImage,
        preview: P,
        result: AnalysisResult,
    },
    Failed {
        image: ValidatedImage,
        preview: P,
        error: String,
    },
}

pub enum Event<P> {
    /// A file passed the intake gate and its preview decoded.
    SelectImage { image: ValidatedImage, preview: P },
    /// User asked for an analysis of the selected image.
    Analyze,
    /// The network call finished, successfully or not.
    Finished {
        token: RequestToken,
        outcome: Result<AnalysisResult, String>,
    },
    /// User discarded the whole session.
    Reset,
}

/// Side effects the caller must carry out. Issuing `StartAnalysis` is the
/// only way a network call comes into being.
pub enum Command {
    StartAnalysis {
        image: ValidatedImage,
        token: RequestToken,
    },
}

pub struct Workflow<P> {
    state: WorkflowState<P>,
    next_token: RequestToken,
}

impl<P> Default for Workflow<P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P> Workflow<P> {
    pub fn new() -> Self {
        Self {
            state: WorkflowState::Idle,
            next_token: 0,
        }
    }

    pub fn state(&self) -> &WorkflowState<P> {
        &self.state
    }

    pub fn is_analyzing(&self) -> bool {
        matches!(self.state, WorkflowState::Analyzing { .. })
    }

    pub fn preview(&self) -> Option<&P> {
        match &self.state {
            WorkflowState::Idle => None,
            WorkflowState::ImageSelected { preview, .. }
            | WorkflowState::Analyzing { preview, .. }
            | WorkflowState::Ready { preview, .. }
            | WorkflowState::Failed { preview, .. } => Some(preview),
        }
    }

    pub fn preview_mut(&mut self) -> Option<&mut P> {
        match &mut self.state {
            WorkflowState::Idle => None,
            WorkflowState::ImageSelected { preview, .. }
            | WorkflowState::Analyzing { preview, .. }
            | WorkflowState::Ready { preview, .. }
            | WorkflowState::Failed { preview, .. } => Some(preview),
        }
    }

    pub fn result(&self) -> Option<&AnalysisResult> {
        match &self.state {
            WorkflowState::Ready { result, .. } => Some(result),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match &self.state {
            WorkflowState::Failed { error, .. } => Some(error),
            _ => None,
        }
    }

    pub fn handle(&mut self, event: Event<P>) -> Option<Command> {
        let state = std::mem::replace(&mut self.state, WorkflowState::Idle);
        let (next, command) = match (state, event) {
            // A fresh selection replaces whatever was there, result and
            // error included; not possible mid-analysis.
            (
                WorkflowState::Idle
                | WorkflowState::ImageSelected { .. }
                | WorkflowState::Ready { .. }
                | WorkflowState::Failed { .. },
                Event::SelectImage { image, preview },
            ) => (WorkflowState::ImageSelected { image, preview }, None),
            (state @ WorkflowState::Analyzing { .. }, Event::SelectImage { .. }) => {
                log::warn!("image selection ignored while a call is in flight");
                (state, None)
            }

            (WorkflowState::ImageSelected { image, preview }, Event::Analyze) => {
                let token = self.next_token;
                self.next_token += 1;
                let command = Command::StartAnalysis {
                    image: image.clone(),
                    token,
                };
                log::info!("starting analysis request {token}");
                (
                    WorkflowState::Analyzing {
                        image,
                        preview,
                        token,
                    },
                    Some(command),
                )
            }
            // Re-entrant trigger while in flight, or with nothing selected.
            (state, Event::Analyze) => (state, None),

            (
                WorkflowState::Analyzing {
                    image,
                    preview,
                    token,
                },
                Event::Finished {
                    token: finished,
                    outcome,
                },
            ) if token == finished => match outcome {
                Ok(result) => {
                    log::info!("analysis request {token} succeeded");
                    (
                        WorkflowState::Ready {
                            image,
                            preview,
                            result,
                        },
                        None,
                    )
                }
                Err(error) => {
                    log::info!("analysis request {token} failed: {error}");
                    (
                        WorkflowState::Failed {
                            image,
                            preview,
                            error,
                        },
                        None,
                    )
                }
            },
            // Stale: the session moved on while this call was in flight.
            (state, Event::Finished { token, .. }) => {
                log::warn!("discarding stale response for request {token}");
                (state, None)
            }

            (_, Event::Reset) => (WorkflowState::Idle, None),
        };
        self.state = next;
        command
    }
}
