use std::fmt;

/// Progress of one item through the pipeline.
///
/// ```text
/// Init -> TokenSigned -> Resolved -> Retrieved -> DownloadOutput -> Done
///                                             \-> ParsedOutput   -> Done
/// ```
///
/// Signing, resolution and retrieval can fail; the failed step is kept.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum RunState {
    Init,
    TokenSigned,
    Resolved,
    Retrieved,
    DownloadOutput,
    ParsedOutput,
    Done,
    Failed(FailedStep),
}

/// The step that was running when an item failed.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum FailedStep {
    Signing,
    Resolution,
    Retrieval,
}

impl RunState {
    /// The step that starts from this state, if it can fail.
    pub fn pending_step(&self) -> Option<FailedStep> {
        match self {
            Self::Init => Some(FailedStep::Signing),
            Self::TokenSigned => Some(FailedStep::Resolution),
            Self::Resolved => Some(FailedStep::Retrieval),
            _ => None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Done | Self::Failed(_))
    }
}

impl fmt::Display for RunState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Failed(step) => write!(f, "Failed({:?})", step),
            other => write!(f, "{:?}", other),
        }
    }
}
