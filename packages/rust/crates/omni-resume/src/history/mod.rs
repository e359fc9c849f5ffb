//! History namespace: rebuild an ordered user/assistant conversation from trace data.

mod extract;
mod generations;
mod message;
mod observations;
mod reconstructor;
mod traces;
mod transcript;

pub use extract::{ExtractionStrategy, Extracted, extract_text};
pub use generations::{GenerationHistory, reconstruct_from_generation_histories};
pub use message::ConversationMessage;
pub use observations::reconstruct_from_observations;
pub use reconstructor::{
    HistoryReconstructor, Reconstruction, ReconstructionDiagnostics, ReconstructionMode,
};
pub use traces::{Handoff, TraceSummaryHistory, reconstruct_from_traces};
pub use transcript::{check_alternation, format_transcript};
