//! Service layer module
//!
//! Contains the generative-language client, the pass-through client and the record service

pub mod gemini;
pub mod passthrough;
pub mod records;

pub use gemini::{GeminiClient, UpstreamReply};
pub use passthrough::{ForwardedResponse, PassthroughClient};
pub use records::RecordService;
