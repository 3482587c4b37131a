//! Export orchestration
//!
//! This module provides:
//! - The fetch/render pipeline ([`ExportPipeline`])
//! - The run state machine ([`ExportState`], [`StateTrail`])
//! - Fixed-width and tabular file output
//! - The export report ([`ExportReport`])

pub mod pipeline;
pub mod state;
pub mod summary;
pub mod tabular;
pub mod writer;

pub use pipeline::{codec_settings, ExportPipeline, FetchOutcome, FetchedBatch, ValidationPolicy};
pub use state::{ExportState, StateTrail};
pub use summary::{ExportFormat, ExportReport};
