//! Domain models for the newsroom pipeline.
//!
//! - `NewsRequest`: validated, immutable pipeline input
//! - `PipelineResult` / `PipelineRun`: the outcome and its audit envelope
//! - error taxonomy shared by every layer

pub mod error;
pub mod request;
pub mod result;

pub use error::{NewsroomError, Result, UpstreamError, ValidationError};
pub use request::{NewsRequest, DEFAULT_MAX_ITERATIONS, DEFAULT_QUALITY_THRESHOLD};
pub use result::{PipelineResult, PipelineRun, StageCall};
