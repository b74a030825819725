//! Pipeline stages: role vocabulary, prompt construction and execution.
//!
//! - [`roles`]: the fixed [`Stage`] set and each stage's persona
//! - [`prompts`]: pure builders from typed [`StageInput`] to prompt text
//! - [`runner`]: [`StageRunner`] and the per-run [`StageRoster`]
//! - [`error`]: [`StageError`]

pub mod error;
pub mod prompts;
pub mod roles;
pub mod runner;

pub use error::{StageError, StageResult};
pub use prompts::{build_prompt, StageInput};
pub use roles::{RoleDescriptor, Stage};
pub use runner::{StageOutput, StageRoster, StageRunner};
