//! # busmap generated artifacts
//!
//! Everything here is derived from the immutable chip model and re-creatable
//! at any time:
//!
//! - [`accessors`]: string-keyed accessor map plus a nested stub listing for
//!   IDE discoverability (the stubs are placeholders, never executed).
//! - [`constants`]: bidirectional page-name ↔ page-address tables and their
//!   rendered constant listing.
//! - [`report`]: textual command log rendered from committed trace segments.
//!
//! Generation-time inconsistencies are skipped with a diagnostic by default;
//! [`GenOptions::strict`] promotes them to fatal errors.

pub mod accessors;
pub mod constants;
pub mod error;
pub mod report;

pub use accessors::{accessor_listing, accessor_map, AccessorEntry};
pub use constants::{page_table, render_page_constants, PageTable};
pub use error::{GenError, Result};
pub use report::{render_command_log, ReportOptions};

/// Generation mode shared by the artifact builders.
#[derive(Debug, Clone, Copy, Default)]
pub struct GenOptions {
    /// Promote skip-with-diagnostic conditions to fatal errors.
    pub strict: bool,
}
