// View module.
// Coordinates the cached and refreshed commit loads and renders them into the mount point.

pub mod commits;
pub mod guard;

pub use commits::{CommitsView, LoadReport, PathKind, PathOutcome};
pub use guard::{RenderGuard, Ticket, Verdict};
