//! Result interpretation — which reference range applies to whom, what a
//! value means against it, and per-report / per-parameter aggregates.
//!
//! Pure functions over model types; the read views in
//! `db::repository::views` fetch rows and hand them here.

mod aggregates;
mod ranges;
mod status;

pub use aggregates::*;
pub use ranges::*;
pub use status::*;
