//! Repository layer — entity-scoped database operations.
//!
//! Free functions over a borrowed `Connection`; callers own connections and
//! transactions. Nothing here hard-deletes: entities are soft-deactivated so
//! historical reports stay intact.

mod reference_range;
mod test_parameter;
mod test_report;
mod test_result;
mod test_type;
mod user;
mod views;

pub use reference_range::*;
pub use test_parameter::*;
pub use test_report::*;
pub use test_result::*;
pub use test_type::*;
pub use user::*;
pub use views::*;
