pub mod decimal;
pub mod enums;
pub mod filters;
pub mod parameter;
pub mod reference_range;
pub mod report;
pub mod responses;
pub mod result;
pub mod test_type;
pub mod user;
pub mod validation;

pub use decimal::*;
pub use enums::*;
pub use filters::*;
pub use parameter::*;
pub use reference_range::*;
pub use report::*;
pub use responses::*;
pub use result::*;
pub use test_type::*;
pub use user::*;
pub use validation::{parse_request, FieldError, Validate, ValidationError};
