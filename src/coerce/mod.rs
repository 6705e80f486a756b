//! Coercibility evaluation and coercion execution.

pub mod executor;
pub mod failure;
mod object;
pub mod parse;
mod typed;
pub mod types;
pub mod value;

pub use executor::{Coercer, coerce, coercible_mask, try_coerce};
pub use failure::{FailureCase, FailureCases};
pub use typed::select_kernel;
pub use types::{DateFormatConfig, Kernel, ValueError};
pub use value::coerce_value;
