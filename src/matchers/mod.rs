//! Built-in matchers.
//!
//! Each module holds one matcher family: its `once_cell` prototype, the
//! capability registrations, and the public constructor functions.

mod comparison;
mod contain;
mod forall;
mod length;
mod lines;
mod throw;
mod typed;
mod variant;

pub use comparison::{
    eq, equal, ge, greater, greater_equal, gt, le, less, less_equal, lt, ne, not_equal,
};
pub use contain::contain;
pub use forall::forall;
pub use length::have_length;
pub use lines::have_lines;
pub use throw::{throws, throws_and};
pub use typed::have_type;
pub use variant::{be_err, be_err_of, be_none, be_ok, be_ok_of, be_some, be_some_of};
