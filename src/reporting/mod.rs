pub mod catalog;
pub mod compat_checker;
pub mod error;
pub mod inventory;
pub mod report;
pub mod selection;
pub mod session;


#[cfg(test)]
mod unit_tests;

pub use catalog::*;
pub use compat_checker::*;
pub use error::*;
pub use inventory::*;
pub use report::*;
pub use selection::*;
pub use session::*;
