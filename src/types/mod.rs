//! Type definitions for dealerdash

mod contract;
mod error;
mod kpi;
mod period;

pub use contract::*;
pub use error::*;
pub use kpi::*;
pub use period::*;
