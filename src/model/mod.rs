pub mod common;
pub mod course;
pub mod filter;
pub mod student;

pub use common::*;
pub use course::*;
pub use filter::*;
pub use student::*;
