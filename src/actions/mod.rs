// Action space - typed catalogue of executable browser actions and validation

pub mod catalog;
pub mod space;

pub use catalog::{builtin_space, COMPLETE_ACTION};
pub use space::*;
