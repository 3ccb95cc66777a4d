#[macro_use]
extern crate log;

pub mod opiterator;
pub mod query;
