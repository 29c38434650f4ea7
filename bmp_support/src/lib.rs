extern crate custom_error;

pub mod writer;
