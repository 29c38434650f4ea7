#[macro_use]
extern crate log;
extern crate custom_error;

pub mod assembler;
pub mod buffer;
pub mod color_table;
pub mod errors;
pub mod lzw;
pub mod reader;
