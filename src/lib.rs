pub mod books;
pub mod borrow;
pub mod catalog;
pub mod core;
pub mod gateway;
pub mod readers;
pub mod utils;
