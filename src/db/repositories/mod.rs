pub mod poll_result_repository;

pub use poll_result_repository::*;
