#![allow(dead_code)]

pub mod test_backend;

pub use test_backend::TestBackend;
