//! Shared test utilities
#![allow(dead_code)]

pub mod fixture;
pub mod upstream;

pub use fixture::write_tree;
pub use upstream::FakeUpstream;
