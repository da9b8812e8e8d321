// Test modules

pub mod common;
mod diff_test;
