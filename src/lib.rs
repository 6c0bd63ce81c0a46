// ABOUTME: Library module for sqlite-pg-loader
// ABOUTME: Exports all core functionality for use in binary and tests

pub mod commands;
pub mod config;
pub mod error;
pub mod postgres;
pub mod records;
pub mod sqlite;
pub mod utils;

#[cfg(test)]
pub(crate) mod test_support;
