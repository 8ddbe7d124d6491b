//! Iris species classifier
//!
//! Trains a classifier on the built-in Iris dataset once, then serves
//! predictions from the saved artifact over HTTP.

pub mod commands;
pub mod server;
