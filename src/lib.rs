//! pos-sync: normalizes point-of-sale exports and loads them into a SQLite store.
//!
//! A run reads the daily sales, the menu catalog and the ingredient stock (see [`input`]),
//! standardizes product names and computes sale totals and profits (see [`transform`]), then
//! writes staff, products, ingredients and sales to the store and reports the top sellers.

pub mod args;
pub mod commands;
mod config;
mod db;
mod error;
pub mod input;
mod loader;
pub mod model;
pub mod transform;
mod utils;

#[cfg(test)]
mod test;

pub use config::{Config, InputPaths};
pub use db::TopSeller;
pub use error::Error;
pub use error::Result;
pub use loader::LoadReport;
