//! SQLite persistence for finalized rounds, manager picks, and league structure.

pub mod migrations;
pub mod repo;

pub use migrations::init_db;
pub use repo::Repository;
