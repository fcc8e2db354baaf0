pub mod import;
pub mod extraction;
pub mod filter;
pub mod language;
pub mod report;
pub mod runner;
