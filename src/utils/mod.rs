pub mod formatting;
pub mod report;
