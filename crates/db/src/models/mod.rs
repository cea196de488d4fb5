pub mod breeding_program;
pub mod compatibility_report;
pub mod dog;
