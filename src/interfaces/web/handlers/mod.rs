pub mod automations;
pub mod dashboard;
pub mod records;
