pub mod core;
pub mod dashboard;
pub mod notes;
pub mod study_plan;
pub mod subjects;
pub mod topics;
