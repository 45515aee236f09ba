pub mod analyze;
pub mod history;
pub mod rules;
pub mod users;
