pub mod employee;
pub mod settings;
pub mod target;
pub mod time_entry;
