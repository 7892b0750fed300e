pub mod history;
pub mod token;
pub mod tracker;
