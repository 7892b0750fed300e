pub mod auth;
pub mod catalog;
pub mod history;
pub mod reorder;

#[cfg(test)]
pub(crate) mod fake;
