pub mod authorize;
pub mod pipeline;
