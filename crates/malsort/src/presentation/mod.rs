pub mod callback;

pub use callback::{CallbackError, CallbackListener, CallbackParams};
