//! Core abstractions shared by the pipeline, the buffer and the controller.
mod act;
mod env;
mod frame;
mod step;
pub use act::Act;
pub use env::Env;
pub use frame::Frame;
pub use step::{Info, Step};
