//! Fixed capacity store of demonstration records.
//!
//! Records are written at slot `idx % capacity` where `idx` is a cursor that only grows on
//! [`DemoBuffer::add`]. Once `idx >= capacity` the oldest records are overwritten in place.
//! [`DemoBuffer::rollback`] moves the cursor back without erasing anything; the rolled back
//! slots are logically void and get overwritten by subsequent writes. A slot overwritten
//! once never holds a valid record of an older logical index again, so
//! [`DemoBuffer::restore`] and rollback after a wrap can shorten the valid window.
mod base;
mod config;
mod storage;
pub use base::{CursorMark, DemoBuffer, DemoRecord};
pub use config::DemoBufferConfig;
