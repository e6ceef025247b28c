#![warn(missing_docs)]
//! Recording of human demonstrations from a game environment.
//!
//! A recording session involves three components:
//!
//! * [`ObsPipeline`] turns raw [`Frame`]s into stacked observations of the last `H`
//!   normalized frames.
//! * [`DemoBuffer`] stores `(obs, act, next_obs, is_done)` records in a fixed capacity
//!   circular buffer that can be rolled back, merged and saved to a directory.
//! * [`RecordingController`] reads operator keystrokes and drives an [`Env`], the pipeline
//!   and the buffer.
pub mod dummy;
pub mod error;

mod base;
pub use base::{Act, Env, Frame, Info, Step};

mod obs_pipeline;
pub use obs_pipeline::{ObsPipeline, ObsPipelineConfig, StackedObs};

mod demo_buffer;
pub use demo_buffer::{CursorMark, DemoBuffer, DemoBufferConfig, DemoRecord};

mod controller;
pub use controller::{
    Command, ControllerConfig, ControllerState, KeyMap, KeySource, RecordingController,
    ScriptedKeys, SessionSummary, SnapshotSlot, Snapshots,
};

pub use error::MimicError;
