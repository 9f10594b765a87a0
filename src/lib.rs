//! Console Session - an interactive console runtime
//!
//! A console session runs a long-lived task on a worker thread, streams its
//! output into a bounded, scrollable transcript, and feeds line input back to
//! it. The pieces, from the bottom up:
//!
//! - [`channel`]: worker-to-viewer output queue that never blocks the worker
//!   and never loses output while the viewer is detached
//! - [`task`]: the task lifecycle (`New -> Running -> Terminated`) and the
//!   I/O handle task bodies write through
//! - [`layout`]: the renderer's offset/pixel queries, plus a monospace
//!   implementation
//! - [`session`]: the transcript, the scroll anchor that keeps the view on
//!   the same text across resizes, and the viewer-facing session API
//!
//! Rendering, the input widget and the program the task runs are supplied by
//! the host.

pub mod channel;
pub mod config;
pub mod demo;
pub mod domain;
pub mod layout;
pub mod session;
pub mod task;

pub use domain::*;
