//! kintrack-client: client-side presence components.
//!
//! Inactivity detection, cross-tab coordination, and the coalescing
//! status client, all as pure time-injected state machines. The
//! runtime crate wires them to real timers and sockets.

pub mod activity;
pub mod broadcast;
pub mod status_client;
pub mod tab;
