//! Background Tasks Module
//!
//! Contains background tasks that run periodically during server operation.
//!
//! # Tasks
//! - Expiry reaper: reclaims expired cache entries at a configured interval

mod reaper;

pub use reaper::spawn_reaper_task;
