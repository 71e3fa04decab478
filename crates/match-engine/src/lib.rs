//! Courtside Match Engine
//!
//! Batch analysis of one match clip, end to end.
//!
//! # Pipeline
//!
//! ```text
//! clip ──► frame 0 ──► calibrate ──► reference (rectified)
//!   │                                     │
//!   └──► frames 1..N ──► rectify ──► similarity ──► segment ──► in-play frames
//!                                                                    │
//!                              detector (cached) ◄───────────────────┤
//!                                     │                              │
//!                              gap fill + bounces                    │
//!                                     │                              │
//!                              screen → court → canvas               │
//!                                     │                              ▼
//!                                     └──────────────────────► mini-court overlay
//!                                                                    │
//!                                                                    ▼
//!                                            filtered/  annotated/  report.json
//! ```

pub mod overlay;
pub mod pipeline;

pub use overlay::MiniCourt;
pub use pipeline::*;
