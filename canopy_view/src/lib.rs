// Copyright 2025 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

// After you edit the crate's doc comment, run this command, then check README.md for any missing links
// cargo rdme --workspace-project=canopy_view --heading-base-level=0

//! Canopy View: viewport primitives for flame charts.
//!
//! This crate provides small, headless models of what a flame chart is
//! currently showing. Time runs along X (nanoseconds, zoomed in pixels per
//! nanosecond); call depth runs along Y in fixed-height rows, with depth `0`
//! on the bottom edge. It focuses on:
//! - A per-frame [`ViewportState`] snapshot and the [`ViewportBounds`] it
//!   derives for culling.
//! - Coordinate conversion between screen pixels and `(time, depth)`.
//! - The level-of-detail knobs in [`LodConfig`], including the display-density
//!   threshold below which events are aggregated.
//! - A stateful [`TimelineViewport`] controller for pan, zoom, and fitting.
//!
//! It does **not** own any trace data or rendering backend. Callers are
//! expected to:
//! - Drive [`TimelineViewport`] from their own input handling.
//! - Pass the resulting [`ViewportState`] to `canopy_index` for culling and to
//!   `canopy_hit` for pointer queries, once per frame.
//!
//! ## Minimal example
//!
//! ```rust
//! use canopy_view::{LodConfig, TimelineViewport};
//!
//! let config = LodConfig::default();
//!
//! // 800x600 display over a 2 ms trace.
//! let mut view = TimelineViewport::new(800.0, 600.0);
//! view.set_trace_span(Some(0.0..2_000_000.0));
//! view.fit_trace();
//!
//! let state = view.state();
//! let bounds = state.bounds(&config).unwrap();
//! assert!(bounds.time_start.abs() < 1.0);
//! assert!((bounds.time_end - 2_000_000.0).abs() < 1.0);
//!
//! // Anything shorter than this many nanoseconds is drawn as a bucket.
//! let threshold = state.density_threshold(&config);
//! assert!(threshold > 0.0);
//! ```
//!
//! Malformed snapshots (zero zoom, negative sizes, NaN offsets) are reported as
//! [`ViewportError`] by [`ViewportState::bounds`]; downstream crates turn that
//! into an empty frame.
//!
//! This crate is `no_std`.

#![no_std]

#[cfg(feature = "std")]
extern crate std;

mod config;
mod modes;
mod state;
mod timeline;

pub use config::LodConfig;
pub use modes::{ClampMode, FitMode};
pub use state::{ViewportBounds, ViewportError, ViewportState};
pub use timeline::TimelineViewport;
