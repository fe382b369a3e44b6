//! Core 3-D space-colonization growth and branch-topology library.
//!
//! Main components:
//! - [`attractor`] — attraction points, their alive/dead lifecycle, and
//!   the [`attractor::PointSampler`] collaborator seam.
//! - [`tree`] — the rooted branch skeleton stored as an arena.
//! - [`nearest`] — nearest-node lookup behind [`nearest::NearestNodeQuery`].
//! - [`config`] — growth constants with eager validation.
//! - [`influence_buffer`] — per-node accumulation of attractor pull.
//! - [`grower`] — the iterative space-colonization engine.
//! - [`topology`] — pipe-model thickness fold producing [`topology::Segment`]s
//!   for a [`topology::GeometryEmitter`].
//! - [`types`] — shared type aliases and ids.

pub mod attractor;
pub mod config;
pub mod grower;
pub mod influence_buffer;
pub mod nearest;
pub mod topology;
pub mod tree;
pub mod types;
