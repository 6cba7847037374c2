//! Version lookup layer for images and charts
//!
//! Fetches tag lists and chart versions from upstream registries, caches the
//! results, and derives an update status for every scanned reference.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │  Upstream   │────▶│   Checker   │◀───▶│    Cache    │
//! │  (fetch)    │     │ (orchestrate│     │   (JSON)    │
//! └─────────────┘     └─────────────┘     └─────────────┘
//!        │                   │
//!        ▼                   ▼
//! ┌─────────────┐     ┌─────────────┐
//! │ Registries  │     │  Resolver   │
//! │(hub,quay,..)│     │(select tag) │
//! └─────────────┘     └─────────────┘
//! ```
//!
//! # Modules
//!
//! - [`cache`]: JSON file cache with TTL and refresh modes
//! - [`checker`]: Check orchestration, rate-limit halting and statuses
//! - [`registry`]: `Upstream` and `TagRegistry` traits
//! - [`registries`]: Docker Hub, Quay, OCI and ArtifactHub clients
//! - [`resolver`]: Latest-tag selection relative to the pinned tag
//! - [`semver`]: Loose version pattern and ordering
//! - [`error`]: Error types for cache and registry operations
//! - [`types`]: Lookup results like `TagInfo`

pub mod cache;
pub mod checker;
pub mod error;
pub mod registries;
pub mod registry;
pub mod resolver;
pub mod semver;
pub mod types;
