// EventDash - core/mod.rs
//
// Core business logic layer: the fetch/normalise/aggregate pipeline,
// filtering, and export.
// Must NOT depend on: app, platform, or the OS event API directly.

pub mod event_xml;
pub mod export;
pub mod fetch;
pub mod filter;
pub mod model;
pub mod pipeline;
