//! Backend-for-frontend of the homewatch smart-home dashboard.
//!
//! The dashboard UI talks to this service; this service talks to the
//! smart-home REST backend through [`client::BackendClient`], and turns the
//! raw device usage and energy series into chart-ready data:
//! - [`aggregate`] groups device usage by room, capped at four series
//! - [`energy`] splits net energy into stacked generation/usage bars
//! - [`report`] summarizes a time window for the printable report
//!
//! Modules follow the Explicit Module Boundary Pattern (EMBP): `routes`
//! exposes one gateway router and keeps its endpoints private.

pub mod aggregate;
pub mod client;
pub mod config;
pub mod energy;
pub mod models;
pub mod report;
pub mod routes;

pub use aggregate::aggregate_usage_by_room;
pub use client::{BackendClient, ClientError, RequestContext};
pub use energy::decompose_net_energy;
