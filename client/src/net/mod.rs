//! Networking for the identity API.
//!
//! SYSTEM CONTEXT
//! ==============
//! `api` defines the `IdentityApi` seam used by the auth context and its
//! `fetch`-backed implementation. Wire shapes live in the shared `wire` crate.

pub mod api;
