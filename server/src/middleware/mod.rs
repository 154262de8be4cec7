//! Request middleware.
//!
//! SYSTEM CONTEXT
//! ==============
//! `edge_guard` runs in front of every route and decides, per request,
//! whether a protected page may render.

pub mod edge_guard;
