//! Client-side session state.
//!
//! SYSTEM CONTEXT
//! ==============
//! `token` is the persisted bearer-token cell; `auth` builds the resolver
//! and login/logout facade on top of it.

pub mod auth;
pub mod token;
