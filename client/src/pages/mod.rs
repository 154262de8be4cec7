//! Page modules for route-level screens.
//!
//! ARCHITECTURE
//! ============
//! Each page owns route-scoped orchestration and reads session state through
//! the provided `AuthContext`.

pub mod dashboard;
pub mod login;
