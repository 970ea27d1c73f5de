//! Route handlers. Each takes the raw query or form body and returns an
//! HTML fragment for HTMX to swap into `#monster-app`.

pub mod form;
pub mod fragments;
pub mod monsters;
pub mod session;
pub mod transfer;
pub mod util;
