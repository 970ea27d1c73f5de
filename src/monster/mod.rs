//! Monster domain: record model, seed catalog, the persisted store, list
//! view derivation, the edit form, and import/export.
//!
//! Everything here is plain single-threaded Rust with no browser types; the
//! `routes` layer turns it into HTML fragments.

pub mod catalog;
pub mod confirm;
pub mod form;
pub mod model;
pub mod store;
pub mod transfer;
pub mod view;
