//! Confirmation dialog capability for destructive actions.
//!
//! Over the request bridge the dialog is a round trip: the first request
//! renders the prompt, and the Yes/No buttons re-post the same action with
//! `confirm=yes|no`. That answer is what resolves the future here.

use futures::future::{self, FutureExt, LocalBoxFuture};

pub const DELETE_PROMPT: &str = "Are you sure you want to delete this monster?";
pub const REMOVE_ALL_PROMPT: &str = "Are you sure you want to remove all monsters?";
pub const IMPORT_PROMPT: &str = "Import will replace current monsters. Continue?";

pub trait ConfirmDialog {
    /// Resolve to true only when the user accepted `prompt`.
    fn confirm<'a>(&'a self, prompt: &'a str) -> LocalBoxFuture<'a, bool>;
}

/// A dialog whose answer is already known.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Answered(pub bool);

impl Answered {
    /// Read the `confirm` request parameter. `None` means the user has not
    /// been asked yet.
    pub fn from_param(param: Option<&str>) -> Option<Self> {
        param.map(|v| Answered(v == "yes"))
    }
}

impl ConfirmDialog for Answered {
    fn confirm<'a>(&'a self, prompt: &'a str) -> LocalBoxFuture<'a, bool> {
        log::debug!("confirm {:?} -> {}", prompt, self.0);
        future::ready(self.0).boxed_local()
    }
}
