//! The command invocation boundary.
//!
//! Everything the client knows about the native side goes through
//! [`Backend::invoke`]: a command name from a fixed catalogue plus a JSON
//! argument object, answered by a `{ data, errors }` envelope.

mod command;
mod response;

use futures::future::LocalBoxFuture;

pub use command::Command;
pub use response::{ErrorDescriptor, ErrorKind, RawResponse, Response};

/// Transport to the native backend.
///
/// Returned futures are `'static` so they can be parked in the task set
/// while the UI keeps handling messages; implementations clone whatever
/// shared handle they need instead of borrowing `self`.
pub trait Backend {
    fn invoke(
        &self,
        command: Command,
        args: serde_json::Value,
    ) -> LocalBoxFuture<'static, anyhow::Result<RawResponse>>;
}
