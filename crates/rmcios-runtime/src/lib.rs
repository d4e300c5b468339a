//! Reference channel runtime.
//!
//! Hosts the builtin channels the protocol assumes (id resolution, the
//! name registry, storage, log sinks, text control, the link table,
//! creation and conversion) plus a dynamic table for channels created
//! at run time, all behind one dispatch implementation. Construct a
//! [`Runtime`], take a context with [`Runtime::context`] and drive it
//! with the `rmcios-core` helpers.

mod error;
mod runtime;
mod storage;

pub use error::{Result, RuntimeError};
pub use runtime::{Runtime, FIRST_DYNAMIC, MAX_CHANNELS};
