//! Channel-system data model and dispatch contract.
//!
//! Every resource in the system — sensors, memory, logging, name lookup,
//! type conversion — is a numbered channel reached through one polymorphic
//! dispatch call. This crate defines the vocabulary that call speaks:
//! - Tagged parameter payloads ([`Params`]) and return destinations
//!   ([`Returns`])
//! - Borrowed byte buffers with size negotiation ([`BufView`], [`BufMut`])
//! - The channel function selectors ([`Function`])
//! - The dispatch entry point and well-known channel roster ([`Context`],
//!   [`Channel`])
//!
//! All payload types borrow caller memory for the duration of a single
//! call; nothing here allocates or retains references past the call that
//! produced them.

pub mod buffer;
pub mod context;
pub mod function;
pub mod params;
pub mod returns;

pub use buffer::{BufMut, BufView};
pub use context::{Channel, ChannelId, Context, Handler, WellKnownChannels, NO_CHANNEL};
pub use function::Function;
pub use params::Params;
pub use returns::Returns;
