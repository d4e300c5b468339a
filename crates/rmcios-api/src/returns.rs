//! Return destinations.

use crate::buffer::BufMut;
use crate::context::{ChannelId, NO_CHANNEL};

/// A mutable return destination, tagged with how the callee's result
/// should be delivered.
///
/// Scalar variants hold slices so that "zero expected outputs" (an
/// empty slice) is expressible; convenience callers use one-element
/// arrays. A `Channel` destination forwards the result as a fresh
/// `Write` call; a `Combo` destination always delegates to its first
/// segment and is never a terminal sink itself.
#[derive(Debug)]
pub enum Returns<'a> {
    /// Integer slots.
    Int(&'a mut [i32]),
    /// Float slots.
    Float(&'a mut [f32]),
    /// Text-encoded append destination.
    Buffer(BufMut<'a>),
    /// Raw-byte append destination.
    Binary(BufMut<'a>),
    /// Forward the result to this channel.
    Channel(ChannelId),
    /// Delegate to nested destinations.
    Combo(&'a mut [Returns<'a>]),
}

impl Returns<'_> {
    /// True when every write to this destination is discarded.
    ///
    /// Buffer destinations are never discards: even at zero capacity
    /// they still accumulate `required_size`, which is what powers
    /// size probing.
    pub fn is_discard(&self) -> bool {
        match self {
            Returns::Int(slots) => slots.is_empty(),
            Returns::Float(slots) => slots.is_empty(),
            Returns::Channel(id) => *id == NO_CHANNEL,
            Returns::Combo(segments) => segments.is_empty(),
            Returns::Buffer(_) | Returns::Binary(_) => false,
        }
    }
}
