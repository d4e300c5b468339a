//! Tagged parameter payloads.

use crate::buffer::BufView;
use crate::context::{ChannelId, Handler};

/// A tagged, borrowed parameter payload.
///
/// One value of this enum carries a whole homogeneous parameter array;
/// counts come from slice lengths. `Combo` composes several typed
/// segments into one heterogeneous argument list without heap
/// allocation: callers lay the segments out in a stack array and pass
/// the slice. A flat index into a combo resolves by walking segments
/// in order, subtracting each segment's flattened count.
#[derive(Clone, Copy, Debug)]
pub enum Params<'a> {
    /// Signed integer parameters.
    Int(&'a [i32]),
    /// Float parameters.
    Float(&'a [f32]),
    /// ASCII/text-oriented byte buffers.
    Text(&'a [BufView<'a>]),
    /// Raw binary byte buffers. Same physical layout as `Text`, but
    /// conversions preserve raw bytes instead of parsing them.
    Binary(&'a [BufView<'a>]),
    /// Channel identifiers.
    Channel(&'a [ChannelId]),
    /// A channel implementation reference, carried by `Create` calls.
    Handler(Handler),
    /// Ordered heterogeneous segments.
    Combo(&'a [Params<'a>]),
}

impl Params<'_> {
    /// An empty parameter list.
    pub fn empty() -> Params<'static> {
        Params::Int(&[])
    }

    /// Item count of this payload alone, without recursing into combo
    /// segments (a combo counts its segments here).
    pub fn segment_len(&self) -> usize {
        match self {
            Params::Int(v) => v.len(),
            Params::Float(v) => v.len(),
            Params::Text(v) => v.len(),
            Params::Binary(v) => v.len(),
            Params::Channel(v) => v.len(),
            Params::Handler(_) => 1,
            Params::Combo(segments) => segments.len(),
        }
    }
}
