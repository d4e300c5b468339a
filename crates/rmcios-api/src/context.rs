//! Dispatch entry point and well-known channel roster.

use std::fmt;

use crate::function::Function;
use crate::params::Params;
use crate::returns::Returns;

/// Integer channel identifier. `0` means "no channel".
pub type ChannelId = i32;

/// The "no channel" sentinel.
pub const NO_CHANNEL: ChannelId = 0;

/// A channel implementation: behavior and private state fused in one
/// object.
///
/// This is the single polymorphic call every resource in the system is
/// reached through. Implementations receive the dispatch context for
/// re-entrant calls, their own id, the requested operation, an optional
/// return destination, and the tagged parameter payload. Failures are
/// communicated through sentinel results written to the destination,
/// never by panicking.
pub trait Channel {
    fn handle(
        &self,
        ctx: &Context,
        id: ChannelId,
        function: Function,
        returns: Option<&mut Returns>,
        params: &Params,
    );
}

/// Copyable reference to a channel implementation, carried through
/// `Create` calls.
#[derive(Clone, Copy)]
pub struct Handler(pub &'static dyn Channel);

impl fmt::Debug for Handler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Handler(..)")
    }
}

/// Well-known channel ids a context is wired with.
///
/// Resolved by the surrounding runtime, consumed read-only by the
/// protocol. An id of `0` marks a role as unavailable.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct WellKnownChannels {
    /// Resolves a channel name to its id.
    pub id: ChannelId,
    /// Name registry: associates ids with names, resolves id to name.
    pub name: ChannelId,
    /// Default memory allocator.
    pub mem: ChannelId,
    /// Scratch/exchange memory between channels.
    pub quemem: ChannelId,
    /// Error messages.
    pub errors: ChannelId,
    /// Warning messages.
    pub warning: ChannelId,
    /// Reporting (module initialization messages etc).
    pub report: ChannelId,
    /// Text-based control.
    pub control: ChannelId,
    /// Link-table management.
    pub link: ChannelId,
    /// Interaction with linked channels.
    pub linked: ChannelId,
    /// Channel creation.
    pub create: ChannelId,
    /// Parameter conversion.
    pub convert: ChannelId,
}

/// Process-wide dispatch context.
///
/// Constructed once by the surrounding runtime and handed by reference
/// into every call; the protocol never mutates it. Everything above
/// the raw dispatch call is expressed purely through [`Context::run`]
/// against the well-known ids plus caller-supplied channel ids.
#[derive(Clone, Copy)]
pub struct Context<'a> {
    dispatcher: &'a dyn Channel,
    /// Well-known channel roles of this context.
    pub well_known: WellKnownChannels,
}

impl<'a> Context<'a> {
    /// Wire a context over a dispatcher and its well-known roster.
    pub fn new(dispatcher: &'a dyn Channel, well_known: WellKnownChannels) -> Self {
        Self {
            dispatcher,
            well_known,
        }
    }

    /// The single dispatch entry point.
    ///
    /// Synchronous call/return: the caller blocks on the callee's stack
    /// frame, and the callee is free to issue further `run` calls
    /// recursively on the same thread.
    pub fn run(
        &self,
        id: ChannelId,
        function: Function,
        returns: Option<&mut Returns>,
        params: &Params,
    ) {
        self.dispatcher.handle(self, id, function, returns, params);
    }
}

impl fmt::Debug for Context<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Context")
            .field("well_known", &self.well_known)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::returns::Returns;

    struct CountingDispatcher(std::cell::Cell<usize>);

    impl Channel for CountingDispatcher {
        fn handle(
            &self,
            _ctx: &Context,
            _id: ChannelId,
            _function: Function,
            _returns: Option<&mut Returns>,
            _params: &Params,
        ) {
            self.0.set(self.0.get() + 1);
        }
    }

    #[test]
    fn run_reaches_the_dispatcher() {
        let dispatcher = CountingDispatcher(std::cell::Cell::new(0));
        let ctx = Context::new(&dispatcher, WellKnownChannels::default());
        ctx.run(7, Function::Read, None, &Params::Int(&[]));
        ctx.run(7, Function::Write, None, &Params::Int(&[1]));
        assert_eq!(dispatcher.0.get(), 2);
    }

    #[test]
    fn default_roster_is_all_unset() {
        let roster = WellKnownChannels::default();
        assert_eq!(roster.id, NO_CHANNEL);
        assert_eq!(roster.convert, NO_CHANNEL);
    }
}
