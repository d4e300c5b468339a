//! Channel creation, naming, linking and storage negotiation.
//!
//! Creation is a two-call protocol: a `Create` on the creation channel
//! registers the implementation and returns the new id, then a `Write`
//! on the name registry associates the id with its name. Either call
//! can be issued alone; the helpers here sequence both.

use rmcios_api::{
    BufMut, BufView, ChannelId, Context, Function, Handler, Params, Returns, NO_CHANNEL,
};

use crate::convert::{param_string_alloc_size, param_to_string};
use crate::fmt::utf8_prefix;
use crate::name::channel_name;

/// Register `handler` as a new channel and give it a name.
///
/// Returns the new channel id, or [`NO_CHANNEL`] when the creation
/// channel is unavailable or refused the registration. An empty name
/// skips the registry call.
pub fn create_channel(ctx: &Context, name: &str, handler: Handler) -> ChannelId {
    let mut id = [NO_CHANNEL];
    {
        let mut returns = Returns::Int(&mut id);
        ctx.run(
            ctx.well_known.create,
            Function::Create,
            Some(&mut returns),
            &Params::Handler(handler),
        );
    }
    let id = id[0];
    if id != NO_CHANNEL && !name.is_empty() {
        let ids = [id];
        let views = [BufView::from_str(name)];
        let segments = [Params::Int(&ids), Params::Text(&views)];
        ctx.run(
            ctx.well_known.name,
            Function::Write,
            None,
            &Params::Combo(&segments),
        );
    }
    id
}

/// [`create_channel`] with the name taken from a parameter item.
pub fn create_channel_param(
    ctx: &Context,
    params: &Params,
    index: usize,
    handler: Handler,
) -> ChannelId {
    let mut scratch = vec![0u8; param_string_alloc_size(params, index)];
    let name = param_to_string(params, index, &mut scratch);
    create_channel(ctx, name, handler)
}

/// Create a channel named after its parent plus `suffix`.
///
/// The parent's registered name is fetched from the registry; a parent
/// without a name yields a channel named by the suffix alone.
pub fn create_subchannel(
    ctx: &Context,
    parent: ChannelId,
    suffix: &str,
    handler: Handler,
) -> ChannelId {
    let parent_len = channel_name(ctx, parent, &mut []);
    let mut name = vec![0u8; parent_len];
    channel_name(ctx, parent, &mut name);
    name.extend_from_slice(suffix.as_bytes());
    create_channel(ctx, utf8_prefix(&name), handler)
}

/// Link `channel` so its writes are forwarded to `to`.
pub fn link_channel(ctx: &Context, channel: ChannelId, to: ChannelId) {
    ctx.run(
        ctx.well_known.link,
        Function::Link,
        None,
        &Params::Int(&[channel, to]),
    );
}

/// Link `channel` to `to` with a function filter.
///
/// Only calls with selector `function` are forwarded; `to_function`
/// rewrites the forwarded selector, `None` keeps it unchanged.
pub fn link_channel_function(
    ctx: &Context,
    channel: ChannelId,
    to: ChannelId,
    function: Function,
    to_function: Option<Function>,
) {
    let params = [
        channel,
        function.code(),
        to,
        to_function.map_or(0, Function::code),
    ];
    ctx.run(
        ctx.well_known.link,
        Function::Link,
        None,
        &Params::Int(&params),
    );
}

/// Number of channels linked from `channel`.
pub fn linked_channels(ctx: &Context, channel: ChannelId) -> i32 {
    let mut count = [0i32];
    let mut returns = Returns::Int(&mut count);
    ctx.run(
        ctx.well_known.linked,
        Function::Read,
        Some(&mut returns),
        &Params::Int(&[channel]),
    );
    count[0]
}

/// Opaque handle to a storage block held by a storage channel.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StorageHandle(pub u64);

impl StorageHandle {
    /// The "no storage" sentinel.
    pub const NULL: StorageHandle = StorageHandle(0);

    /// True for the "no storage" sentinel.
    pub fn is_null(self) -> bool {
        self.0 == 0
    }
}

/// Request `size` bytes from a storage channel.
///
/// `storage_channel` of [`NO_CHANNEL`] selects the default allocator.
/// Returns [`StorageHandle::NULL`] when no allocator is available or
/// the request was refused.
pub fn allocate_storage(ctx: &Context, size: usize, storage_channel: ChannelId) -> StorageHandle {
    let channel = if storage_channel == NO_CHANNEL {
        ctx.well_known.mem
    } else {
        storage_channel
    };
    if channel == NO_CHANNEL {
        return StorageHandle::NULL;
    }
    let size_bytes = (size as u64).to_le_bytes();
    let views = [BufView::from_bytes(&size_bytes)];
    let mut raw = [0u8; 8];
    let written = {
        let mut returns = Returns::Binary(BufMut::new(&mut raw));
        ctx.run(
            channel,
            Function::Write,
            Some(&mut returns),
            &Params::Binary(&views),
        );
        match &returns {
            Returns::Binary(out) => out.len(),
            _ => 0,
        }
    };
    if written < raw.len() {
        return StorageHandle::NULL;
    }
    StorageHandle(u64::from_le_bytes(raw))
}

/// Release a storage block.
///
/// The release request is a `Write` whose first parameter is an empty
/// buffer and whose second carries the handle.
pub fn free_storage(ctx: &Context, handle: StorageHandle, storage_channel: ChannelId) {
    let channel = if storage_channel == NO_CHANNEL {
        ctx.well_known.mem
    } else {
        storage_channel
    };
    if channel == NO_CHANNEL || handle.is_null() {
        return;
    }
    let raw = handle.0.to_le_bytes();
    let views = [BufView::from_bytes(&[]), BufView::from_bytes(&raw)];
    ctx.run(channel, Function::Write, None, &Params::Binary(&views));
}
