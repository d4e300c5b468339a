//! Convenience wrappers over the dispatch call.
//!
//! Thin typed entry points for the common read/write patterns so
//! channel code does not assemble parameter arrays by hand.

use rmcios_api::{BufMut, BufView, ChannelId, Context, Function, Params, Returns, NO_CHANNEL};

/// Read a float from a channel. `NAN` when the channel does not answer.
pub fn read_f(ctx: &Context, channel: ChannelId) -> f32 {
    let mut value = [f32::NAN];
    let mut returns = Returns::Float(&mut value);
    ctx.run(channel, Function::Read, Some(&mut returns), &Params::empty());
    value[0]
}

/// Read an integer from a channel. `0` when the channel does not answer.
pub fn read_i(ctx: &Context, channel: ChannelId) -> i32 {
    let mut value = [0i32];
    let mut returns = Returns::Int(&mut value);
    ctx.run(channel, Function::Read, Some(&mut returns), &Params::empty());
    value[0]
}

/// Read text from a channel into `string`, always NUL-terminating.
///
/// One byte of the buffer is reserved for the terminator. Returns the
/// full length of the channel's text, which may exceed what fit.
pub fn read_str(ctx: &Context, channel: ChannelId, string: &mut [u8]) -> usize {
    let reserve = string.len().saturating_sub(1);
    let (len, required) = {
        let mut returns = Returns::Buffer(BufMut::new(&mut string[..reserve]));
        ctx.run(channel, Function::Read, Some(&mut returns), &Params::empty());
        match &returns {
            Returns::Buffer(out) => (out.len(), out.required_size()),
            _ => (0, 0),
        }
    };
    if !string.is_empty() {
        string[len] = 0;
    }
    required
}

/// Write a float to a channel, returning the channel's echoed result.
pub fn write_f(ctx: &Context, channel: ChannelId, value: f32) -> f32 {
    write_fv(ctx, channel, &[value])
}

/// Write several floats to a channel.
pub fn write_fv(ctx: &Context, channel: ChannelId, values: &[f32]) -> f32 {
    let mut echo = [0f32];
    let mut returns = Returns::Float(&mut echo);
    ctx.run(
        channel,
        Function::Write,
        Some(&mut returns),
        &Params::Float(values),
    );
    echo[0]
}

/// Write an integer to a channel, returning the channel's echoed result.
pub fn write_i(ctx: &Context, channel: ChannelId, value: i32) -> i32 {
    write_iv(ctx, channel, &[value])
}

/// Write several integers to a channel.
pub fn write_iv(ctx: &Context, channel: ChannelId, values: &[i32]) -> i32 {
    let mut echo = [0i32];
    let mut returns = Returns::Int(&mut echo);
    ctx.run(
        channel,
        Function::Write,
        Some(&mut returns),
        &Params::Int(values),
    );
    echo[0]
}

/// Write a string to a channel, directing any result to
/// `return_channel` ([`NO_CHANNEL`] for none).
pub fn write_str(ctx: &Context, channel: ChannelId, s: &str, return_channel: ChannelId) {
    let views = [BufView::from_str(s)];
    let mut returns = Returns::Channel(return_channel);
    let returns = (return_channel != NO_CHANNEL).then_some(&mut returns);
    ctx.run(channel, Function::Write, returns, &Params::Text(&views));
}

/// Write unterminated text bytes to a channel.
pub fn write_buffer(ctx: &Context, channel: ChannelId, bytes: &[u8], return_channel: ChannelId) {
    let views = [BufView::from_bytes(bytes)];
    let mut returns = Returns::Channel(return_channel);
    let returns = (return_channel != NO_CHANNEL).then_some(&mut returns);
    ctx.run(channel, Function::Write, returns, &Params::Text(&views));
}

/// Write raw bytes to a channel, collecting a raw response.
///
/// Returns the full length of the channel's response; `return_data`
/// holds the prefix that fit.
pub fn write_binary(
    ctx: &Context,
    channel: ChannelId,
    bytes: &[u8],
    return_data: &mut [u8],
) -> usize {
    let views = [BufView::from_bytes(bytes)];
    let mut returns = Returns::Binary(BufMut::new(return_data));
    ctx.run(
        channel,
        Function::Write,
        Some(&mut returns),
        &Params::Binary(&views),
    );
    match &returns {
        Returns::Binary(out) => out.required_size(),
        _ => 0,
    }
}

/// Send a diagnostic message, silently dropped when `channel` is
/// [`NO_CHANNEL`].
pub fn info(ctx: &Context, channel: ChannelId, message: &str) {
    if channel == NO_CHANNEL {
        return;
    }
    write_str(ctx, channel, message, NO_CHANNEL);
}
