//! Parameter flattening and type conversion.
//!
//! Every accessor takes the whole tagged payload plus a flat item
//! index; combo segments are walked transparently. Conversions never
//! fail: out-of-range indexes and impossible conversions yield the
//! sentinel of the target type (`0`, `NAN`, an empty buffer).

use rmcios_api::{
    BufMut, BufView, ChannelId, Context, Function, Handler, Params, NO_CHANNEL,
};

use crate::fmt::{utf8_prefix, write_display};
use crate::name::{channel_enum, detect_function};

/// Deepest combo nesting the flattening walk will follow.
pub(crate) const MAX_COMBO_DEPTH: usize = 32;

/// One resolved parameter item after combo flattening.
#[derive(Clone, Copy, Debug)]
pub enum Item<'a> {
    Int(i32),
    Float(f32),
    Text(BufView<'a>),
    Binary(BufView<'a>),
    Channel(ChannelId),
    Handler(Handler),
}

/// Flattened item count of a payload, recursing through combos.
pub fn param_count(params: &Params) -> usize {
    count_at(params, 0)
}

fn count_at(params: &Params, depth: usize) -> usize {
    if depth > MAX_COMBO_DEPTH {
        tracing::warn!(depth, "combo nesting exceeds supported depth");
        return 0;
    }
    match params {
        Params::Combo(segments) => segments.iter().map(|s| count_at(s, depth + 1)).sum(),
        other => other.segment_len(),
    }
}

/// Item at flat index `index`, `None` when out of range.
pub fn param_item<'a>(params: &Params<'a>, index: usize) -> Option<Item<'a>> {
    item_at(params, index, 0)
}

fn item_at<'a>(params: &Params<'a>, mut index: usize, depth: usize) -> Option<Item<'a>> {
    if depth > MAX_COMBO_DEPTH {
        tracing::warn!(depth, "combo nesting exceeds supported depth");
        return None;
    }
    match params {
        Params::Int(v) => v.get(index).map(|&n| Item::Int(n)),
        Params::Float(v) => v.get(index).map(|&x| Item::Float(x)),
        Params::Text(v) => v.get(index).map(|&b| Item::Text(b)),
        Params::Binary(v) => v.get(index).map(|&b| Item::Binary(b)),
        Params::Channel(v) => v.get(index).map(|&c| Item::Channel(c)),
        Params::Handler(h) => (index == 0).then_some(Item::Handler(*h)),
        Params::Combo(segments) => {
            for segment in segments.iter() {
                let n = count_at(segment, depth + 1);
                if index < n {
                    return item_at(segment, index, depth + 1);
                }
                index -= n;
            }
            None
        }
    }
}

/// First whitespace-delimited token as an integer. Decimal text wins,
/// float text is truncated toward zero, anything else is `0`.
pub(crate) fn parse_int(text: &str) -> i32 {
    let token = text.split_whitespace().next().unwrap_or("");
    if let Ok(n) = token.parse::<i32>() {
        return n;
    }
    token.parse::<f32>().map_or(0, |x| x as i32)
}

/// First whitespace-delimited token as a float, `NAN` when unparsable.
pub(crate) fn parse_float(text: &str) -> f32 {
    let token = text.split_whitespace().next().unwrap_or("");
    token.parse::<f32>().unwrap_or(f32::NAN)
}

/// Little-endian integer from up to 4 raw bytes, zero-padded.
pub(crate) fn int_from_raw(bytes: &[u8]) -> i32 {
    let mut raw = [0u8; 4];
    let n = bytes.len().min(4);
    raw[..n].copy_from_slice(&bytes[..n]);
    i32::from_le_bytes(raw)
}

/// Little-endian float from raw bytes, `NAN` when fewer than 4 bytes.
pub(crate) fn float_from_raw(bytes: &[u8]) -> f32 {
    if bytes.len() < 4 {
        return f32::NAN;
    }
    f32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]])
}

/// Parameter at `index` as an integer, `0` when absent or inconvertible.
pub fn param_to_integer(params: &Params, index: usize) -> i32 {
    match param_item(params, index) {
        Some(Item::Int(n)) => n,
        Some(Item::Float(x)) => x as i32,
        Some(Item::Channel(id)) => id,
        Some(Item::Text(view)) => parse_int(utf8_prefix(view.payload())),
        Some(Item::Binary(view)) => int_from_raw(view.payload()),
        Some(Item::Handler(_)) | None => 0,
    }
}

/// Parameter at `index` as a float, `NAN` when absent or inconvertible.
pub fn param_to_float(params: &Params, index: usize) -> f32 {
    match param_item(params, index) {
        Some(Item::Float(x)) => x,
        Some(Item::Int(n)) => n as f32,
        Some(Item::Channel(id)) => id as f32,
        Some(Item::Text(view)) => parse_float(utf8_prefix(view.payload())),
        Some(Item::Binary(view)) => float_from_raw(view.payload()),
        Some(Item::Handler(_)) | None => f32::NAN,
    }
}

/// Parameter at `index` as a channel id.
///
/// Text first resolves through the id channel; text that names no
/// registered channel falls back to numeric parsing. Absent or
/// inconvertible parameters yield [`NO_CHANNEL`].
pub fn param_to_channel(ctx: &Context, params: &Params, index: usize) -> ChannelId {
    match param_item(params, index) {
        Some(Item::Channel(id)) => id,
        Some(Item::Int(n)) => n,
        Some(Item::Float(x)) => x as i32,
        Some(Item::Text(view)) => {
            let text = utf8_prefix(view.payload());
            let id = channel_enum(ctx, text);
            if id != NO_CHANNEL {
                id
            } else {
                parse_int(text)
            }
        }
        Some(Item::Binary(view)) => int_from_raw(view.payload()),
        Some(Item::Handler(_)) | None => NO_CHANNEL,
    }
}

/// Parameter at `index` as a function selector.
///
/// Numeric parameters carry the selector code; text is matched against
/// the command keywords first and parsed numerically as a fallback.
pub fn param_to_function(params: &Params, index: usize) -> Option<Function> {
    match param_item(params, index) {
        Some(Item::Int(n)) => Function::from_code(n),
        Some(Item::Float(x)) => Function::from_code(x as i32),
        Some(Item::Channel(id)) => Function::from_code(id),
        Some(Item::Text(view)) => {
            let payload = view.payload();
            detect_function(payload)
                .or_else(|| Function::from_code(parse_int(utf8_prefix(payload))))
        }
        Some(Item::Binary(view)) => Function::from_code(int_from_raw(view.payload())),
        Some(Item::Handler(_)) | None => None,
    }
}

/// Parameter at `index` as a string.
///
/// Buffer parameters that already carry a terminator are borrowed
/// without copying. Everything else is rendered into `scratch`, clamped
/// to leave room for a terminator byte. Size the scratch with
/// [`param_string_alloc_size`]; a zero result there means the scratch
/// is never touched.
pub fn param_to_string<'p>(params: &Params<'p>, index: usize, scratch: &'p mut [u8]) -> &'p str {
    let item = param_item(params, index);
    if let Some(Item::Text(view) | Item::Binary(view)) = item {
        if view.has_terminator() && view.is_complete() {
            return utf8_prefix(view.payload());
        }
    }
    if scratch.is_empty() {
        return "";
    }
    let len = {
        let mut out = BufMut::new(&mut *scratch);
        match item {
            Some(Item::Int(n)) => write_display(&mut out, n),
            Some(Item::Float(x)) => write_display(&mut out, x),
            Some(Item::Channel(id)) => write_display(&mut out, id),
            Some(Item::Text(view) | Item::Binary(view)) => out.append(view.payload()),
            Some(Item::Handler(_)) | None => {}
        }
        out.len()
    };
    let n = len.min(scratch.len() - 1);
    scratch[n] = 0;
    let frozen: &'p [u8] = scratch;
    utf8_prefix(&frozen[..n])
}

/// Parameter at `index` as a text buffer view.
///
/// Buffer parameters are borrowed as-is; numeric parameters are
/// rendered as text into `scratch`.
pub fn param_to_buffer<'p>(
    params: &Params<'p>,
    index: usize,
    scratch: &'p mut [u8],
) -> BufView<'p> {
    match param_item(params, index) {
        Some(Item::Text(view) | Item::Binary(view)) => view,
        item => {
            let mut out = BufMut::new(scratch);
            match item {
                Some(Item::Int(n)) => write_display(&mut out, n),
                Some(Item::Float(x)) => write_display(&mut out, x),
                Some(Item::Channel(id)) => write_display(&mut out, id),
                _ => {}
            }
            out.into_view()
        }
    }
}

/// Parameter at `index` as a raw byte view.
///
/// Buffer parameters are borrowed as-is; numeric parameters are
/// encoded little-endian into `scratch`.
pub fn param_to_binary<'p>(
    params: &Params<'p>,
    index: usize,
    scratch: &'p mut [u8],
) -> BufView<'p> {
    match param_item(params, index) {
        Some(Item::Text(view) | Item::Binary(view)) => view,
        item => {
            let mut out = BufMut::new(scratch);
            match item {
                Some(Item::Int(n)) => out.append(&n.to_le_bytes()),
                Some(Item::Float(x)) => out.append(&x.to_le_bytes()),
                Some(Item::Channel(id)) => out.append(&id.to_le_bytes()),
                _ => {}
            }
            out.into_view()
        }
    }
}

/// Text length of the parameter when rendered as a string, terminator
/// excluded.
fn text_required(params: &Params, index: usize) -> usize {
    match param_item(params, index) {
        Some(Item::Text(view) | Item::Binary(view)) => view.required_size(),
        item => {
            let mut probe = BufMut::new(&mut []);
            match item {
                Some(Item::Int(n)) => write_display(&mut probe, n),
                Some(Item::Float(x)) => write_display(&mut probe, x),
                Some(Item::Channel(id)) => write_display(&mut probe, id),
                _ => {}
            }
            probe.required_size()
        }
    }
}

/// Bytes needed to hold the parameter as a terminated string.
pub fn param_string_length(params: &Params, index: usize) -> usize {
    text_required(params, index) + 1
}

/// Bytes needed to hold the parameter as unterminated text.
pub fn param_buffer_length(params: &Params, index: usize) -> usize {
    text_required(params, index)
}

/// Bytes needed to hold the parameter as raw binary.
pub fn param_binary_length(params: &Params, index: usize) -> usize {
    match param_item(params, index) {
        Some(Item::Text(view) | Item::Binary(view)) => view.required_size(),
        Some(Item::Int(_) | Item::Float(_) | Item::Channel(_)) => 4,
        Some(Item::Handler(_)) | None => 0,
    }
}

/// Scratch bytes [`param_to_string`] needs for this parameter.
/// `0` means the string can be borrowed without copying.
pub fn param_string_alloc_size(params: &Params, index: usize) -> usize {
    match param_item(params, index) {
        Some(Item::Text(view) | Item::Binary(view))
            if view.has_terminator() && view.is_complete() =>
        {
            0
        }
        _ => text_required(params, index) + 1,
    }
}

/// Scratch bytes [`param_to_buffer`] needs for this parameter.
/// `0` means the buffer can be borrowed without copying.
pub fn param_buffer_alloc_size(params: &Params, index: usize) -> usize {
    match param_item(params, index) {
        Some(Item::Text(view) | Item::Binary(view)) => {
            if view.is_complete() {
                0
            } else {
                view.required_size()
            }
        }
        Some(Item::Int(_) | Item::Float(_) | Item::Channel(_)) => text_required(params, index),
        Some(Item::Handler(_)) | None => 0,
    }
}
