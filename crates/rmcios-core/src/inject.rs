//! Result delivery into return destinations.
//!
//! A callee produces one value and hands it to the matching `return_*`
//! helper; the helper adapts the value to whatever destination the
//! caller supplied. `None` and discard destinations are silently
//! absorbed, so callees never branch on whether anyone is listening.

use rmcios_api::{BufView, Context, Function, Params, Returns, NO_CHANNEL};

use crate::convert::{
    float_from_raw, int_from_raw, parse_float, parse_int, MAX_COMBO_DEPTH,
};
use crate::fmt::{utf8_prefix, write_display};

/// Deliver an integer result.
pub fn return_int(ctx: &Context, returns: Option<&mut Returns>, value: i32) {
    int_at(ctx, returns, value, 0)
}

fn int_at(ctx: &Context, returns: Option<&mut Returns>, value: i32, depth: usize) {
    if depth > MAX_COMBO_DEPTH {
        tracing::warn!(depth, "return combo nesting exceeds supported depth");
        return;
    }
    let Some(returns) = returns else { return };
    match returns {
        Returns::Int(slots) => {
            if let Some(slot) = slots.first_mut() {
                *slot = value;
            }
        }
        Returns::Float(slots) => {
            if let Some(slot) = slots.first_mut() {
                *slot = value as f32;
            }
        }
        Returns::Buffer(out) => {
            write_display(out, value);
            out.try_terminate();
        }
        Returns::Binary(out) => out.append(&value.to_le_bytes()),
        Returns::Channel(id) => {
            if *id != NO_CHANNEL {
                ctx.run(*id, Function::Write, None, &Params::Int(&[value]));
            }
        }
        Returns::Combo(segments) => int_at(ctx, segments.first_mut(), value, depth + 1),
    }
}

/// Deliver a float result.
pub fn return_float(ctx: &Context, returns: Option<&mut Returns>, value: f32) {
    float_at(ctx, returns, value, 0)
}

fn float_at(ctx: &Context, returns: Option<&mut Returns>, value: f32, depth: usize) {
    if depth > MAX_COMBO_DEPTH {
        tracing::warn!(depth, "return combo nesting exceeds supported depth");
        return;
    }
    let Some(returns) = returns else { return };
    match returns {
        Returns::Int(slots) => {
            if let Some(slot) = slots.first_mut() {
                *slot = value as i32;
            }
        }
        Returns::Float(slots) => {
            if let Some(slot) = slots.first_mut() {
                *slot = value;
            }
        }
        Returns::Buffer(out) => {
            write_display(out, value);
            out.try_terminate();
        }
        Returns::Binary(out) => out.append(&value.to_le_bytes()),
        Returns::Channel(id) => {
            if *id != NO_CHANNEL {
                ctx.run(*id, Function::Write, None, &Params::Float(&[value]));
            }
        }
        Returns::Combo(segments) => float_at(ctx, segments.first_mut(), value, depth + 1),
    }
}

/// Deliver a string result.
pub fn return_string(ctx: &Context, returns: Option<&mut Returns>, value: &str) {
    string_at(ctx, returns, value, 0)
}

fn string_at(ctx: &Context, returns: Option<&mut Returns>, value: &str, depth: usize) {
    if depth > MAX_COMBO_DEPTH {
        tracing::warn!(depth, "return combo nesting exceeds supported depth");
        return;
    }
    let Some(returns) = returns else { return };
    match returns {
        Returns::Int(slots) => {
            if let Some(slot) = slots.first_mut() {
                *slot = parse_int(value);
            }
        }
        Returns::Float(slots) => {
            if let Some(slot) = slots.first_mut() {
                *slot = parse_float(value);
            }
        }
        Returns::Buffer(out) => {
            out.append(value.as_bytes());
            out.try_terminate();
        }
        Returns::Binary(out) => out.append(value.as_bytes()),
        Returns::Channel(id) => {
            if *id != NO_CHANNEL {
                let views = [BufView::from_str(value)];
                ctx.run(*id, Function::Write, None, &Params::Text(&views));
            }
        }
        Returns::Combo(segments) => string_at(ctx, segments.first_mut(), value, depth + 1),
    }
}

/// Deliver unterminated text bytes.
pub fn return_buffer(ctx: &Context, returns: Option<&mut Returns>, bytes: &[u8]) {
    buffer_at(ctx, returns, bytes, 0)
}

fn buffer_at(ctx: &Context, returns: Option<&mut Returns>, bytes: &[u8], depth: usize) {
    if depth > MAX_COMBO_DEPTH {
        tracing::warn!(depth, "return combo nesting exceeds supported depth");
        return;
    }
    let Some(returns) = returns else { return };
    match returns {
        Returns::Int(slots) => {
            if let Some(slot) = slots.first_mut() {
                *slot = parse_int(utf8_prefix(bytes));
            }
        }
        Returns::Float(slots) => {
            if let Some(slot) = slots.first_mut() {
                *slot = parse_float(utf8_prefix(bytes));
            }
        }
        Returns::Buffer(out) | Returns::Binary(out) => out.append(bytes),
        Returns::Channel(id) => {
            if *id != NO_CHANNEL {
                let views = [BufView::from_bytes(bytes)];
                ctx.run(*id, Function::Write, None, &Params::Text(&views));
            }
        }
        Returns::Combo(segments) => buffer_at(ctx, segments.first_mut(), bytes, depth + 1),
    }
}

/// Deliver raw binary bytes.
pub fn return_binary(ctx: &Context, returns: Option<&mut Returns>, bytes: &[u8]) {
    binary_at(ctx, returns, bytes, 0)
}

fn binary_at(ctx: &Context, returns: Option<&mut Returns>, bytes: &[u8], depth: usize) {
    if depth > MAX_COMBO_DEPTH {
        tracing::warn!(depth, "return combo nesting exceeds supported depth");
        return;
    }
    let Some(returns) = returns else { return };
    match returns {
        Returns::Int(slots) => {
            if let Some(slot) = slots.first_mut() {
                *slot = int_from_raw(bytes);
            }
        }
        Returns::Float(slots) => {
            if let Some(slot) = slots.first_mut() {
                *slot = float_from_raw(bytes);
            }
        }
        Returns::Buffer(out) | Returns::Binary(out) => out.append(bytes),
        Returns::Channel(id) => {
            if *id != NO_CHANNEL {
                let views = [BufView::from_bytes(bytes)];
                ctx.run(*id, Function::Write, None, &Params::Binary(&views));
            }
        }
        Returns::Combo(segments) => binary_at(ctx, segments.first_mut(), bytes, depth + 1),
    }
}

/// Deliver "operation done, no payload".
///
/// Only channel destinations observe this: they receive an empty
/// `Write` as a completion signal. Everything else is left untouched.
pub fn return_void(ctx: &Context, returns: Option<&mut Returns>) {
    void_at(ctx, returns, 0)
}

fn void_at(ctx: &Context, returns: Option<&mut Returns>, depth: usize) {
    if depth > MAX_COMBO_DEPTH {
        tracing::warn!(depth, "return combo nesting exceeds supported depth");
        return;
    }
    let Some(returns) = returns else { return };
    match returns {
        Returns::Channel(id) => {
            if *id != NO_CHANNEL {
                ctx.run(*id, Function::Write, None, &Params::Text(&[]));
            }
        }
        Returns::Combo(segments) => void_at(ctx, segments.first_mut(), depth + 1),
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::{flatten, OwnedItem, Recorder};
    use rmcios_api::{BufMut, Function, WellKnownChannels};

    fn quiet_ctx(recorder: &Recorder) -> Context<'_> {
        recorder.context(WellKnownChannels::default())
    }

    #[test]
    fn int_lands_in_every_destination_kind() {
        let recorder = Recorder::new();
        let ctx = quiet_ctx(&recorder);

        let mut slot = [0i32];
        return_int(&ctx, Some(&mut Returns::Int(&mut slot)), 5);
        assert_eq!(slot[0], 5);

        let mut slot = [0f32];
        return_int(&ctx, Some(&mut Returns::Float(&mut slot)), 5);
        assert_eq!(slot[0], 5.0);

        let mut scratch = [0u8; 8];
        let mut dest = Returns::Buffer(BufMut::new(&mut scratch));
        return_int(&ctx, Some(&mut dest), -12);
        if let Returns::Buffer(out) = &dest {
            assert_eq!(out.payload(), b"-12");
            assert!(out.trailing_accessible() > 0);
        } else {
            unreachable!();
        }

        let mut scratch = [0u8; 8];
        let mut dest = Returns::Binary(BufMut::new(&mut scratch));
        return_int(&ctx, Some(&mut dest), 0x0403_0201);
        if let Returns::Binary(out) = &dest {
            assert_eq!(out.payload(), &[1, 2, 3, 4]);
        } else {
            unreachable!();
        }
    }

    #[test]
    fn channel_destination_forwards_as_write() {
        let recorder = Recorder::new();
        let ctx = quiet_ctx(&recorder);
        return_int(&ctx, Some(&mut Returns::Channel(6)), 99);
        let call = recorder.call(0);
        assert_eq!(call.id, 6);
        assert_eq!(call.function, Function::Write);
        assert_eq!(call.items, vec![OwnedItem::Int(99)]);
    }

    #[test]
    fn unset_channel_destination_is_silent() {
        let recorder = Recorder::new();
        let ctx = quiet_ctx(&recorder);
        return_int(&ctx, Some(&mut Returns::Channel(NO_CHANNEL)), 99);
        return_void(&ctx, Some(&mut Returns::Channel(NO_CHANNEL)));
        assert_eq!(recorder.call_count(), 0);
    }

    #[test]
    fn combo_delegates_to_first_segment() {
        let recorder = Recorder::new();
        let ctx = quiet_ctx(&recorder);
        let mut first = [0i32];
        let mut second = [0i32];
        {
            let mut segments = [Returns::Int(&mut first), Returns::Int(&mut second)];
            return_int(&ctx, Some(&mut Returns::Combo(&mut segments)), 3);
        }
        assert_eq!(first[0], 3);
        assert_eq!(second[0], 0);
    }

    #[test]
    fn string_adapts_to_numeric_destinations() {
        let recorder = Recorder::new();
        let ctx = quiet_ctx(&recorder);

        let mut slot = [0i32];
        return_string(&ctx, Some(&mut Returns::Int(&mut slot)), "37");
        assert_eq!(slot[0], 37);

        let mut slot = [0f32];
        return_string(&ctx, Some(&mut Returns::Float(&mut slot)), "1.5");
        assert_eq!(slot[0], 1.5);

        let mut slot = [0f32];
        return_string(&ctx, Some(&mut Returns::Float(&mut slot)), "junk");
        assert!(slot[0].is_nan());
    }

    #[test]
    fn string_to_buffer_terminates_when_room_remains() {
        let recorder = Recorder::new();
        let ctx = quiet_ctx(&recorder);
        let mut scratch = [0u8; 8];
        let mut dest = Returns::Buffer(BufMut::new(&mut scratch));
        return_string(&ctx, Some(&mut dest), "ok");
        if let Returns::Buffer(out) = &dest {
            assert_eq!(out.payload(), b"ok");
            assert!(out.as_view().has_terminator());
        } else {
            unreachable!();
        }
    }

    #[test]
    fn string_to_channel_carries_text_params() {
        let recorder = Recorder::new();
        let ctx = quiet_ctx(&recorder);
        return_string(&ctx, Some(&mut Returns::Channel(4)), "hello");
        let call = recorder.call(0);
        assert_eq!(call.id, 4);
        assert_eq!(
            call.items,
            vec![OwnedItem::Text {
                payload: b"hello".to_vec(),
                terminated: false,
            }]
        );
    }

    #[test]
    fn binary_decodes_into_numeric_destinations() {
        let recorder = Recorder::new();
        let ctx = quiet_ctx(&recorder);
        let mut slot = [0i32];
        return_binary(
            &ctx,
            Some(&mut Returns::Int(&mut slot)),
            &0x1234_5678i32.to_le_bytes(),
        );
        assert_eq!(slot[0], 0x1234_5678);
    }

    #[test]
    fn void_signals_channel_destinations_only() {
        let recorder = Recorder::new();
        let ctx = quiet_ctx(&recorder);
        let mut slot = [11i32];
        return_void(&ctx, Some(&mut Returns::Int(&mut slot)));
        assert_eq!(slot[0], 11);
        assert_eq!(recorder.call_count(), 0);

        return_void(&ctx, Some(&mut Returns::Channel(8)));
        let call = recorder.call(0);
        assert_eq!(call.id, 8);
        assert_eq!(call.function, Function::Write);
        assert!(call.items.is_empty());
    }

    #[test]
    fn missing_destination_is_absorbed() {
        let recorder = Recorder::new();
        let ctx = quiet_ctx(&recorder);
        return_int(&ctx, None, 1);
        return_float(&ctx, None, 1.0);
        return_string(&ctx, None, "x");
        return_void(&ctx, None);
        assert_eq!(recorder.call_count(), 0);
    }

    #[test]
    fn flatten_records_buffer_payloads() {
        let recorder = Recorder::new();
        let ctx = quiet_ctx(&recorder);
        return_buffer(&ctx, Some(&mut Returns::Channel(3)), b"abc");
        let call = recorder.call(0);
        assert_eq!(call.items.len(), 1);
        assert_eq!(
            call.items[0],
            OwnedItem::Text {
                payload: b"abc".to_vec(),
                terminated: false,
            }
        );
    }

    #[test]
    fn flatten_helper_snapshots_combos() {
        let segments = [Params::Int(&[1]), Params::Float(&[2.0])];
        let items = flatten(&Params::Combo(&segments));
        assert_eq!(items, vec![OwnedItem::Int(1), OwnedItem::Float(2.0)]);
    }
}
