//! Name resolution: function keywords and channel names.

use rmcios_api::{BufMut, BufView, ChannelId, Context, Function, Params, Returns, NO_CHANNEL};

/// Textual command keywords in match order. Legacy spellings map onto
/// the selectors that replaced them.
const FUNCTION_KEYWORDS: [(&[u8], Function); 8] = [
    (b"help", Function::Help),
    (b"create", Function::Create),
    (b"setup", Function::Setup),
    (b"write", Function::Write),
    (b"read", Function::Read),
    (b"reset", Function::Write),
    (b"link", Function::Link),
    (b"conf", Function::Setup),
];

/// Detect a function keyword at the start of `input`.
///
/// The keyword must be followed by end of input, a space, or a NUL
/// byte; longer identifiers that merely start with a keyword do not
/// match.
pub fn detect_function(input: &[u8]) -> Option<Function> {
    for (keyword, function) in FUNCTION_KEYWORDS {
        if let Some(rest) = input.strip_prefix(keyword) {
            match rest.first().copied() {
                None | Some(b' ') | Some(0) => return Some(function),
                _ => {}
            }
        }
    }
    None
}

/// Selector named by `name`, `None` when the text names no function.
pub fn function_enum(name: &str) -> Option<Function> {
    detect_function(name.as_bytes())
}

/// Resolve a channel name to its id through the id channel.
/// Unknown names resolve to [`NO_CHANNEL`].
pub fn channel_enum(ctx: &Context, name: &str) -> ChannelId {
    let mut id = [NO_CHANNEL];
    let views = [BufView::from_str(name)];
    let mut returns = Returns::Int(&mut id);
    ctx.run(
        ctx.well_known.id,
        Function::Read,
        Some(&mut returns),
        &Params::Text(&views),
    );
    id[0]
}

/// Fetch a channel's registered name into `name_to` through the name
/// registry channel.
///
/// Returns the full name length in bytes, which may exceed the buffer
/// capacity; pass an empty buffer to probe the size without copying.
pub fn channel_name(ctx: &Context, channel: ChannelId, name_to: &mut [u8]) -> usize {
    let mut returns = Returns::Buffer(BufMut::new(name_to));
    ctx.run(
        ctx.well_known.name,
        Function::Read,
        Some(&mut returns),
        &Params::Int(&[channel]),
    );
    match &returns {
        Returns::Buffer(out) => out.required_size(),
        _ => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::Recorder;
    use rmcios_api::WellKnownChannels;

    #[test]
    fn keywords_match_at_word_boundaries() {
        assert_eq!(detect_function(b"write"), Some(Function::Write));
        assert_eq!(detect_function(b"write led 1"), Some(Function::Write));
        assert_eq!(detect_function(b"read\0garbage"), Some(Function::Read));
        assert_eq!(detect_function(b"help"), Some(Function::Help));
        assert_eq!(detect_function(b"create timer"), Some(Function::Create));
        assert_eq!(detect_function(b"link a b"), Some(Function::Link));
    }

    #[test]
    fn keyword_prefixes_of_longer_words_do_not_match() {
        assert_eq!(detect_function(b"writer"), None);
        assert_eq!(detect_function(b"created"), None);
        assert_eq!(detect_function(b"linkage"), None);
    }

    #[test]
    fn incomplete_keywords_do_not_match() {
        assert_eq!(detect_function(b"writ"), None);
        assert_eq!(detect_function(b""), None);
        assert_eq!(detect_function(b" write"), None);
    }

    #[test]
    fn legacy_spellings_map_to_current_selectors() {
        assert_eq!(detect_function(b"reset"), Some(Function::Write));
        assert_eq!(detect_function(b"conf"), Some(Function::Setup));
        assert_eq!(detect_function(b"reset led"), Some(Function::Write));
        assert_eq!(function_enum("conf"), Some(Function::Setup));
    }

    #[test]
    fn channel_enum_asks_the_id_channel() {
        let recorder = Recorder::with_responder(Box::new(|_, id, function, returns, _| {
            assert_eq!(id, 1);
            assert_eq!(function, Function::Read);
            if let Some(Returns::Int(slots)) = returns {
                slots[0] = 77;
            }
        }));
        let roster = WellKnownChannels {
            id: 1,
            ..Default::default()
        };
        let ctx = recorder.context(roster);
        assert_eq!(channel_enum(&ctx, "led"), 77);
        let call = recorder.call(0);
        assert_eq!(call.id, 1);
    }

    #[test]
    fn channel_name_reports_full_length_on_probe() {
        let recorder = Recorder::with_responder(Box::new(|_, _, _, returns, _| {
            if let Some(Returns::Buffer(out)) = returns {
                out.append(b"motor");
                out.try_terminate();
            }
        }));
        let roster = WellKnownChannels {
            name: 2,
            ..Default::default()
        };
        let ctx = recorder.context(roster);
        assert_eq!(channel_name(&ctx, 13, &mut []), 5);
        let mut buffer = [0u8; 16];
        assert_eq!(channel_name(&ctx, 13, &mut buffer), 5);
        assert_eq!(&buffer[..6], b"motor\0");
    }
}
