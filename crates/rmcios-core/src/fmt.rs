//! Text encoding glue for buffer destinations.

use core::fmt::{self, Write};

use rmcios_api::BufMut;

/// `core::fmt::Write` adapter over a [`BufMut`].
///
/// Formatting never fails at this layer: overflow is absorbed by the
/// buffer's clamp-and-count behavior and surfaces as `required_size`
/// exceeding `len`.
pub(crate) struct BufWriter<'w, 'a>(pub &'w mut BufMut<'a>);

impl fmt::Write for BufWriter<'_, '_> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.0.append(s.as_bytes());
        Ok(())
    }
}

/// Format a displayable value into a destination buffer.
pub(crate) fn write_display<T: fmt::Display>(out: &mut BufMut<'_>, value: T) {
    // BufWriter::write_str is infallible.
    let _ = write!(BufWriter(out), "{value}");
}

/// Longest leading slice of `bytes` that is valid UTF-8.
pub(crate) fn utf8_prefix(bytes: &[u8]) -> &str {
    match core::str::from_utf8(bytes) {
        Ok(s) => s,
        Err(e) => {
            let valid = &bytes[..e.valid_up_to()];
            // Just validated above.
            core::str::from_utf8(valid).unwrap_or("")
        }
    }
}
