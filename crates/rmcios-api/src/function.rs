//! Channel function selectors.

/// The operations a channel can be asked to perform.
///
/// Numeric codes are part of the protocol: selectors travel through
/// integer parameters and round-trip via [`Function::from_code`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Function {
    /// Runtime help text.
    Help = 1,
    /// Configure channel-specific parameters.
    Setup = 2,
    /// Write data to the channel.
    Write = 3,
    /// Read data from the channel.
    Read = 4,
    /// Create a new channel from the called channel.
    Create = 5,
    /// Link the channel to another channel.
    Link = 6,
}

impl Function {
    /// Protocol code of this selector.
    pub fn code(self) -> i32 {
        self as i32
    }

    /// Selector for a protocol code, `None` for anything outside the
    /// defined range.
    pub fn from_code(code: i32) -> Option<Self> {
        match code {
            1 => Some(Function::Help),
            2 => Some(Function::Setup),
            3 => Some(Function::Write),
            4 => Some(Function::Read),
            5 => Some(Function::Create),
            6 => Some(Function::Link),
            _ => None,
        }
    }
}
