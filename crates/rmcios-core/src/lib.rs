//! Parameter marshalling and channel lifecycle protocol.
//!
//! Everything above the raw dispatch call lives here: flattening and
//! converting tagged parameters ([`convert`]), delivering results into
//! return destinations ([`inject`]), resolving names and command
//! keywords ([`name`]), the channel creation/link/storage protocols
//! ([`lifecycle`]) and typed read/write convenience wrappers
//! ([`access`]).
//!
//! The conversion layer is total: a failed or impossible conversion
//! yields the target type's sentinel (`0`, `NAN`, an empty buffer)
//! instead of an error, and buffer transfers that do not fit report
//! the full required size so the caller can retry with more room.

pub mod access;
pub mod convert;
mod fmt;
pub mod inject;
pub mod lifecycle;
pub mod name;

#[cfg(test)]
mod testutil;

pub use access::{
    info, read_f, read_i, read_str, write_binary, write_buffer, write_f, write_fv, write_i,
    write_iv, write_str,
};
pub use convert::{
    param_binary_length, param_buffer_alloc_size, param_buffer_length, param_count, param_item,
    param_string_alloc_size, param_string_length, param_to_binary, param_to_buffer,
    param_to_channel, param_to_float, param_to_function, param_to_integer, param_to_string, Item,
};
pub use inject::{
    return_binary, return_buffer, return_float, return_int, return_string, return_void,
};
pub use lifecycle::{
    allocate_storage, create_channel, create_channel_param, create_subchannel, free_storage,
    link_channel, link_channel_function, linked_channels, StorageHandle,
};
pub use name::{channel_enum, channel_name, detect_function, function_enum};
