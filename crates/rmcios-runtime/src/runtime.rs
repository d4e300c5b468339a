//! The reference dispatcher: builtin channels plus the dynamic table.
//!
//! Builtins occupy the low fixed ids; dynamically created channels are
//! appended from [`FIRST_DYNAMIC`] upward. All shared state sits in one
//! `RefCell` and every borrow is released before re-entering dispatch,
//! so channels are free to issue recursive calls from their handlers.

use std::cell::RefCell;
use std::collections::HashMap;

use rmcios_api::{
    BufView, Channel, ChannelId, Context, Function, Handler, Params, Returns, WellKnownChannels,
    NO_CHANNEL,
};
use rmcios_core::convert::{
    param_count, param_item, param_string_alloc_size, param_to_function, param_to_integer,
    param_to_string, Item,
};
use rmcios_core::inject::{
    return_binary, return_buffer, return_float, return_int, return_string, return_void,
};
use rmcios_core::name::function_enum;

use crate::error::{Result, RuntimeError};
use crate::storage::Slab;

const CH_ID: ChannelId = 1;
const CH_NAME: ChannelId = 2;
const CH_MEM: ChannelId = 3;
const CH_QUEMEM: ChannelId = 4;
const CH_ERRORS: ChannelId = 5;
const CH_WARNING: ChannelId = 6;
const CH_REPORT: ChannelId = 7;
const CH_CONTROL: ChannelId = 8;
const CH_LINK: ChannelId = 9;
const CH_LINKED: ChannelId = 10;
const CH_CREATE: ChannelId = 11;
const CH_CONVERT: ChannelId = 12;

/// First id handed out to dynamically created channels.
pub const FIRST_DYNAMIC: ChannelId = 13;

/// Capacity of the dynamic channel table.
pub const MAX_CHANNELS: usize = 4096;

struct Link {
    target: ChannelId,
    /// Selector filter; `None` forwards writes only.
    function: Option<Function>,
    /// Selector rewrite for the forwarded call.
    to_function: Option<Function>,
}

struct Tables {
    channels: Vec<Handler>,
    names: HashMap<String, ChannelId>,
    ids: HashMap<ChannelId, String>,
    links: HashMap<ChannelId, Vec<Link>>,
    logs: HashMap<ChannelId, Vec<String>>,
    mem: Slab,
    quemem: Slab,
}

/// The reference runtime.
///
/// Implements the dispatch trait itself; obtain a [`Context`] with
/// [`Runtime::context`] and drive everything through the protocol, or
/// use the direct methods ([`Runtime::register`] etc) for host-side
/// setup where a `Result` is more convenient than sentinel results.
pub struct Runtime {
    tables: RefCell<Tables>,
}

impl Runtime {
    /// Roster of the builtin channels.
    pub const WELL_KNOWN: WellKnownChannels = WellKnownChannels {
        id: CH_ID,
        name: CH_NAME,
        mem: CH_MEM,
        quemem: CH_QUEMEM,
        errors: CH_ERRORS,
        warning: CH_WARNING,
        report: CH_REPORT,
        control: CH_CONTROL,
        link: CH_LINK,
        linked: CH_LINKED,
        create: CH_CREATE,
        convert: CH_CONVERT,
    };

    pub fn new() -> Self {
        Self {
            tables: RefCell::new(Tables {
                channels: Vec::new(),
                names: HashMap::new(),
                ids: HashMap::new(),
                links: HashMap::new(),
                logs: HashMap::new(),
                mem: Slab::new(),
                quemem: Slab::new(),
            }),
        }
    }

    /// Dispatch context over this runtime.
    pub fn context(&self) -> Context<'_> {
        Context::new(self, Self::WELL_KNOWN)
    }

    /// Register a channel directly, bypassing the dispatch protocol.
    pub fn register(&self, name: &str, handler: Handler) -> Result<ChannelId> {
        let mut tables = self.tables.borrow_mut();
        if tables.channels.len() >= MAX_CHANNELS {
            return Err(RuntimeError::TableFull(MAX_CHANNELS));
        }
        if !name.is_empty() && tables.names.contains_key(name) {
            return Err(RuntimeError::DuplicateName(name.to_string()));
        }
        let id = FIRST_DYNAMIC + tables.channels.len() as ChannelId;
        tables.channels.push(handler);
        if !name.is_empty() {
            tables.names.insert(name.to_string(), id);
            tables.ids.insert(id, name.to_string());
        }
        tracing::debug!(id, name, "channel registered");
        Ok(id)
    }

    /// Lines written to one of the log sink channels.
    pub fn log_lines(&self, channel: ChannelId) -> Vec<String> {
        self.tables
            .borrow()
            .logs
            .get(&channel)
            .cloned()
            .unwrap_or_default()
    }

    /// Count of live blocks held by the default storage channel.
    pub fn storage_blocks(&self) -> usize {
        self.tables.borrow().mem.live()
    }

    fn resolve_id(
        &self,
        ctx: &Context,
        function: Function,
        returns: Option<&mut Returns>,
        params: &Params,
    ) {
        if function != Function::Read {
            return;
        }
        let name = string_param(params, 0);
        let id = self
            .tables
            .borrow()
            .names
            .get(&name)
            .copied()
            .unwrap_or(NO_CHANNEL);
        return_int(ctx, returns, id);
    }

    fn name_registry(
        &self,
        ctx: &Context,
        function: Function,
        returns: Option<&mut Returns>,
        params: &Params,
    ) {
        match function {
            Function::Read => {
                let id = param_to_integer(params, 0);
                let name = self.tables.borrow().ids.get(&id).cloned();
                return_string(ctx, returns, name.as_deref().unwrap_or(""));
            }
            Function::Write => {
                let id = param_to_integer(params, 0);
                let name = string_param(params, 1);
                if id == NO_CHANNEL || name.is_empty() {
                    return_void(ctx, returns);
                    return;
                }
                let accepted = {
                    let mut tables = self.tables.borrow_mut();
                    match tables.names.get(&name) {
                        Some(&existing) if existing != id => false,
                        _ => {
                            tables.names.insert(name.clone(), id);
                            tables.ids.insert(id, name.clone());
                            true
                        }
                    }
                };
                if accepted {
                    tracing::debug!(id, %name, "channel named");
                } else {
                    tracing::warn!(id, %name, "name already registered to another channel");
                    self.log(
                        CH_ERRORS,
                        format!("name already registered: {name}"),
                    );
                }
                return_void(ctx, returns);
            }
            _ => {}
        }
    }

    fn storage(
        &self,
        ctx: &Context,
        id: ChannelId,
        function: Function,
        returns: Option<&mut Returns>,
        params: &Params,
    ) {
        if function != Function::Write {
            return;
        }
        let count = param_count(params);
        if count >= 2 {
            // Release request: empty first parameter, handle second.
            let handle = raw_param_u64(params, 1);
            let released = {
                let mut tables = self.tables.borrow_mut();
                tables.slab_mut(id).release(handle)
            };
            if !released {
                tracing::warn!(handle, "release of unknown storage handle");
            }
            return_void(ctx, returns);
        } else if count == 1 {
            let size = raw_param_u64(params, 0) as usize;
            let handle = {
                let mut tables = self.tables.borrow_mut();
                tables.slab_mut(id).allocate(size)
            };
            if handle != 0 {
                tracing::trace!(handle, size, "storage allocated");
                return_binary(ctx, returns, &handle.to_le_bytes());
            }
        }
    }

    fn sink(&self, id: ChannelId, function: Function, params: &Params) {
        if function != Function::Write {
            return;
        }
        let mut line = String::new();
        for index in 0..param_count(params) {
            line.push_str(&string_param(params, index));
        }
        self.log(id, line);
    }

    fn log(&self, id: ChannelId, line: String) {
        match id {
            CH_ERRORS => tracing::error!("{line}"),
            CH_WARNING => tracing::warn!("{line}"),
            _ => tracing::info!("{line}"),
        }
        self.tables
            .borrow_mut()
            .logs
            .entry(id)
            .or_default()
            .push(line);
    }

    fn control(&self, ctx: &Context, function: Function, params: &Params) {
        if function != Function::Write {
            return;
        }
        let line = string_param(params, 0);
        let mut tokens = line.split_whitespace();
        let Some(keyword) = tokens.next() else {
            return;
        };
        let Some(command) = function_enum(keyword) else {
            tracing::warn!(keyword, "unknown command keyword");
            return;
        };
        let Some(target_name) = tokens.next() else {
            return;
        };
        let target = {
            let tables = self.tables.borrow();
            tables.names.get(target_name).copied()
        }
        .or_else(|| target_name.parse::<ChannelId>().ok())
        .unwrap_or(NO_CHANNEL);
        if target == NO_CHANNEL {
            tracing::warn!(target_name, "command targets an unknown channel");
            return;
        }
        let arguments: Vec<BufView> = tokens.map(BufView::from_str).collect();
        ctx.run(target, command, None, &Params::Text(&arguments));
    }

    fn link_table(
        &self,
        ctx: &Context,
        function: Function,
        returns: Option<&mut Returns>,
        params: &Params,
    ) {
        if function != Function::Link && function != Function::Write {
            return;
        }
        let count = param_count(params);
        let (from, filter, to, rewrite) = match count {
            2 => (
                param_to_integer(params, 0),
                None,
                param_to_integer(params, 1),
                None,
            ),
            4 => (
                param_to_integer(params, 0),
                param_to_function(params, 1),
                param_to_integer(params, 2),
                param_to_function(params, 3),
            ),
            _ => {
                tracing::warn!(count, "malformed link request");
                return;
            }
        };
        if from == NO_CHANNEL {
            return;
        }
        {
            let mut tables = self.tables.borrow_mut();
            if to == NO_CHANNEL {
                tables.links.remove(&from);
            } else {
                tables.links.entry(from).or_default().push(Link {
                    target: to,
                    function: filter,
                    to_function: rewrite,
                });
            }
        }
        tracing::debug!(from, to, "link table updated");
        return_void(ctx, returns);
    }

    fn linked(
        &self,
        ctx: &Context,
        function: Function,
        returns: Option<&mut Returns>,
        params: &Params,
    ) {
        if function != Function::Read {
            return;
        }
        let channel = param_to_integer(params, 0);
        let count = self
            .tables
            .borrow()
            .links
            .get(&channel)
            .map_or(0, |links| links.len() as i32);
        return_int(ctx, returns, count);
    }

    fn create(
        &self,
        ctx: &Context,
        function: Function,
        returns: Option<&mut Returns>,
        params: &Params,
    ) {
        if function != Function::Create {
            return;
        }
        let Some(Item::Handler(handler)) = param_item(params, 0) else {
            tracing::warn!("create call without a handler parameter");
            return;
        };
        let id = {
            let mut tables = self.tables.borrow_mut();
            if tables.channels.len() >= MAX_CHANNELS {
                NO_CHANNEL
            } else {
                let id = FIRST_DYNAMIC + tables.channels.len() as ChannelId;
                tables.channels.push(handler);
                id
            }
        };
        if id == NO_CHANNEL {
            self.log(CH_ERRORS, "channel table is full".to_string());
            return;
        }
        tracing::debug!(id, "channel created");
        return_int(ctx, returns, id);
    }

    fn convert(
        &self,
        ctx: &Context,
        function: Function,
        returns: Option<&mut Returns>,
        params: &Params,
    ) {
        if function != Function::Read {
            return;
        }
        match param_item(params, 0) {
            Some(Item::Int(n)) => return_int(ctx, returns, n),
            Some(Item::Float(x)) => return_float(ctx, returns, x),
            Some(Item::Channel(id)) => return_int(ctx, returns, id),
            Some(Item::Text(view)) => return_buffer(ctx, returns, view.payload()),
            Some(Item::Binary(view)) => return_binary(ctx, returns, view.payload()),
            Some(Item::Handler(_)) | None => {}
        }
    }

    fn dynamic(
        &self,
        ctx: &Context,
        id: ChannelId,
        function: Function,
        returns: Option<&mut Returns>,
        params: &Params,
    ) {
        let handler = {
            let tables = self.tables.borrow();
            usize::try_from(id - FIRST_DYNAMIC)
                .ok()
                .and_then(|index| tables.channels.get(index).copied())
        };
        match handler {
            Some(handler) => handler.0.handle(ctx, id, function, returns, params),
            None => tracing::debug!(id, "call to unknown channel dropped"),
        }
    }

    fn forward(&self, ctx: &Context, id: ChannelId, function: Function, params: &Params) {
        let targets: Vec<(ChannelId, Function)> = {
            let tables = self.tables.borrow();
            match tables.links.get(&id) {
                Some(links) => links
                    .iter()
                    .filter(|link| {
                        link.function
                            .map_or(function == Function::Write, |f| f == function)
                    })
                    .map(|link| (link.target, link.to_function.unwrap_or(function)))
                    .collect(),
                None => Vec::new(),
            }
        };
        for (target, forwarded) in targets {
            tracing::trace!(from = id, to = target, "forwarding over link");
            ctx.run(target, forwarded, None, params);
        }
    }
}

impl Default for Runtime {
    fn default() -> Self {
        Self::new()
    }
}

impl Channel for Runtime {
    fn handle(
        &self,
        ctx: &Context,
        id: ChannelId,
        function: Function,
        returns: Option<&mut Returns>,
        params: &Params,
    ) {
        match id {
            CH_ID => self.resolve_id(ctx, function, returns, params),
            CH_NAME => self.name_registry(ctx, function, returns, params),
            CH_MEM | CH_QUEMEM => self.storage(ctx, id, function, returns, params),
            CH_ERRORS | CH_WARNING | CH_REPORT => self.sink(id, function, params),
            CH_CONTROL => self.control(ctx, function, params),
            CH_LINK => self.link_table(ctx, function, returns, params),
            CH_LINKED => self.linked(ctx, function, returns, params),
            CH_CREATE => self.create(ctx, function, returns, params),
            CH_CONVERT => self.convert(ctx, function, returns, params),
            other => self.dynamic(ctx, other, function, returns, params),
        }
        self.forward(ctx, id, function, params);
    }
}

impl Tables {
    fn slab_mut(&mut self, id: ChannelId) -> &mut Slab {
        if id == CH_QUEMEM {
            &mut self.quemem
        } else {
            &mut self.mem
        }
    }
}

/// Parameter at `index` as an owned string.
fn string_param(params: &Params, index: usize) -> String {
    let mut scratch = vec![0u8; param_string_alloc_size(params, index)];
    param_to_string(params, index, &mut scratch).to_string()
}

/// Parameter at `index` as a raw little-endian word.
fn raw_param_u64(params: &Params, index: usize) -> u64 {
    match param_item(params, index) {
        Some(Item::Binary(view) | Item::Text(view)) => {
            let bytes = view.payload();
            let mut raw = [0u8; 8];
            let n = bytes.len().min(8);
            raw[..n].copy_from_slice(&bytes[..n]);
            u64::from_le_bytes(raw)
        }
        Some(Item::Int(n)) => n as u64,
        Some(Item::Float(x)) => x as u64,
        _ => 0,
    }
}
