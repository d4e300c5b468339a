//! Recording dispatcher for unit tests.

use std::cell::RefCell;

use rmcios_api::{ChannelId, Channel, Context, Function, Params, Returns, WellKnownChannels};

use crate::convert::{param_count, param_item, Item};

/// Owned snapshot of one flattened parameter item.
#[derive(Clone, Debug, PartialEq)]
pub enum OwnedItem {
    Int(i32),
    Float(f32),
    Text { payload: Vec<u8>, terminated: bool },
    Binary(Vec<u8>),
    Channel(ChannelId),
    Handler,
}

/// Snapshot a payload's flattened items into owned values.
pub fn flatten(params: &Params) -> Vec<OwnedItem> {
    (0..param_count(params))
        .filter_map(|i| param_item(params, i))
        .map(|item| match item {
            Item::Int(n) => OwnedItem::Int(n),
            Item::Float(x) => OwnedItem::Float(x),
            Item::Text(view) => OwnedItem::Text {
                payload: view.payload().to_vec(),
                terminated: view.has_terminator(),
            },
            Item::Binary(view) => OwnedItem::Binary(view.payload().to_vec()),
            Item::Channel(id) => OwnedItem::Channel(id),
            Item::Handler(_) => OwnedItem::Handler,
        })
        .collect()
}

/// One recorded dispatch call.
#[derive(Clone, Debug)]
pub struct Call {
    pub id: ChannelId,
    pub function: Function,
    pub items: Vec<OwnedItem>,
}

type Responder = Box<dyn Fn(usize, ChannelId, Function, Option<&mut Returns>, &Params)>;

/// Dispatcher that records every call and plays a scripted response.
///
/// The responder receives the call index plus the live return
/// destination, so tests can both script results and assert on the
/// exact payloads that crossed the dispatch boundary.
pub struct Recorder {
    calls: RefCell<Vec<Call>>,
    responder: Responder,
}

impl Recorder {
    pub fn new() -> Self {
        Self::with_responder(Box::new(|_, _, _, _, _| {}))
    }

    pub fn with_responder(responder: Responder) -> Self {
        Self {
            calls: RefCell::new(Vec::new()),
            responder,
        }
    }

    pub fn context(&self, well_known: WellKnownChannels) -> Context<'_> {
        Context::new(self, well_known)
    }

    pub fn call_count(&self) -> usize {
        self.calls.borrow().len()
    }

    pub fn call(&self, index: usize) -> Call {
        self.calls.borrow()[index].clone()
    }
}

impl Channel for Recorder {
    fn handle(
        &self,
        _ctx: &Context,
        id: ChannelId,
        function: Function,
        returns: Option<&mut Returns>,
        params: &Params,
    ) {
        let index = {
            let mut calls = self.calls.borrow_mut();
            calls.push(Call {
                id,
                function,
                items: flatten(params),
            });
            calls.len() - 1
        };
        (self.responder)(index, id, function, returns, params);
    }
}
