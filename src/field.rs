//! The fixed set of editable slots and their defaults.
//!
//! Slots are addressed by ordinal (0..[`SLOT_COUNT`]) for focus movement, but
//! everything that needs to know what a slot *is* dispatches on [`SlotKind`].

use crate::draft::ALLOWED_METHODS;
use crate::input::TextInput;

pub const SLOT_COUNT: usize = 12;

pub const HOST: usize = 0;
pub const PROTO: usize = 1;
pub const METHOD: usize = 2;
pub const PATH: usize = 3;
pub const HEADER: usize = 4;
pub const HEADER_VAL: usize = 5;
pub const PARAM: usize = 6;
pub const PARAM_VAL: usize = 7;
pub const COOKIE: usize = 8;
pub const COOKIE_VAL: usize = 9;
pub const FORM: usize = 10;
pub const FORM_VAL: usize = 11;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Singleton {
    Host,
    Protocol,
    Method,
    Path,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pair {
    Header,
    Param,
    Cookie,
    Form,
}

impl Pair {
    pub fn key_slot(self) -> usize {
        match self {
            Pair::Header => HEADER,
            Pair::Param => PARAM,
            Pair::Cookie => COOKIE,
            Pair::Form => FORM,
        }
    }

    pub fn value_slot(self) -> usize {
        match self {
            Pair::Header => HEADER_VAL,
            Pair::Param => PARAM_VAL,
            Pair::Cookie => COOKIE_VAL,
            Pair::Form => FORM_VAL,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotKind {
    Singleton(Singleton),
    PairKey(Pair),
    PairValue(Pair),
}

impl SlotKind {
    /// The slot that carries the prompt for this one. Value slots share the
    /// prompt of their key.
    pub fn prompt_slot(self, slot: usize) -> usize {
        match self {
            SlotKind::PairValue(pair) => pair.key_slot(),
            _ => slot,
        }
    }
}

pub struct SlotSpec {
    pub kind: SlotKind,
    pub prompt: &'static str,
    pub placeholder: &'static str,
}

pub const SCHEMA: [SlotSpec; SLOT_COUNT] = [
    SlotSpec {
        kind: SlotKind::Singleton(Singleton::Host),
        prompt: "Host   ",
        placeholder: "example.com",
    },
    SlotSpec {
        kind: SlotKind::Singleton(Singleton::Protocol),
        prompt: "HTTP/1.",
        placeholder: "1",
    },
    SlotSpec {
        kind: SlotKind::Singleton(Singleton::Method),
        prompt: "Method ",
        placeholder: "GET",
    },
    SlotSpec {
        kind: SlotKind::Singleton(Singleton::Path),
        prompt: "Path  ",
        placeholder: "/",
    },
    SlotSpec {
        kind: SlotKind::PairKey(Pair::Header),
        prompt: "Header ",
        placeholder: "X-Auth-Token",
    },
    SlotSpec {
        kind: SlotKind::PairValue(Pair::Header),
        prompt: "",
        placeholder: "token value",
    },
    SlotSpec {
        kind: SlotKind::PairKey(Pair::Param),
        prompt: "Param  ",
        placeholder: "products_id",
    },
    SlotSpec {
        kind: SlotKind::PairValue(Pair::Param),
        prompt: "",
        placeholder: "10",
    },
    SlotSpec {
        kind: SlotKind::PairKey(Pair::Cookie),
        prompt: "Cookie ",
        placeholder: "XDEBUG_SESSION",
    },
    SlotSpec {
        kind: SlotKind::PairValue(Pair::Cookie),
        prompt: "",
        placeholder: "debugger",
    },
    SlotSpec {
        kind: SlotKind::PairKey(Pair::Form),
        prompt: "Form   ",
        placeholder: "login",
    },
    SlotSpec {
        kind: SlotKind::PairValue(Pair::Form),
        prompt: "",
        placeholder: "user",
    },
];

pub fn kind_of(slot: usize) -> SlotKind {
    SCHEMA[slot % SLOT_COUNT].kind
}

/// The editable texts of every slot, indexed by ordinal.
#[derive(Debug, Clone)]
pub struct Fields {
    inputs: Vec<TextInput>,
}

impl Default for Fields {
    fn default() -> Self {
        let inputs = SCHEMA
            .iter()
            .map(|spec| match spec.kind {
                SlotKind::Singleton(Singleton::Host) => TextInput::new().with_value("localhost"),
                SlotKind::Singleton(Singleton::Protocol) => TextInput::new()
                    .with_char_limit(1)
                    .with_suggestions(["0", "1"])
                    .with_value("1"),
                SlotKind::Singleton(Singleton::Method) => TextInput::new()
                    .with_suggestions(ALLOWED_METHODS)
                    .with_value("GET"),
                _ => TextInput::new(),
            })
            .collect();
        Fields { inputs }
    }
}

impl Fields {
    pub fn get(&self, slot: usize) -> &TextInput {
        &self.inputs[slot]
    }

    pub fn get_mut(&mut self, slot: usize) -> &mut TextInput {
        &mut self.inputs[slot]
    }

    pub fn text(&self, slot: usize) -> String {
        self.inputs[slot].value()
    }

    pub fn pair_texts(&self, pair: Pair) -> (String, String) {
        (self.text(pair.key_slot()), self.text(pair.value_slot()))
    }

    pub fn reset_pair(&mut self, pair: Pair) {
        self.inputs[pair.key_slot()].reset();
        self.inputs[pair.value_slot()].reset();
    }
}
