use crate::commit::{self, CommitFn};
use crate::draft::RequestDraft;
use crate::field::{kind_of, Fields, Singleton, SlotKind, SLOT_COUNT};
use crate::input::TextInput;

/// What happens to a slot's text when the user moves on from it.
#[derive(Clone, Copy)]
pub struct Transition {
    /// Runs before any forward move away from the slot.
    pub pre_advance: Option<CommitFn>,
    /// Runs on an explicit confirm, before the forward move.
    pub confirm: Option<CommitFn>,
}

pub fn transition(kind: SlotKind) -> Transition {
    match kind {
        SlotKind::Singleton(Singleton::Host) => Transition {
            pre_advance: None,
            confirm: Some(commit::commit_host),
        },
        SlotKind::Singleton(Singleton::Path) => Transition {
            pre_advance: None,
            confirm: Some(commit::commit_path),
        },
        SlotKind::Singleton(Singleton::Protocol) => Transition {
            pre_advance: Some(commit::commit_protocol),
            confirm: None,
        },
        SlotKind::Singleton(Singleton::Method) => Transition {
            pre_advance: Some(commit::commit_method),
            confirm: None,
        },
        SlotKind::PairKey(pair) | SlotKind::PairValue(pair) => Transition {
            pre_advance: None,
            confirm: Some(commit::commit_pair(pair)),
        },
    }
}

/// Tracks the focused slot and owns the slot texts.
#[derive(Debug, Clone, Default)]
pub struct FocusMachine {
    fields: Fields,
    focused: usize,
}

impl FocusMachine {
    pub fn focused(&self) -> usize {
        self.focused
    }

    pub fn fields(&self) -> &Fields {
        &self.fields
    }

    pub fn fields_mut(&mut self) -> &mut Fields {
        &mut self.fields
    }

    pub fn focused_input(&mut self) -> &mut TextInput {
        self.fields.get_mut(self.focused)
    }

    pub fn advance(&mut self, draft: &mut RequestDraft) {
        if let Some(commit) = transition(kind_of(self.focused)).pre_advance {
            commit(&mut self.fields, draft);
        }
        self.focused = (self.focused + 1) % SLOT_COUNT;
    }

    pub fn retreat(&mut self) {
        self.focused = (self.focused + SLOT_COUNT - 1) % SLOT_COUNT;
    }

    pub fn confirm(&mut self, draft: &mut RequestDraft) {
        if let Some(commit) = transition(kind_of(self.focused)).confirm {
            commit(&mut self.fields, draft);
        }
        self.advance(draft);
    }

    /// Puts `text` into `slot` and runs that slot's commit logic as if the
    /// user had typed it and confirmed. Focus does not move.
    pub fn seed(&mut self, slot: usize, text: &str, draft: &mut RequestDraft) {
        self.fields.get_mut(slot).set_value(text);
        let t = transition(kind_of(slot));
        if let Some(commit) = t.confirm.or(t.pre_advance) {
            commit(&mut self.fields, draft);
        }
    }
}
