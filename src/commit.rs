//! Rules for merging slot texts into the [`RequestDraft`].
//!
//! Every function here has the [`CommitFn`] shape so the focus machine can
//! pick one from its transition table without knowing what it does.

use tracing::debug;

use crate::draft::{correct_header_name, RequestDraft, ALLOWED_METHODS};
use crate::field::{Fields, Pair, HOST, METHOD, PATH, PROTO};
use crate::input::prefix_match;

pub type CommitFn = fn(&mut Fields, &mut RequestDraft);

pub fn commit_host(fields: &mut Fields, draft: &mut RequestDraft) {
    draft.set_host(&fields.text(HOST));
}

pub fn commit_path(fields: &mut Fields, draft: &mut RequestDraft) {
    draft.set_path(&fields.text(PATH));
}

pub fn commit_protocol(fields: &mut Fields, draft: &mut RequestDraft) {
    match fields.text(PROTO).as_str() {
        "0" => draft.set_proto_minor(0),
        "1" => draft.set_proto_minor(1),
        other => {
            debug!(value = other, "protocol rejected");
            fields.get_mut(PROTO).set_value("1");
        }
    }
}

/// First allow-listed method the text is a case-insensitive prefix of.
pub fn match_method(text: &str) -> Option<&'static str> {
    prefix_match(ALLOWED_METHODS, text)
}

pub fn commit_method(fields: &mut Fields, draft: &mut RequestDraft) {
    let text = fields.text(METHOD);
    match match_method(&text) {
        Some(method) => {
            fields.get_mut(METHOD).set_value(method);
            draft.set_method(method);
        }
        None => {
            debug!(value = %text, "method rejected, restoring {}", draft.method());
            fields.get_mut(METHOD).set_value(draft.method());
        }
    }
}

/// Returns the pair texts when both are filled in.
fn filled(fields: &Fields, pair: Pair) -> Option<(String, String)> {
    let (name, value) = fields.pair_texts(pair);
    if name.is_empty() || value.is_empty() {
        None
    } else {
        Some((name, value))
    }
}

pub fn commit_header(fields: &mut Fields, draft: &mut RequestDraft) {
    let slot = Pair::Header.key_slot();
    let corrected = correct_header_name(&fields.text(slot));
    fields.get_mut(slot).set_value(&corrected);

    if let Some((name, value)) = filled(fields, Pair::Header) {
        draft.set_header(&name, &value);
        fields.reset_pair(Pair::Header);
    }
}

pub fn commit_param(fields: &mut Fields, draft: &mut RequestDraft) {
    if let Some((name, value)) = filled(fields, Pair::Param) {
        draft.set_param(&name, &value);
        fields.reset_pair(Pair::Param);
    }
}

pub fn commit_cookie(fields: &mut Fields, draft: &mut RequestDraft) {
    if let Some((name, value)) = filled(fields, Pair::Cookie) {
        if !draft.add_cookie(&name, &value) {
            debug!(%name, "duplicate cookie skipped");
        }
        fields.reset_pair(Pair::Cookie);
    }
}

pub fn commit_form(fields: &mut Fields, draft: &mut RequestDraft) {
    if let Some((name, value)) = filled(fields, Pair::Form) {
        draft.set_form_value(&name, &value);
        fields.reset_pair(Pair::Form);
    }
}

pub fn commit_pair(pair: Pair) -> CommitFn {
    match pair {
        Pair::Header => commit_header,
        Pair::Param => commit_param,
        Pair::Cookie => commit_cookie,
        Pair::Form => commit_form,
    }
}
