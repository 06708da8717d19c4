//! Elixir Term Conversion Utilities
//!
//! Converts highlighter state and errors to Elixir terms.

use rustler::{Atom, Encoder, Env, NewBinary, Term};

use crate::error::HighlightError;

// Pre-defined atoms for efficiency - created once at compile time
rustler::atoms! {
    ok,
    error,
    mutex_poisoned,
    invalid_root,
    invalid_pattern,
    invalid_config,
}

/// Convert a string to a binary term (more efficient than .encode())
#[inline]
pub fn str_to_binary<'a>(env: Env<'a>, s: &str) -> Term<'a> {
    let bytes = s.as_bytes();
    let mut binary = NewBinary::new(env, bytes.len());
    binary.as_mut_slice().copy_from_slice(bytes);
    binary.into()
}

/// Convert strings to an Elixir list of binaries - build in reverse order
pub fn strings_to_list<'a>(env: Env<'a>, strings: &[String]) -> Term<'a> {
    let mut list = Term::list_new_empty(env);
    for s in strings.iter().rev() {
        list = list.list_prepend(str_to_binary(env, s));
    }
    list
}

/// `{:ok, value}`
pub fn ok_tuple<'a>(env: Env<'a>, value: impl Encoder) -> Term<'a> {
    (ok(), value).encode(env)
}

/// `{:error, reason}`
pub fn error_tuple<'a>(env: Env<'a>, reason: Atom) -> Term<'a> {
    (error(), reason).encode(env)
}

/// Atom naming a highlighter error
pub fn error_reason(err: &HighlightError) -> Atom {
    match err {
        HighlightError::InvalidRoot(_) => invalid_root(),
        HighlightError::InvalidPattern(_) => invalid_pattern(),
        HighlightError::Config(_) => invalid_config(),
    }
}

/// `{count, index | nil}`
pub fn state_to_term<'a>(env: Env<'a>, count: usize, index: Option<usize>) -> Term<'a> {
    match index {
        Some(i) => (count, i).encode(env),
        None => (count, rustler::types::atom::nil()).encode(env),
    }
}
