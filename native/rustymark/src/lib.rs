//! RustyMark - Fast search term highlighting over markup
//!
//! Layers:
//! - dom: arena document, lenient markup reader and writer
//! - highlight: the Highlighter (apply, remove, navigate, smart scroll)
//! - strategy: sequential and parallel fragment planning
//! - NIFs: a Highlighter held in a ResourceArc, plus a one-shot helper

// The async apply path and the generic viewport/scheduler seams are not
// reachable from the NIFs; tests exercise them
#![allow(dead_code)]

use rustler::{Binary, Encoder, Env, NifResult, ResourceArc, Term};

mod core;
mod dom;
mod error;
mod highlight;
mod resource;
mod strategy;
mod term;

use dom::Document;
use highlight::{Callbacks, HighlightOptions, Highlighter, HighlighterConfig, NoYield, Pattern};
use resource::{HighlighterRef, HighlighterResource, NifHighlighter};

// ============================================================================
// Allocator Configuration
// ============================================================================

#[cfg(feature = "mimalloc")]
#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

// ============================================================================
// Helpers
// ============================================================================

/// Run `f` on the locked highlighter, `{:error, :mutex_poisoned}` otherwise
fn with_highlighter<'a, F>(env: Env<'a>, highlighter: &HighlighterRef, f: F) -> Term<'a>
where
    F: FnOnce(&mut NifHighlighter) -> Term<'a>,
{
    match highlighter.with(f) {
        Ok(term) => term,
        Err(_) => term::error_tuple(env, term::mutex_poisoned()),
    }
}

fn options(case_sensitive: bool, whole_word: bool) -> HighlightOptions {
    HighlightOptions::default()
        .case_sensitive(case_sensitive)
        .whole_word(whole_word)
}

// ============================================================================
// Highlighter Lifecycle
// ============================================================================

/// Parse a markup fragment and bind a highlighter to it
/// Returns {:ok, ref} or {:error, reason}
#[rustler::nif(schedule = "DirtyCpu")]
fn highlighter_new<'a>(env: Env<'a>, markup: Binary<'a>, config_toml: Option<String>) -> NifResult<Term<'a>> {
    let config = match config_toml.as_deref().map(HighlighterConfig::from_toml) {
        None => HighlighterConfig::default(),
        Some(Ok(config)) => config,
        Some(Err(e)) => {
            log::warn!("rejecting highlighter config: {e}");
            return Ok(term::error_tuple(env, term::error_reason(&e)));
        }
    };

    match HighlighterResource::new(markup.as_slice(), config) {
        Ok(resource) => Ok(term::ok_tuple(env, ResourceArc::new(resource))),
        Err(e) => Ok(term::error_tuple(env, term::error_reason(&e))),
    }
}

/// Highlight keywords; returns {:ok, count}
#[rustler::nif(schedule = "DirtyCpu")]
fn highlighter_apply<'a>(
    env: Env<'a>,
    highlighter: HighlighterRef,
    keywords: Vec<String>,
    case_sensitive: bool,
    whole_word: bool,
) -> NifResult<Term<'a>> {
    Ok(with_highlighter(env, &highlighter, |h| {
        let count = h.apply_sync(keywords, options(case_sensitive, whole_word));
        term::ok_tuple(env, count)
    }))
}

/// Highlight a custom pattern; returns {:ok, count} or {:error, :invalid_pattern}
#[rustler::nif(schedule = "DirtyCpu")]
fn highlighter_apply_regex<'a>(
    env: Env<'a>,
    highlighter: HighlighterRef,
    source: &str,
    flags: &str,
) -> NifResult<Term<'a>> {
    let pattern = match Pattern::new(source, flags) {
        Ok(pattern) => pattern,
        Err(e) => return Ok(term::error_tuple(env, term::error_reason(&e))),
    };

    Ok(with_highlighter(env, &highlighter, |h| match h.apply_regex_sync(pattern) {
        Ok(count) => term::ok_tuple(env, count),
        Err(e) => term::error_tuple(env, term::error_reason(&e)),
    }))
}

/// Unwrap every highlight
#[rustler::nif]
fn highlighter_remove<'a>(env: Env<'a>, highlighter: HighlighterRef) -> NifResult<Term<'a>> {
    Ok(with_highlighter(env, &highlighter, |h| {
        h.remove();
        term::ok().encode(env)
    }))
}

// ============================================================================
// Navigation
// ============================================================================

#[rustler::nif]
fn highlighter_next<'a>(env: Env<'a>, highlighter: HighlighterRef) -> NifResult<Term<'a>> {
    Ok(with_highlighter(env, &highlighter, |h| h.next().encode(env)))
}

#[rustler::nif]
fn highlighter_previous<'a>(env: Env<'a>, highlighter: HighlighterRef) -> NifResult<Term<'a>> {
    Ok(with_highlighter(env, &highlighter, |h| h.previous().encode(env)))
}

#[rustler::nif]
fn highlighter_jump_to<'a>(env: Env<'a>, highlighter: HighlighterRef, index: usize) -> NifResult<Term<'a>> {
    Ok(with_highlighter(env, &highlighter, |h| h.jump_to(index).encode(env)))
}

#[rustler::nif]
fn highlighter_jump_to_next_offscreen<'a>(env: Env<'a>, highlighter: HighlighterRef) -> NifResult<Term<'a>> {
    Ok(with_highlighter(env, &highlighter, |h| {
        h.jump_to_next_offscreen().encode(env)
    }))
}

#[rustler::nif]
fn highlighter_jump_to_previous_offscreen<'a>(env: Env<'a>, highlighter: HighlighterRef) -> NifResult<Term<'a>> {
    Ok(with_highlighter(env, &highlighter, |h| {
        h.jump_to_previous_offscreen().encode(env)
    }))
}

// ============================================================================
// Introspection
// ============================================================================

/// Returns {count, index | nil}
#[rustler::nif]
fn highlighter_state<'a>(env: Env<'a>, highlighter: HighlighterRef) -> NifResult<Term<'a>> {
    Ok(with_highlighter(env, &highlighter, |h| {
        term::state_to_term(env, h.match_count(), h.current_index())
    }))
}

/// Text of each highlight, in document order
#[rustler::nif]
fn highlighter_highlights<'a>(env: Env<'a>, highlighter: HighlighterRef) -> NifResult<Term<'a>> {
    Ok(with_highlighter(env, &highlighter, |h| {
        term::strings_to_list(env, &h.highlight_texts())
    }))
}

/// Current markup of the fragment, highlights included
#[rustler::nif]
fn highlighter_to_markup<'a>(env: Env<'a>, highlighter: HighlighterRef) -> NifResult<Term<'a>> {
    Ok(with_highlighter(env, &highlighter, |h| {
        term::str_to_binary(env, &h.tree().inner_markup(h.root()))
    }))
}

// ============================================================================
// One-shot Highlighting
// ============================================================================

/// Parse, highlight and serialize in one call (no resource kept)
/// Returns {count, markup}
#[rustler::nif(schedule = "DirtyCpu")]
fn highlight_markup<'a>(
    env: Env<'a>,
    markup: Binary<'a>,
    keywords: Vec<String>,
    case_sensitive: bool,
    whole_word: bool,
) -> NifResult<Term<'a>> {
    let (doc, body) = Document::parse_fragment(markup.as_slice());
    let mut highlighter = match Highlighter::new(doc, body, HighlighterConfig::default(), Callbacks::default()) {
        Ok(h) => h.with_scheduler(NoYield),
        Err(e) => return Ok(term::error_tuple(env, term::error_reason(&e))),
    };

    let count = highlighter.apply_sync(keywords, options(case_sensitive, whole_word));
    let output = highlighter.tree().inner_markup(body);
    Ok((count, term::str_to_binary(env, &output)).encode(env))
}

// ============================================================================
// NIF Initialization
// ============================================================================

rustler::init!("Elixir.RustyMark.Native");
