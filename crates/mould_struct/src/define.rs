//! The definition pipeline entry point.
//!
//! Declaring a record runs Configuration Resolver, Field Collector, Type
//! Generator, Immutability Analyzer (frozen types only) and Slot Compactor
//! (`slots` only), in that order. The compactor re-enters [`build`] with
//! [`Entry::Rebuild`]; a per-thread guard turns any other re-entry for a name
//! already being defined into [`DefineError::RecursiveDefinition`].

use std::cell::RefCell;
use std::sync::Arc;

use mould_types::{ImmutabilityAnalyzer, Name};

use crate::collect::collect;
use crate::compact::compact;
use crate::declare::Declaration;
use crate::generate::{generate, Draft};
use crate::plan::resolve;
use crate::{DefineError, RecordType};

/// How the pipeline was entered.
pub(crate) enum Entry {
    /// A fresh declaration: run every pass.
    Declare(Declaration),
    /// Internal rebuild of a finished draft: construct the raw type only.
    Rebuild(Draft),
}

thread_local! {
    /// Names whose full pipeline is running on this thread.
    static IN_PROGRESS: RefCell<Vec<Name>> = const { RefCell::new(Vec::new()) };
}

/// Marks a name as being defined until dropped.
struct DefinitionGuard {
    name: Name,
}

impl DefinitionGuard {
    fn enter(name: &Name) -> Result<Self, DefineError> {
        IN_PROGRESS.with(|names| {
            let mut names = names.borrow_mut();
            if names.contains(name) {
                return Err(DefineError::RecursiveDefinition {
                    record: name.clone(),
                });
            }
            names.push(name.clone());
            Ok(DefinitionGuard { name: name.clone() })
        })
    }
}

impl Drop for DefinitionGuard {
    fn drop(&mut self) {
        IN_PROGRESS.with(|names| {
            let mut names = names.borrow_mut();
            if let Some(pos) = names.iter().rposition(|n| *n == self.name) {
                names.remove(pos);
            }
        });
    }
}

/// Define a record type.
///
/// Fails without creating anything when any pass rejects the declaration.
#[tracing::instrument(level = "debug", skip_all, fields(record = %decl.name))]
pub fn define(decl: Declaration) -> Result<Arc<RecordType>, DefineError> {
    build(Entry::Declare(decl)).map(Arc::new)
}

pub(crate) fn build(entry: Entry) -> Result<RecordType, DefineError> {
    match entry {
        Entry::Declare(decl) => declare(decl),
        Entry::Rebuild(draft) => Ok(RecordType::from_draft(draft)),
    }
}

fn declare(decl: Declaration) -> Result<RecordType, DefineError> {
    let _guard = DefinitionGuard::enter(&decl.name)?;
    let Declaration {
        name,
        bases,
        fields,
        block,
        overrides,
        slots,
        pre_init,
        repr,
        immutable,
    } = decl;

    // Hooks are looked up like methods: own first, then the first base with one.
    let pre_init = pre_init.or_else(|| bases.iter().find_map(|b| b.pre_init.clone()));
    let repr = repr.or_else(|| bases.iter().find_map(|b| b.repr.clone()));

    let plan = resolve(
        bases.iter().map(|b| b.plan()),
        &block,
        &overrides,
        repr.is_some(),
    );
    tracing::debug!(record = %name, plan = ?plan.flags(), "resolved plan");

    let collected = collect(&name, &fields, &bases, &plan)?;
    let draft = generate(name, bases, collected, plan, slots, pre_init, repr)?;

    if draft.plan.frozen() {
        ImmutabilityAnalyzer::new(&immutable).verify(&draft.shape())?;
        tracing::debug!(record = %draft.name, "verified immutable fields");
    }

    if draft.plan.slots() {
        compact(draft)
    } else {
        Ok(RecordType::from_draft(draft))
    }
}
