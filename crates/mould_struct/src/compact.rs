//! Slot Compactor: the second definition pass.
//!
//! Replaces attribute-map storage with a fixed set of named slots. The slot
//! set is the field names, plus the weak-reference slot when requested,
//! minus every slot an ancestor already declares.
//!
//! The compacted type is rebuilt through [`build`] with
//! [`Entry::Rebuild`], which constructs the raw type from the finished
//! draft. Collection, resolution and verification already ran for this
//! definition and are not repeated.

use mould_types::Name;

use crate::define::{build, Entry};
use crate::generate::Draft;
use crate::plan::PlanFlags;
use crate::record::{Layout, StateForm};
use crate::{DefineError, RecordType};

/// Slot reserved for weak references.
pub const WEAKREF_SLOT: &str = "__weakref__";

pub(crate) fn compact(mut draft: Draft) -> Result<RecordType, DefineError> {
    if draft.declared_slots {
        return Err(DefineError::SlotsAlreadyDeclared { record: draft.name });
    }

    let inherited = RecordType::inherited_slots(&draft.bases);
    let weakref = draft
        .plan
        .contains(PlanFlags::WEAKREF_SLOT)
        .then(|| Name::new(WEAKREF_SLOT));
    let slots: Vec<Name> = draft
        .fields
        .iter()
        .map(|f| f.name.clone())
        .chain(weakref)
        .filter(|slot| !inherited.contains(slot))
        .collect();

    tracing::debug!(
        record = %draft.name,
        slots = slots.len(),
        inherited = inherited.len(),
        "compacted storage"
    );
    draft.layout = Layout::Slots(slots);

    // Dense storage has no attribute map to save, so frozen types save and
    // restore their field values in declared order.
    if draft.plan.frozen() {
        draft.state_form = StateForm::Ordered;
    }

    build(Entry::Rebuild(draft))
}
