//! Type Generator: the first definition pass.
//!
//! Produces a [`Draft`] with attribute-map storage. Constructor, equality,
//! ordering and representation are driven by the draft's fields and plan at
//! instance level, so generation only validates the combination and fixes
//! the layout.

use std::sync::Arc;

use mould_types::{Name, RecordShape};

use crate::collect::Collected;
use crate::declare::{CustomRepr, PreInit};
use crate::field::{ClassAttr, FieldSpec};
use crate::plan::{GenerationPlan, PlanFlags};
use crate::record::{Layout, StateForm};
use crate::{DefineError, RecordType};

/// A record type that has not been built yet.
#[derive(Clone, Debug)]
pub(crate) struct Draft {
    pub name: Name,
    pub bases: Vec<Arc<RecordType>>,
    pub fields: Vec<FieldSpec>,
    pub class_attrs: Vec<ClassAttr>,
    pub plan: GenerationPlan,
    pub layout: Layout,
    pub state_form: StateForm,
    pub pre_init: Option<PreInit>,
    pub repr: Option<CustomRepr>,
    /// The declaration listed its own slots.
    pub declared_slots: bool,
}

impl Draft {
    /// The annotated fields, as seen by the immutability analyzer.
    pub fn shape(&self) -> RecordShape {
        RecordShape::new(
            self.name.clone(),
            self.fields.iter().map(|f| (f.name.clone(), f.ty.clone())),
        )
    }
}

/// Run the first pass.
///
/// A declaration with hand-written slots gets a slot layout here unless the
/// `slots` option is also on, which the Slot Compactor rejects.
pub(crate) fn generate(
    name: Name,
    bases: Vec<Arc<RecordType>>,
    collected: Collected,
    plan: GenerationPlan,
    declared_slots: Option<Vec<Name>>,
    pre_init: Option<PreInit>,
    repr: Option<CustomRepr>,
) -> Result<Draft, DefineError> {
    if plan.ordering() && !plan.equality() {
        return Err(DefineError::OrderWithoutEq { record: name });
    }
    if plan.contains(PlanFlags::WEAKREF_SLOT) && !plan.slots() {
        return Err(DefineError::WeakrefWithoutSlots { record: name });
    }
    for base in &bases {
        if base.has_fields() && base.plan().frozen() != plan.frozen() {
            return Err(DefineError::FrozenInheritance {
                record: name,
                base: base.name().clone(),
            });
        }
    }

    let declared = declared_slots.is_some();
    let layout = match declared_slots {
        Some(own) if !plan.slots() => {
            let inherited = RecordType::inherited_slots(&bases);
            if let Some(field) = collected
                .fields
                .iter()
                .find(|f| !own.contains(&f.name) && !inherited.contains(&f.name))
            {
                return Err(DefineError::UnslottedField {
                    record: name,
                    field: field.name.clone(),
                });
            }
            Layout::Slots(own.into_iter().filter(|s| !inherited.contains(s)).collect())
        }
        _ => Layout::Map,
    };

    tracing::debug!(
        record = %name,
        plan = ?plan.flags(),
        slotted = matches!(layout, Layout::Slots(_)),
        "generated record"
    );

    Ok(Draft {
        name,
        bases,
        fields: collected.fields,
        class_attrs: collected.class_attrs,
        plan,
        layout,
        state_form: StateForm::Attributes,
        pre_init,
        repr,
        declared_slots: declared,
    })
}
