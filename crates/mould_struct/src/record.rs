//! Record type descriptors.
//!
//! A [`RecordType`] is created once by the definition pipeline and never
//! changes afterwards. Instances hold an `Arc` to it.

use std::fmt;
use std::sync::Arc;

use mould_types::{Name, RecordShape, TypeExpr};
use mould_value::Value;
use parking_lot::Mutex;
use rustc_hash::FxHashSet;

use crate::declare::{CustomRepr, PreInit};
use crate::field::{ClassAttr, FieldSpec};
use crate::generate::Draft;
use crate::intern::Interner;
use crate::plan::{GenerationPlan, PlanFlags};

/// Where instance fields live.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Layout {
    /// Open attribute map; unknown names may be assigned.
    Map,
    /// Fixed storage. Holds the slot names this type declares itself;
    /// slots declared by ancestors are not repeated.
    Slots(Vec<Name>),
}

/// How [`crate::Instance::state`] saves an instance.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum StateForm {
    /// Name to value map.
    Attributes,
    /// Field values in declared order.
    Ordered,
}

/// Storage shared between equal instances of a flyweight type.
type Interned = Mutex<Interner>;

/// A defined record type.
pub struct RecordType {
    name: Name,
    bases: Vec<Arc<RecordType>>,
    fields: Vec<FieldSpec>,
    class_attrs: Vec<ClassAttr>,
    plan: GenerationPlan,
    layout: Layout,
    state_form: StateForm,
    shape: Arc<RecordShape>,
    pub(crate) pre_init: Option<PreInit>,
    pub(crate) repr: Option<CustomRepr>,
    pub(crate) interned: Option<Interned>,
}

impl RecordType {
    pub(crate) fn from_draft(draft: Draft) -> Self {
        let shape = Arc::new(draft.shape());
        let interned = (draft.plan.frozen() && draft.plan.contains(PlanFlags::FLYWEIGHT))
            .then(|| Mutex::new(Interner::new()));
        RecordType {
            name: draft.name,
            bases: draft.bases,
            fields: draft.fields,
            class_attrs: draft.class_attrs,
            plan: draft.plan,
            layout: draft.layout,
            state_form: draft.state_form,
            shape,
            pre_init: draft.pre_init,
            repr: draft.repr,
            interned,
        }
    }

    /// A field-less type that only carries a plan for others to inherit.
    pub(crate) fn root(name: &str, flags: PlanFlags) -> Self {
        let plan = GenerationPlan::from_flags(flags);
        let layout = if plan.slots() {
            Layout::Slots(Vec::new())
        } else {
            Layout::Map
        };
        let state_form = if plan.slots() && plan.frozen() {
            StateForm::Ordered
        } else {
            StateForm::Attributes
        };
        RecordType {
            name: Name::new(name),
            bases: Vec::new(),
            fields: Vec::new(),
            class_attrs: Vec::new(),
            plan,
            layout,
            state_form,
            shape: Arc::new(RecordShape::new(name, std::iter::empty::<(Name, TypeExpr)>())),
            pre_init: None,
            repr: None,
            interned: None,
        }
    }

    // === Descriptor ===

    #[inline]
    pub fn name(&self) -> &Name {
        &self.name
    }

    #[inline]
    pub fn bases(&self) -> &[Arc<RecordType>] {
        &self.bases
    }

    /// Fields in declared order, inherited ones first.
    #[inline]
    pub fn fields(&self) -> &[FieldSpec] {
        &self.fields
    }

    #[inline]
    pub fn has_fields(&self) -> bool {
        !self.fields.is_empty()
    }

    pub fn field(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn field_index(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|f| f.name == name)
    }

    #[inline]
    pub fn plan(&self) -> &GenerationPlan {
        &self.plan
    }

    #[inline]
    pub fn is_frozen(&self) -> bool {
        self.plan.frozen()
    }

    #[inline]
    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    /// Slot names this type declares itself, if it uses fixed storage.
    pub fn slots(&self) -> Option<&[Name]> {
        match &self.layout {
            Layout::Slots(own) => Some(own),
            Layout::Map => None,
        }
    }

    #[inline]
    pub fn state_form(&self) -> StateForm {
        self.state_form
    }

    /// The field annotations, for use as a nested record type.
    #[inline]
    pub fn shape(&self) -> &Arc<RecordShape> {
        &self.shape
    }

    /// This record as a type expression.
    pub fn as_type(&self) -> TypeExpr {
        TypeExpr::Record(Arc::clone(&self.shape))
    }

    pub fn class_attrs(&self) -> &[ClassAttr] {
        &self.class_attrs
    }

    /// Value of a class-scoped attribute.
    pub fn class_attr(&self, name: &str) -> Option<&Value> {
        self.class_attrs
            .iter()
            .find(|a| a.name == name)
            .and_then(|a| a.value.as_ref())
    }

    /// Names usable for positional pattern matching: fields that are not
    /// keyword-only. `None` when `match_args` is off.
    pub fn match_args(&self) -> Option<Vec<&Name>> {
        self.plan.contains(PlanFlags::MATCH_ARGS).then(|| {
            self.fields
                .iter()
                .filter(|f| !f.kw_only())
                .map(|f| &f.name)
                .collect()
        })
    }

    /// Check whether `self` is `other` or inherits from it.
    pub fn is_subtype_of(&self, other: &RecordType) -> bool {
        std::ptr::eq(self, other) || self.bases.iter().any(|b| b.is_subtype_of(other))
    }

    /// Every slot declared by any ancestor of a type with these bases.
    pub(crate) fn inherited_slots(bases: &[Arc<RecordType>]) -> FxHashSet<Name> {
        let mut out = FxHashSet::default();
        let mut stack: Vec<&RecordType> = bases.iter().map(|b| &**b).collect();
        while let Some(ty) = stack.pop() {
            if let Layout::Slots(own) = &ty.layout {
                out.extend(own.iter().cloned());
            }
            stack.extend(ty.bases.iter().map(|b| &**b));
        }
        out
    }
}

impl fmt::Debug for RecordType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RecordType")
            .field("name", &self.name)
            .field(
                "fields",
                &self.fields.iter().map(|f| &f.name).collect::<Vec<_>>(),
            )
            .field("plan", &self.plan.flags())
            .field("layout", &self.layout)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, reason = "Test code unwraps for clarity")]
mod tests;
