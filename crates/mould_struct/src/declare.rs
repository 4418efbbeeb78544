//! Record declarations: the input of the definition pipeline.

use std::fmt;
use std::sync::Arc;

use mould_types::{ImmutableTypes, Name, TypeExpr};

use crate::field::FieldDecl;
use crate::gate::Kwargs;
use crate::plan::{PlanFlags, PlanOverrides};
use crate::{ConstructError, Instance, RecordType};

/// Pre-construction hook: may rewrite the named values before the
/// generated constructor sees them.
#[derive(Clone)]
pub struct PreInit(Arc<dyn Fn(&RecordType, Kwargs) -> Result<Kwargs, ConstructError> + Send + Sync>);

impl PreInit {
    pub fn new(
        f: impl Fn(&RecordType, Kwargs) -> Result<Kwargs, ConstructError> + Send + Sync + 'static,
    ) -> Self {
        PreInit(Arc::new(f))
    }

    #[inline]
    pub(crate) fn call(&self, ty: &RecordType, kwargs: Kwargs) -> Result<Kwargs, ConstructError> {
        (self.0)(ty, kwargs)
    }
}

impl fmt::Debug for PreInit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PreInit(..)")
    }
}

/// A representation supplied by the type itself.
#[derive(Clone)]
pub struct CustomRepr(Arc<dyn Fn(&Instance) -> String + Send + Sync>);

impl CustomRepr {
    pub fn new(f: impl Fn(&Instance) -> String + Send + Sync + 'static) -> Self {
        CustomRepr(Arc::new(f))
    }

    #[inline]
    pub(crate) fn call(&self, instance: &Instance) -> String {
        (self.0)(instance)
    }
}

impl fmt::Debug for CustomRepr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("CustomRepr(..)")
    }
}

/// Everything a record declaration says.
///
/// Built with chained setters, then handed to [`crate::define`] or
/// [`crate::TypeRegistry::define`].
#[derive(Clone, Debug)]
pub struct Declaration {
    pub(crate) name: Name,
    pub(crate) bases: Vec<Arc<RecordType>>,
    pub(crate) fields: Vec<FieldDecl>,
    /// Options declared in the type body.
    pub(crate) block: PlanOverrides,
    /// Options given at the declaration site.
    pub(crate) overrides: PlanOverrides,
    pub(crate) slots: Option<Vec<Name>>,
    pub(crate) pre_init: Option<PreInit>,
    pub(crate) repr: Option<CustomRepr>,
    pub(crate) immutable: ImmutableTypes,
}

impl Declaration {
    pub fn new(name: impl Into<Name>) -> Self {
        Declaration {
            name: name.into(),
            bases: Vec::new(),
            fields: Vec::new(),
            block: PlanOverrides::new(),
            overrides: PlanOverrides::new(),
            slots: None,
            pre_init: None,
            repr: None,
            immutable: ImmutableTypes::new(),
        }
    }

    #[inline]
    pub fn name(&self) -> &Name {
        &self.name
    }

    /// Inherit from `base`. Bases are kept in declaration order.
    #[must_use]
    pub fn base(mut self, base: &Arc<RecordType>) -> Self {
        self.bases.push(Arc::clone(base));
        self
    }

    /// Declare a field.
    #[must_use]
    pub fn field(mut self, field: FieldDecl) -> Self {
        self.fields.push(field);
        self
    }

    /// Declare a field with only a name and type.
    #[must_use]
    pub fn typed(self, name: impl Into<Name>, ty: TypeExpr) -> Self {
        self.field(FieldDecl::new(name, ty))
    }

    /// Set an option in the type body's configuration block.
    #[must_use]
    pub fn config(mut self, flag: PlanFlags, on: bool) -> Self {
        self.block.set(flag, on);
        self
    }

    /// Set an option at the declaration site; beats the configuration block.
    #[must_use]
    pub fn option(mut self, flag: PlanFlags, on: bool) -> Self {
        self.overrides.set(flag, on);
        self
    }

    /// Declare the storage slots by hand.
    #[must_use]
    pub fn slots<N: Into<Name>>(mut self, names: impl IntoIterator<Item = N>) -> Self {
        self.slots = Some(names.into_iter().map(Into::into).collect());
        self
    }

    #[must_use]
    pub fn pre_init(
        mut self,
        f: impl Fn(&RecordType, Kwargs) -> Result<Kwargs, ConstructError> + Send + Sync + 'static,
    ) -> Self {
        self.pre_init = Some(PreInit::new(f));
        self
    }

    /// Supply the representation; disables the generated one.
    #[must_use]
    pub fn repr(mut self, f: impl Fn(&Instance) -> String + Send + Sync + 'static) -> Self {
        self.repr = Some(CustomRepr::new(f));
        self
    }

    /// Treat `ty` as immutable when verifying this declaration.
    #[must_use]
    pub fn immutable(mut self, ty: TypeExpr) -> Self {
        self.immutable.insert(ty);
        self
    }
}
