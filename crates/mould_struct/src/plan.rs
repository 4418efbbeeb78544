//! Generation plan and the Configuration Resolver.
//!
//! A plan is resolved once per type from four tiers, lowest precedence
//! first:
//!
//! 1. built-in defaults ([`PlanFlags::DEFAULT`]),
//! 2. the plans of the base types, in declaration order,
//! 3. the configuration block declared on the type itself,
//! 4. explicit overrides given at the declaration site.
//!
//! Each tier after the first only touches the keys it specifies; unspecified
//! keys fall through. Base plans are fully resolved, so a later base
//! replaces every key of an earlier one.

use bitflags::bitflags;

bitflags! {
    /// Struct-level generation options.
    #[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
    pub struct PlanFlags: u16 {
        /// Generate the constructor.
        const INIT = 1 << 0;
        /// Generate the textual representation.
        const REPR = 1 << 1;
        /// Generate value equality.
        const EQ = 1 << 2;
        /// Generate lexicographic ordering.
        const ORDER = 1 << 3;
        /// Hash instances even when they are mutable.
        const UNSAFE_HASH = 1 << 4;
        /// Reject field writes after construction.
        const FROZEN = 1 << 5;
        /// Publish the positional field names for pattern matching.
        const MATCH_ARGS = 1 << 6;
        /// Every own field is keyword-only.
        const KW_ONLY = 1 << 7;
        /// Use dense, named storage instead of an attribute map.
        const SLOTS = 1 << 8;
        /// Reserve a weak-reference slot.
        const WEAKREF_SLOT = 1 << 9;
        /// Share storage between equal instances of frozen types.
        const FLYWEIGHT = 1 << 10;
    }
}

impl PlanFlags {
    /// Built-in defaults.
    pub const DEFAULT: PlanFlags = PlanFlags::INIT
        .union(PlanFlags::REPR)
        .union(PlanFlags::EQ)
        .union(PlanFlags::MATCH_ARGS);

    /// Look up a key by its declaration-site name.
    pub fn by_key(key: &str) -> Option<PlanFlags> {
        let flag = match key {
            "init" => PlanFlags::INIT,
            "repr" => PlanFlags::REPR,
            "eq" => PlanFlags::EQ,
            "order" => PlanFlags::ORDER,
            "unsafe_hash" => PlanFlags::UNSAFE_HASH,
            "frozen" => PlanFlags::FROZEN,
            "match_args" => PlanFlags::MATCH_ARGS,
            "kw_only" => PlanFlags::KW_ONLY,
            "slots" => PlanFlags::SLOTS,
            "weakref_slot" => PlanFlags::WEAKREF_SLOT,
            "flyweight" => PlanFlags::FLYWEIGHT,
            _ => return None,
        };
        Some(flag)
    }
}

/// A partial set of options: only keys in `mask` are specified.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
pub struct PlanOverrides {
    mask: PlanFlags,
    values: PlanFlags,
}

impl PlanOverrides {
    /// No keys specified.
    pub fn new() -> Self {
        Self::default()
    }

    /// Specify `flag` as `on`, builder style.
    #[must_use]
    pub fn with(mut self, flag: PlanFlags, on: bool) -> Self {
        self.set(flag, on);
        self
    }

    /// Specify `flag` as `on`.
    pub fn set(&mut self, flag: PlanFlags, on: bool) {
        self.mask |= flag;
        self.values.set(flag, on);
    }

    /// The specified value of a single flag, if any.
    pub fn get(&self, flag: PlanFlags) -> Option<bool> {
        self.mask.contains(flag).then(|| self.values.contains(flag))
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.mask.is_empty()
    }

    /// Overlay the specified keys onto `base`.
    #[inline]
    #[must_use]
    pub fn apply(&self, base: PlanFlags) -> PlanFlags {
        (base - self.mask) | (self.values & self.mask)
    }
}

/// The resolved configuration of one record type.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct GenerationPlan {
    flags: PlanFlags,
}

impl Default for GenerationPlan {
    fn default() -> Self {
        GenerationPlan {
            flags: PlanFlags::DEFAULT,
        }
    }
}

impl GenerationPlan {
    pub fn from_flags(flags: PlanFlags) -> Self {
        GenerationPlan { flags }
    }

    #[inline]
    pub fn flags(&self) -> PlanFlags {
        self.flags
    }

    #[inline]
    pub fn contains(&self, flag: PlanFlags) -> bool {
        self.flags.contains(flag)
    }

    #[inline]
    pub fn init(&self) -> bool {
        self.contains(PlanFlags::INIT)
    }

    #[inline]
    pub fn repr(&self) -> bool {
        self.contains(PlanFlags::REPR)
    }

    #[inline]
    pub fn equality(&self) -> bool {
        self.contains(PlanFlags::EQ)
    }

    #[inline]
    pub fn ordering(&self) -> bool {
        self.contains(PlanFlags::ORDER)
    }

    #[inline]
    pub fn frozen(&self) -> bool {
        self.contains(PlanFlags::FROZEN)
    }

    #[inline]
    pub fn kw_only(&self) -> bool {
        self.contains(PlanFlags::KW_ONLY)
    }

    #[inline]
    pub fn slots(&self) -> bool {
        self.contains(PlanFlags::SLOTS)
    }

    /// Hashable iff `unsafe_hash`, or both `eq` and `frozen`.
    pub fn hashable(&self) -> bool {
        self.contains(PlanFlags::UNSAFE_HASH) || (self.equality() && self.frozen())
    }
}

/// Merge the four tiers into a plan.
///
/// `custom_repr` forces `repr` off: a type that supplies its own
/// representation never gets a generated one.
pub fn resolve<'a>(
    bases: impl IntoIterator<Item = &'a GenerationPlan>,
    block: &PlanOverrides,
    explicit: &PlanOverrides,
    custom_repr: bool,
) -> GenerationPlan {
    let mut flags = PlanFlags::DEFAULT;
    for base in bases {
        flags = base.flags;
    }
    flags = block.apply(flags);
    flags = explicit.apply(flags);
    if custom_repr {
        flags.remove(PlanFlags::REPR);
    }
    GenerationPlan { flags }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn defaults_without_tiers() {
        let plan = resolve([], &PlanOverrides::new(), &PlanOverrides::new(), false);
        assert_eq!(plan.flags(), PlanFlags::DEFAULT);
        assert!(plan.init() && plan.repr() && plan.equality());
        assert!(!plan.ordering() && !plan.frozen() && !plan.slots());
    }

    #[test]
    fn later_tiers_win_per_key() {
        let base = GenerationPlan::from_flags(PlanFlags::DEFAULT | PlanFlags::KW_ONLY);
        let block = PlanOverrides::new()
            .with(PlanFlags::FROZEN, true)
            .with(PlanFlags::ORDER, true);
        let explicit = PlanOverrides::new().with(PlanFlags::ORDER, false);

        let plan = resolve([&base], &block, &explicit, false);
        assert!(plan.kw_only(), "inherited from base");
        assert!(plan.frozen(), "from declared block");
        assert!(!plan.ordering(), "explicit override beats block");
    }

    #[test]
    fn last_base_wins() {
        let a = GenerationPlan::from_flags(PlanFlags::DEFAULT | PlanFlags::SLOTS);
        let b = GenerationPlan::from_flags(PlanFlags::DEFAULT | PlanFlags::FROZEN);
        let plan = resolve([&a, &b], &PlanOverrides::new(), &PlanOverrides::new(), false);
        assert!(plan.frozen());
        assert!(!plan.slots());
    }

    #[test]
    fn custom_repr_suppresses_generated_repr() {
        let explicit = PlanOverrides::new().with(PlanFlags::REPR, true);
        let plan = resolve([], &PlanOverrides::new(), &explicit, true);
        assert!(!plan.repr());
    }

    #[test]
    fn overrides_report_specified_keys() {
        let o = PlanOverrides::new().with(PlanFlags::EQ, false);
        assert_eq!(o.get(PlanFlags::EQ), Some(false));
        assert_eq!(o.get(PlanFlags::INIT), None);
        assert_eq!(o.apply(PlanFlags::DEFAULT), PlanFlags::DEFAULT - PlanFlags::EQ);
    }

    #[test]
    fn hashing_rule() {
        let frozen = GenerationPlan::from_flags(PlanFlags::DEFAULT | PlanFlags::FROZEN);
        assert!(frozen.hashable());
        assert!(!GenerationPlan::default().hashable());
        let unsafe_hash = GenerationPlan::from_flags(PlanFlags::UNSAFE_HASH);
        assert!(unsafe_hash.hashable());
    }

    #[test]
    fn keys_by_name() {
        assert_eq!(PlanFlags::by_key("weakref_slot"), Some(PlanFlags::WEAKREF_SLOT));
        assert_eq!(PlanFlags::by_key("nope"), None);
    }
}
