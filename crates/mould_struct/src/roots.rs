//! Root record types that user records inherit configuration from.
//!
//! Roots have no fields, so deriving from them never triggers the frozen
//! inheritance check; they only contribute their plan.

use std::sync::{Arc, OnceLock};

use crate::plan::PlanFlags;
use crate::RecordType;

static STRUCTURE: OnceLock<Arc<RecordType>> = OnceLock::new();
static FROZEN_STRUCTURE: OnceLock<Arc<RecordType>> = OnceLock::new();

/// Keyword-only records.
pub fn structure() -> Arc<RecordType> {
    Arc::clone(STRUCTURE.get_or_init(|| {
        Arc::new(RecordType::root(
            "Structure",
            PlanFlags::DEFAULT | PlanFlags::KW_ONLY,
        ))
    }))
}

/// Keyword-only, frozen records with dense storage.
pub fn frozen_structure() -> Arc<RecordType> {
    Arc::clone(FROZEN_STRUCTURE.get_or_init(|| {
        Arc::new(RecordType::root(
            "FrozenStructure",
            PlanFlags::DEFAULT | PlanFlags::KW_ONLY | PlanFlags::FROZEN | PlanFlags::SLOTS,
        ))
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roots_are_shared() {
        assert!(Arc::ptr_eq(&structure(), &structure()));
        assert!(structure().plan().kw_only());
        let frozen = frozen_structure();
        assert!(frozen.is_frozen() && frozen.plan().slots());
        assert!(!frozen.has_fields());
    }
}
