use atomview::{ByteOrder, CallConvention, Mutability, StorageKind};
use atomview_common::{Result, verify_arg};

/// A family of scenarios run for every view/accessor pairing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Family {
    /// Values written through every mode read back bit for bit.
    ReadWrite,
    /// Dynamic calls with wrong argument types, arity or result type fail.
    TypeNegative,
    /// Indices outside the valid window fail without touching memory.
    Bounds,
    /// Misaligned indices fail for every mode except plain get and set.
    Alignment,
    /// Mutating modes fail on read-only views; reads succeed.
    ReadOnly,
}

impl Family {
    /// All families, in the order the suite runs them.
    pub const ALL: [Family; 5] = [
        Family::ReadWrite,
        Family::TypeNegative,
        Family::Bounds,
        Family::Alignment,
        Family::ReadOnly,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Family::ReadWrite => "read-write",
            Family::TypeNegative => "type-negative",
            Family::Bounds => "bounds",
            Family::Alignment => "alignment",
            Family::ReadOnly => "read-only",
        }
    }

    /// Returns `true` if the family runs against views of the given mutability.
    pub fn applies_to(self, mutability: Mutability) -> bool {
        match self {
            Family::ReadWrite => mutability == Mutability::ReadWrite,
            Family::ReadOnly => mutability == Mutability::ReadOnly,
            Family::TypeNegative | Family::Bounds | Family::Alignment => true,
        }
    }
}

impl std::fmt::Display for Family {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Configuration of a conformance suite run.
#[derive(Debug, Clone)]
pub struct SuiteConfig {
    /// Capacity in bytes of every fixture view.
    pub capacity: usize,

    /// Offsets at which fixture views are sliced out of their allocation. The
    /// offset modulo 8 becomes the view's alignment origin.
    pub slice_offsets: Vec<usize>,

    /// Storage kinds to allocate fixtures from.
    pub storage_kinds: Vec<StorageKind>,

    /// Byte orders declared by the fixture views.
    pub view_orders: Vec<ByteOrder>,

    /// Whether to add a read-only fixture for every read-write one.
    pub include_read_only: bool,

    /// Attempts granted to a weak compare-and-set before it is considered to
    /// have failed.
    pub weak_cas_attempts: usize,

    /// Calling conventions exercised by the type-negative family.
    pub conventions: Vec<CallConvention>,

    /// Families to run; they always run in [`Family::ALL`] order.
    pub families: Vec<Family>,
}

impl SuiteConfig {
    pub const DEFAULT_WEAK_CAS_ATTEMPTS: usize = 10;

    pub fn verify(&self) -> Result<()> {
        verify_arg!(weak_cas_attempts, self.weak_cas_attempts > 0);
        verify_arg!(storage_kinds, !self.storage_kinds.is_empty());
        verify_arg!(view_orders, !self.view_orders.is_empty());
        verify_arg!(slice_offsets, !self.slice_offsets.is_empty());
        Ok(())
    }

    /// Returns `true` if the family is enabled.
    pub fn runs(&self, family: Family) -> bool {
        self.families.contains(&family)
    }
}

impl Default for SuiteConfig {
    fn default() -> Self {
        SuiteConfig {
            capacity: 24,
            slice_offsets: vec![0, 1, 2, 4],
            storage_kinds: StorageKind::ALL.to_vec(),
            view_orders: ByteOrder::ALL.to_vec(),
            include_read_only: true,
            weak_cas_attempts: Self::DEFAULT_WEAK_CAS_ATTEMPTS,
            conventions: CallConvention::ALL.to_vec(),
            families: Family::ALL.to_vec(),
        }
    }
}
