use atomview::{Accessor, AccessorFactory, Mutability};
use atomview_common::Result;
use itertools::iproduct;

use crate::{config::SuiteConfig, fixture::Fixture};

/// A fixture paired with an accessor whose elements fit into it.
#[derive(Debug, Clone, Copy)]
pub struct Pairing<'a> {
    pub fixture: &'a Fixture,
    pub accessor: Accessor,
}

/// The cross product of fixture configurations and accessor shapes.
#[derive(Debug)]
pub struct ScenarioMatrix {
    fixtures: Vec<Fixture>,
    accessors: Vec<Accessor>,
}

impl ScenarioMatrix {
    /// Builds one fixture per `storage kind x view byte order x slice offset x
    /// mutability`, in that nesting order.
    pub fn new(config: &SuiteConfig) -> Result<ScenarioMatrix> {
        config.verify()?;
        let mutabilities: &[Mutability] = if config.include_read_only {
            &[Mutability::ReadWrite, Mutability::ReadOnly]
        } else {
            &[Mutability::ReadWrite]
        };

        let fixtures = iproduct!(
            config.storage_kinds.iter().copied(),
            config.view_orders.iter().copied(),
            config.slice_offsets.iter().copied(),
            mutabilities.iter().copied()
        )
        .map(|(kind, order, offset, mutability)| {
            Fixture::new(kind, order, offset, mutability, config.capacity)
        })
        .collect::<Result<Vec<_>>>()?;

        let accessors = AccessorFactory::descriptors()
            .filter(|d| d.width <= config.capacity)
            .map(|d| AccessorFactory::build(d.width, d.kind, d.byte_order))
            .collect::<Result<Vec<_>>>()?;

        log::debug!(
            "scenario matrix: {} fixtures x {} accessors",
            fixtures.len(),
            accessors.len()
        );
        Ok(ScenarioMatrix {
            fixtures,
            accessors,
        })
    }

    pub fn fixtures(&self) -> &[Fixture] {
        &self.fixtures
    }

    pub fn accessors(&self) -> &[Accessor] {
        &self.accessors
    }

    /// Every pairing, fixture-major.
    pub fn pairings(&self) -> impl Iterator<Item = Pairing<'_>> {
        iproduct!(self.fixtures.iter(), self.accessors.iter().copied())
            .map(|(fixture, accessor)| Pairing { fixture, accessor })
    }

    /// Number of pairings.
    pub fn len(&self) -> usize {
        self.fixtures.len() * self.accessors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use atomview::{ByteOrder, StorageKind};

    #[test]
    fn test_default_matrix_shape() {
        let matrix = ScenarioMatrix::new(&SuiteConfig::default()).unwrap();
        assert_eq!(matrix.fixtures().len(), 3 * 2 * 4 * 2);
        assert_eq!(matrix.accessors().len(), 12);
        assert_eq!(matrix.pairings().count(), matrix.len());
    }

    #[test]
    fn test_fixture_order_and_origins() {
        let config = SuiteConfig {
            storage_kinds: vec![StorageKind::HeapBuffer],
            view_orders: vec![ByteOrder::LittleEndian],
            slice_offsets: vec![0, 5, 9],
            include_read_only: false,
            ..Default::default()
        };
        let matrix = ScenarioMatrix::new(&config).unwrap();
        let origins = matrix
            .fixtures()
            .iter()
            .map(|f| f.descriptor().alignment_origin)
            .collect::<Vec<_>>();
        assert_eq!(origins, vec![0, 5, 1]);
        assert!(matrix.fixtures().iter().all(|f| !f.view().is_read_only()));
    }

    #[test]
    fn test_small_capacity_skips_wide_accessors() {
        let config = SuiteConfig {
            capacity: 3,
            ..Default::default()
        };
        let matrix = ScenarioMatrix::new(&config).unwrap();
        assert!(matrix.accessors().iter().all(|a| a.width() <= 2));
        assert_eq!(matrix.accessors().len(), 4);
    }
}
