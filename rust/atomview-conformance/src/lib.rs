//! Conformance matrix for atomview accessors.
//!
//! The [`ScenarioMatrix`] crosses storage kinds, view byte orders, slice offsets
//! (alignment classes) and mutability into a set of memory view fixtures, and
//! pairs every fixture with every accessor shape that fits into it. The
//! [`ConformanceSuite`] runs five scenario families over every pairing:
//!
//! 1. read-write round trips through every access mode,
//! 2. type and arity violations through checked dynamic invocation,
//! 3. out-of-bounds indices,
//! 4. misaligned indices,
//! 5. mutation attempts on read-only views.
//!
//! Expected outcomes come from the [`oracle`]; every case and its outcome is
//! reported to a [`ReportSink`].

pub mod config;
mod families;
pub mod fixture;
pub mod matrix;
pub mod oracle;
pub mod scenario;
pub mod sink;
pub mod suite;

pub use config::{Family, SuiteConfig};
pub use fixture::Fixture;
pub use matrix::{Pairing, ScenarioMatrix};
pub use scenario::{Expected, Observed, Outcome, ScenarioCase};
pub use sink::{CollectingSink, FamilyCounts, LogSink, ReportSink, SuiteReport};
pub use suite::ConformanceSuite;
