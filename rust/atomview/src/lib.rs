//! Typed atomic accessors over byte-addressable memory views.
//!
//! A [`MemoryView`] is a contiguous byte region allocated by one of the
//! [`StorageKind`]s. An [`Accessor`], built by the [`AccessorFactory`] for a given
//! element width, kind and byte order, reads and writes elements of a view
//! through any of the [`AccessMode`]s: plain, opaque, acquire/release, volatile,
//! compare-and-set, weak compare-and-set and read-modify-write. The [`fence`]
//! module provides standalone memory fences.

pub mod accessor;
mod atomic;
pub mod byte_order;
pub mod descriptor;
pub mod factory;
pub mod fence;
pub mod invoke;
pub mod mode;
pub mod policy;
pub mod storage;
pub mod typed;
pub mod value;
pub mod view;

pub use accessor::Accessor;
pub use byte_order::ByteOrder;
pub use descriptor::AccessDescriptor;
pub use factory::AccessorFactory;
pub use invoke::{Arg, CallConvention, invoke};
pub use mode::{
    AccessMode, AccessModeInfo, AccessModeType, AccessType, MemoryOrdering, ParamType, UpdateOp,
};
pub use storage::{StorageKind, StorageProvider};
pub use typed::TypedAccessor;
pub use value::{Element, ElementKind, Value, ValueType};
pub use view::{MemoryView, Mutability, ViewDescriptor};

pub use atomview_common::{Error, ErrorClass, ErrorKind, Result};
