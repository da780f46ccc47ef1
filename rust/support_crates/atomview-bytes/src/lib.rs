//! Byte storage for atomview memory views: aligned heap vectors, word buffers and
//! the shared, sliceable region type through which all view memory is accessed.

pub mod align;
pub mod buffer;
pub mod region;
pub mod words;

pub use buffer::AlignedByteVec;
pub use region::SharedRegion;
pub use words::WordBuffer;
