//! Pure decision logic and data records for the synthesis loop.
//!
//! Nothing in this module performs I/O.

pub mod candidate;
pub mod feedback;
pub mod registry;
pub mod report;
