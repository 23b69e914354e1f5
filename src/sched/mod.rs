//! Small threading primitives shared by the background loading workers.

pub mod latch;
pub mod unwind;
