//! Analysis modules.
//!
//! Four independent, stateless components. Each one consumes the plain
//! types in [`crate::models`] and returns plain data; none of them calls
//! another.

pub mod agreement;
pub mod distribution;
pub mod scores;
pub mod stats;
pub mod timeline;

pub use agreement::*;
pub use distribution::*;
pub use scores::*;
pub use timeline::*;
