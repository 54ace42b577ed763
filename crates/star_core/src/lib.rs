//! Deterministic star-system simulation engine.
//!
//! No IO, no wall clock. Given a star aggregate, a design catalog, and a
//! target instant, `simulate` replays the elapsed time in fixed ticks and
//! produces the same end state every time.

mod combat;
mod economy;
mod engine;
mod error;
mod friendly;
mod trace;
mod types;

pub use engine::simulate;
pub use error::SimError;
pub use friendly::{fleets_friendly, is_friendly};
pub use trace::{BufferTrace, NullTrace, TraceSink};
pub use types::*;

#[cfg(any(test, feature = "test-support"))]
pub mod test_fixtures;

#[cfg(test)]
mod tests;
