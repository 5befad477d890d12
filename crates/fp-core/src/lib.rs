//! fp-core: room-connectivity layouts for dungeon floors
//!
//! Generation is pure: it reads parameters, draws from a caller-supplied
//! random stream and returns a [`layout::Map`]. The only I/O is the
//! optional diagnostic dump and JSON config loading.

pub mod error;
pub mod layout;

mod rng;

pub use error::LayoutError;
pub use layout::{generate_layout, LayoutGenerationParams, LayoutGenerator, Map};
pub use rng::{FloorRng, RandomSource};
