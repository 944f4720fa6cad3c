//! # Pricebook
//!
//! Two collections of named, priced items that share one addressing model.
//!
//! ## Design Principles
//!
//! - **Three ways in**: every element is reachable by current position, by
//!   the insertion id stamped on it when it was added, and by name
//! - **Ids never move**: removal and sorting carry each id with its element;
//!   an id is never reissued by the same container
//! - **Single-Writer**: no locks; views borrow the container, so it cannot
//!   change underneath them
//! - **Fail fast**: a failed operation leaves the container as it was
//!
//! ## Architecture
//!
//! ```text
//! [ArrayContainer] --+                    +--> [BinaryCodec] --> file
//!                    +--> [Query views] --+
//! [LinkedContainer] -+   (reverse, filter, sorted, find)
//!        |
//!     [Arena]
//! ```

pub mod error;
pub mod item;
pub mod wire;
pub mod arena;
pub mod array;
pub mod linked;
pub mod query;
pub mod codec;
pub mod goods;

// Re-exports for convenience
pub use error::{Error, Result};
pub use item::{Encode, InsertionId, Item};
pub use array::ArrayContainer;
pub use linked::LinkedContainer;
pub use query::{FindAll, Query, View};
pub use codec::{deserialize, serialize, Decode, Decoder, Registry};
pub use goods::{Field, Goods};

/// Crate version, for log lines and `--version`
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
