//! Top-level facade crate for tally.
//!
//! Re-exports the core types, the counting service and the dashboard relay so
//! users can depend on a single crate.

pub mod core {
    pub use tally_core::*;
}

pub mod counter {
    pub use tally_counter::*;
}

pub mod dashboard {
    pub use tally_dashboard::*;
}
