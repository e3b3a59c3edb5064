#![forbid(unsafe_code)]

//! `drift` runs layout algorithms against a host graph view.
//!
//! Every driver follows the same session lifecycle (`layoutstart`, then `layoutready` on
//! success, then exactly one `layoutstop`) and touches the graph only through
//! [`GraphView`].
//!
//! # Features
//!
//! - `force` (default): stepped, interactive force-directed layout (`drift::force`)
//! - `layered` (default): one-shot layered layout (`drift::layered`)
//! - `remote`: delegate layout to an HTTP layout service (`drift::remote`)

pub use drift_core::*;

#[cfg(feature = "force")]
pub mod force {
    pub use drift_force::*;
}

#[cfg(feature = "layered")]
pub mod layered {
    pub use drift_layered::*;
}

#[cfg(feature = "remote")]
pub mod remote {
    pub use drift_remote::*;
}
