//! Search session domain module.
//!
//! # Module Structure
//!
//! - `model`: Session identity (`SessionId`) and lifecycle (`SessionState`)

mod model;

pub use model::{SessionId, SessionState};
