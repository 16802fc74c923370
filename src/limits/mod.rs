//! Limit calculations
//!
//! - `maco`: three MACO candidates from the worst-case pair
//! - `surface`: swab and per-equipment rinse limits from the lowest MACO

pub mod maco;
pub mod surface;

pub use maco::compute_maco;
pub use surface::{rinse_limit_per_equipment, swab_limit, total_surface_area, total_surface_with_margin};
