//! Energy-balance engine: formulas, goal resolution, and daily/monthly
//! summaries over meal, exercise and weight logs.

pub mod buckets;
pub mod csv_import;
pub mod daily;
pub mod energy;
pub mod goals;
pub mod insights;
pub mod logbook;
pub mod models;
pub mod monthly;
