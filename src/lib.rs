//! Weighted survey estimation.
//!
//! Turns rows of survey responses into design-consistent estimates of means,
//! proportions and totals, with standard errors from Taylor linearization,
//! the bootstrap or the jackknife, a Kish design-effect adjustment and an
//! optional finite population correction.
//!
//! ```
//! use tally::{weighted_mean, EstimationOptions, Row, Sample};
//!
//! let data: Sample<Row> = Sample::new(vec![
//!     Row::new().with("x", 10).with("w", 1),
//!     Row::new().with("x", 20).with("w", 3),
//! ]);
//! let est = weighted_mean(&data, "x", Some("w"), &EstimationOptions::default()).unwrap();
//! assert_eq!(est.estimate, 17.5);
//! ```

mod display;
mod estimator;
mod resample;
mod sample;
mod statistics;
mod winsorize;

pub use crate::display::EstimateTable;
pub use crate::estimator::*;
pub use crate::resample::*;
pub use crate::sample::*;
pub use crate::statistics::*;
pub use crate::winsorize::{winsorize, Winsorizer};
pub use rand;
