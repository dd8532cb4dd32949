pub mod scenario;
pub mod util;

pub use util::{journey_rng, split_csv};
