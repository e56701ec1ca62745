pub mod affinity;
pub mod coverage;
pub mod driver;
pub mod population;
