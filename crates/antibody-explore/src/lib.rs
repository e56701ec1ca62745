pub mod immune;
pub mod rng;
pub mod space;
