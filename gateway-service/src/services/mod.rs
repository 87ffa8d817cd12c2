pub mod aggregator;
pub mod favorites;
pub mod normalize;
pub mod upstream;
pub mod workers;
