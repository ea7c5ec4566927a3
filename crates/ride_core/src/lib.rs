pub mod config;
pub mod eta;
pub mod geo;
pub mod graph;
pub mod matching;
pub mod navigation;
pub mod osrm;
pub mod rating;
pub mod service;
pub mod store;
#[cfg(feature = "test-helpers")]
pub mod test_helpers;
