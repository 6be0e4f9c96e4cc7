// Data structures for the charting core

pub mod data;
pub mod dimensions;
pub mod plot_configs;

pub use data::*;
pub use dimensions::*;
pub use plot_configs::*;
