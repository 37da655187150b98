pub mod dataset;
pub mod idx;

pub use dataset::Dataset;
pub use idx::{load_dataset, load_inputs, load_labels};
