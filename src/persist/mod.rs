pub mod codec;
pub mod manifest;

pub use codec::{load, save, SavePolicy};
pub use manifest::Manifest;
