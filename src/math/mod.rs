pub mod init;
pub mod vector;

pub use vector::argmax;
