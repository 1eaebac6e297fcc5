pub mod system;
pub mod target;
