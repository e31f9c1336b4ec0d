pub mod panic;
pub mod probe;
