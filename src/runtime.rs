pub mod eval;
pub mod preset;
pub mod value;
