pub mod engine;
pub mod expression;
pub mod ffi;
pub mod serialization;
