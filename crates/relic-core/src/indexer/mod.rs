pub mod filesystem;
pub mod idl;
pub mod patterns;
pub mod pipeline;
pub mod routing;
pub mod unit;
