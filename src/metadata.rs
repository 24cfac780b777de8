pub mod attributes;
pub mod blueprint;
