pub mod market;
pub mod tier;
