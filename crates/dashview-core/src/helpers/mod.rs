// crates/dashview-core/src/helpers/mod.rs

pub mod time;
