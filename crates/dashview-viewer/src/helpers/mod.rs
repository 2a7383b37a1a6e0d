// crates/dashview-viewer/src/helpers/mod.rs
pub mod log;
