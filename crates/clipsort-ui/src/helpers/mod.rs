// crates/clipsort-ui/src/helpers/mod.rs

pub mod log;
