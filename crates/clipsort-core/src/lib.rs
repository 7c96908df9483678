// crates/clipsort-core/src/lib.rs
//
// Pure session logic — no egui, no ffmpeg, no runtime handles.
// clipsort-media and clipsort-ui both depend on this crate; it depends
// on neither.

pub mod commands;
pub mod config;
pub mod helpers;
pub mod keymap;
pub mod media_types;
pub mod session;
