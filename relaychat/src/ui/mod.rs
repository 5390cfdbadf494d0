// relaychat/src/ui/mod.rs
//! Terminal output for the relaychat CLI.

pub mod render;
