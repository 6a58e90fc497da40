// Application layer - session orchestration, config and terminal presentation
// The binary in main.rs only wires these together

pub mod application;
pub mod presentation;
