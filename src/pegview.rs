//! Main module for pegview library functionality

pub mod attempt;
pub mod compile_error;
pub mod config;
pub mod error;
pub mod fixture;
pub mod highlight;
pub mod locator;
pub mod text;
pub mod trace;
pub mod trace_render;
pub mod tree;
