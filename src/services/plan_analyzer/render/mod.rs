//! Renderers for a single plan analysis

pub mod terminal;

pub use terminal::{RenderError, TerminalOptions, render};
