//! UI module - display-only rendering units

pub mod components;
