//! Portside - terminal console for remote container hosts
//!
//! Lists a node's containers with reachable URLs for their published ports
//! and drives start, stop, restart and delete through a console server API.

pub mod api;
pub mod app;
pub mod config;
pub mod console;
pub mod core;
pub mod state;
pub mod ui;
pub mod validation;
