//! Widgets drawn by the shell. Each is a free `render` function over the
//! view state.

pub mod debug_toolbar;
pub mod details;
pub mod fmt;
pub mod help;
pub mod monitor;
pub mod nodes;
pub mod status;
pub mod terminal;
