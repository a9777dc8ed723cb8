//! UI components

pub mod container_list;
pub mod detail_panel;
pub mod dialogs;

pub use container_list::{ContainerListWidget, EMPTY_LIST_TEXT};
pub use detail_panel::ContainerDetailPanel;
