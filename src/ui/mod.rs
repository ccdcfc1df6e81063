//! UI module - reusable widgets and the virtualized row list

pub mod components;
pub mod virtual_list;
