//! Shared crate for KampusLink: the data pipeline (load, aggregate, chart) and
//! the Dioxus views the web and desktop binaries mount.

use dioxus::prelude::*;

pub mod charts;
pub mod core;
pub mod dashboard;
pub mod data;
pub mod export;
pub mod i18n;
pub mod metrics;
pub mod views;

pub mod components {
    pub mod app_navbar;
    pub use app_navbar::register_nav;
    pub use app_navbar::AppNavbar;
    pub use app_navbar::NavBuilder;
}

/// Shared theme stylesheet, linked by the web build and inlined by desktop.
pub const THEME_CSS: Asset = asset!("/assets/theme/main.css");

pub use dashboard::{render, DashboardView};
