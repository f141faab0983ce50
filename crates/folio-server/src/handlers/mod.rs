//! HTTP request handlers.

pub(crate) mod config;
pub(crate) mod health;
pub(crate) mod pages;
pub(crate) mod revalidate;
pub(crate) mod sidebar;
