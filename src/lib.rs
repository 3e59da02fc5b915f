//! Admin console core for the student, senior and donor welfare program.
//!
//! Every list page runs through [`list::ListController`]: it fetches a
//! collection from a [`source::DataSource`], derives stats, filters on a
//! free-text query and pages the result.

pub mod aggregate;
pub mod auth;
pub mod config;
pub mod dataset;
pub mod error;
pub mod filter;
pub mod list;
pub mod logging;
pub mod models;
pub mod pagination;
pub mod report;
pub mod selection;
pub mod source;
pub mod status;
pub mod store;
