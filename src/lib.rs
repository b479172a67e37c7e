//! Regenerates the derived documentation of a dataset catalog (plots and
//! READMEs) for the datasets touched by the latest commit.

pub mod catalog;
pub mod changes;
pub mod color;
pub mod config;
pub mod data;
pub mod error;
pub mod fsutil;
pub mod pipeline;
pub mod plots;
pub mod readme;
pub mod render;
