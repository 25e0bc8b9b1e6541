//! Phase-folded light curves from photometric observation tables.
//!
//! Files are loaded ([`data::loader`]), optionally cleaned, folded against a
//! period ([`phase`]) file by file ([`batch`]), and drawn as one overlaid
//! plot ([`figure`], [`ui::plot`]).

pub mod app;
pub mod batch;
pub mod color;
pub mod config;
pub mod convert;
pub mod data;
pub mod figure;
pub mod phase;
pub mod state;
pub mod ui;
