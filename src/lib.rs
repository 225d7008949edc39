//! Terminal dashboard over a static conflict-event dataset (East Asia
//! Pacific, 2010-2022): load and clean one CSV, derive a fixed set of
//! aggregate views, and render charts plus a filterable Braille map.

pub mod aggregate;
pub mod app;
pub mod data;
pub mod map;
pub mod report;
pub mod ui;
