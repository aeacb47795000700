//! Character relationship graphs: parsing, force-directed layout and the
//! hover interaction model behind the viewer.

pub mod config;
pub mod error;
pub mod geometry;
pub mod interaction;
pub mod logging;
pub mod model;
pub mod physics;
pub mod scene;
pub mod util;
