//! # laser-raster
//!
//! A Rust library for turning raster images into laser engraving toolpaths.
//!
//! ## Features
//!
//! - **Rasterization**: Fit an image to a physical size, quantize it and scan
//!   it in alternating rows into an ordered burn path
//! - **Run merging**: Collapse straight runs of equal intensity
//! - **G-code**: Delta-encoded Marlin laser commands with power mapping
//! - **SVG**: Stroke document with opacity as burn strength
//!
//! ## Example - G-code
//!
//! ```rust,ignore
//! use laser_raster::{Emitter, GCodeEmitter, GCodeOptions, RasterOptions, TracingReporter};
//! use laser_raster::raster::rasterize_image_file;
//! use std::path::Path;
//!
//! let toolpath =
//!     rasterize_image_file(Path::new("photo.png"), &RasterOptions::default(), &TracingReporter)
//!         .unwrap();
//! let emitter = GCodeEmitter::new(GCodeOptions::default());
//! emitter.write(&toolpath, Path::new("photo.gcode")).unwrap();
//! ```

pub mod emit;
pub mod error;
pub mod options;
pub mod output;
pub mod raster;
pub mod report;
pub mod types;

// Re-export commonly used items
pub use emit::{
    Emitter, GCodeEmitter, GCodeOptions, Mapper, OutputMode, PowerRange, SvgDocument, SvgEmitter,
    emitter_for,
};
pub use error::{EngraveError, EngraveResult};
pub use options::{Binarize, RasterOptions};
pub use raster::{Toolpath, rasterize_dynamic_image, rasterize_image, rasterize_image_file};
pub use report::{NullReporter, Reporter, Stage, TracingReporter};
pub use types::{Move, PhysicalSize, PixelPos, Point};
