//! Toolpath serialization
//!
//! A [`Toolpath`] is written either as a G-code command stream or as an SVG
//! stroke document. The mode is picked once and both implementations sit
//! behind the [`Emitter`] trait.

mod gcode;
mod mapper;
mod svg;

use crate::error::EngraveResult;
use crate::output::write_atomic;
use crate::raster::Toolpath;
use std::path::Path;

pub use gcode::{GCodeEmitter, GCodeOptions, align_comments};
pub use mapper::{MappedMove, Mapper, PowerRange};
pub use svg::{Segment, SvgDocument, SvgEmitter};

/// Format millimeters with 3 decimal places, treating -0 as 0
pub(crate) fn f(n: f64) -> String {
    let n = if n.abs() < 0.0005 { 0.0 } else { n };
    format!("{:.3}", n)
}

/// Kind of document an emitter produces
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    /// Line-oriented machine commands (G-code)
    CommandStream,
    /// Declarative vector path document (SVG)
    VectorPath,
}

impl OutputMode {
    /// Quantization depth used when none is requested
    pub fn default_bits(&self) -> u8 {
        match self {
            OutputMode::CommandStream => 8,
            OutputMode::VectorPath => 4,
        }
    }
}

/// Serializes a toolpath into a document
pub trait Emitter {
    fn mode(&self) -> OutputMode;

    /// Render the complete document
    fn render(&self, toolpath: &Toolpath) -> EngraveResult<String>;

    /// Render and publish the document at `path`
    fn write(&self, toolpath: &Toolpath, path: &Path) -> EngraveResult<()> {
        let document = self.render(toolpath)?;
        write_atomic(path, document.as_bytes())
    }
}

/// Emitter for `mode`; `gcode` only applies to the command stream.
pub fn emitter_for(mode: OutputMode, gcode: GCodeOptions) -> Box<dyn Emitter> {
    match mode {
        OutputMode::CommandStream => Box::new(GCodeEmitter::new(gcode)),
        OutputMode::VectorPath => Box::new(SvgEmitter::new()),
    }
}
