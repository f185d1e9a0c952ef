//! SVG path document emission
//!
//! Each burning segment of the toolpath becomes one `<line>` whose stroke
//! opacity is the burn strength. Segments are written in machine
//! coordinates (Y up) inside a group that flips them back for display.

use super::mapper::{Mapper, PowerRange};
use super::{Emitter, OutputMode, f};
use crate::error::{EngraveError, EngraveResult};
use crate::output::write_atomic;
use crate::raster::Toolpath;
use crate::types::{PhysicalSize, Point, WHITE};
use quick_xml::Writer;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, Event};
use std::io::{self, Cursor};
use std::path::Path;

/// Format an opacity with 4 decimal places
fn opacity_str(n: f64) -> String {
    format!("{:.4}", n)
}

/// Straight stroke between two machine-space points
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Segment {
    pub from: Point,
    pub to: Point,
    pub opacity: f64,
}

/// Builder for an SVG document made of straight strokes
#[derive(Debug, Clone)]
pub struct SvgDocument {
    size: PhysicalSize,
    segments: Vec<Segment>,
}

impl SvgDocument {
    pub fn new(size: PhysicalSize) -> Self {
        Self {
            size,
            segments: Vec::new(),
        }
    }

    pub fn add_line(&mut self, from: Point, to: Point, opacity: f64) {
        self.segments.push(Segment {
            from,
            to,
            opacity: opacity.clamp(0.0, 1.0),
        });
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    fn write_events<W: io::Write>(&self, writer: &mut Writer<W>) -> io::Result<()> {
        let w = f(self.size.width_mm);
        let h = f(self.size.height_mm);

        writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), Some("no"))))?;

        let mut svg = BytesStart::new("svg");
        svg.push_attribute(("xmlns", "http://www.w3.org/2000/svg"));
        svg.push_attribute(("width", format!("{}mm", w).as_str()));
        svg.push_attribute(("height", format!("{}mm", h).as_str()));
        svg.push_attribute(("viewBox", format!("0 0 {} {}", w, h).as_str()));
        writer.write_event(Event::Start(svg))?;

        let mut group = BytesStart::new("g");
        group.push_attribute(("id", "engrave-layer"));
        group.push_attribute(("transform", format!("matrix(1 0 0 -1 0 {})", h).as_str()));
        group.push_attribute(("stroke", "#000000"));
        group.push_attribute(("stroke-width", f(self.size.pitch).as_str()));
        group.push_attribute(("stroke-linecap", "square"));
        group.push_attribute(("fill", "none"));
        writer.write_event(Event::Start(group))?;

        for segment in &self.segments {
            let mut line = BytesStart::new("line");
            line.push_attribute(("x1", f(segment.from.x).as_str()));
            line.push_attribute(("y1", f(segment.from.y).as_str()));
            line.push_attribute(("x2", f(segment.to.x).as_str()));
            line.push_attribute(("y2", f(segment.to.y).as_str()));
            line.push_attribute(("stroke-opacity", opacity_str(segment.opacity).as_str()));
            writer.write_event(Event::Empty(line))?;
        }

        writer.write_event(Event::End(BytesEnd::new("g")))?;
        writer.write_event(Event::End(BytesEnd::new("svg")))?;
        Ok(())
    }

    /// Serialize the document
    pub fn to_svg_string(&self) -> EngraveResult<String> {
        let mut writer = Writer::new_with_indent(Cursor::new(Vec::new()), b' ', 2);
        self.write_events(&mut writer)
            .map_err(|e| EngraveError::Encode {
                what: "SVG document",
                reason: e.to_string(),
            })?;
        String::from_utf8(writer.into_inner().into_inner()).map_err(|e| EngraveError::Encode {
            what: "SVG document",
            reason: e.to_string(),
        })
    }

    /// Serialize and publish the document at `path`
    pub fn save(&self, path: &Path) -> EngraveResult<()> {
        write_atomic(path, self.to_svg_string()?.as_bytes())
    }
}

/// Emits the toolpath as an SVG stroke document
#[derive(Debug, Clone, Copy, Default)]
pub struct SvgEmitter;

impl SvgEmitter {
    pub fn new() -> Self {
        Self
    }

    /// Build the stroke document for `toolpath`.
    ///
    /// Segments that do not burn (white, or zero length) are left out.
    pub fn document(&self, toolpath: &Toolpath) -> SvgDocument {
        let mapper = Mapper::new(&toolpath.size, PowerRange::default());
        let mut doc = SvgDocument::new(toolpath.size);

        for pair in toolpath.moves.windows(2) {
            let (prev, current) = (&pair[0], &pair[1]);
            if current.intensity == WHITE || prev.pixel == current.pixel {
                continue;
            }
            let opacity = (WHITE - current.intensity) as f64 / 255.0;
            doc.add_line(
                mapper.position(prev.physical),
                mapper.position(current.physical),
                opacity,
            );
        }

        doc
    }
}

impl Emitter for SvgEmitter {
    fn mode(&self) -> OutputMode {
        OutputMode::VectorPath
    }

    fn render(&self, toolpath: &Toolpath) -> EngraveResult<String> {
        self.document(toolpath).to_svg_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_document() {
        let doc = SvgDocument::new(PhysicalSize::from_samples(20, 10, 0.5));
        let svg = doc.to_svg_string().unwrap();
        assert!(svg.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"no\"?>"));
        assert!(svg.contains("width=\"10.000mm\""));
        assert!(svg.contains("height=\"5.000mm\""));
        assert!(svg.contains("viewBox=\"0 0 10.000 5.000\""));
        assert!(svg.contains("matrix(1 0 0 -1 0 5.000)"));
        assert!(!svg.contains("<line"));
    }

    #[test]
    fn test_add_line_clamps_opacity() {
        let mut doc = SvgDocument::new(PhysicalSize::from_samples(1, 1, 1.0));
        doc.add_line(Point::new(0.0, 0.0), Point::new(1.0, 0.0), 1.5);
        assert_eq!(doc.len(), 1);
        assert_eq!(doc.segments()[0].opacity, 1.0);

        let svg = doc.to_svg_string().unwrap();
        assert!(svg.contains(
            "<line x1=\"0.000\" y1=\"0.000\" x2=\"1.000\" y2=\"0.000\" stroke-opacity=\"1.0000\"/>"
        ));
    }
}
