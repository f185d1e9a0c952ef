//! Marlin laser G-code emission
//!
//! The document is a fixed preamble, an optional locate sequence, the
//! delta-encoded engraving body and a fixed finale. Every command that
//! carries a comment is column-aligned to the widest command in the
//! document.

use super::mapper::{Mapper, PowerRange};
use super::{Emitter, OutputMode, f};
use crate::error::{EngraveError, EngraveResult};
use crate::raster::Toolpath;
use crate::types::Point;

/// Options for G-code generation
#[derive(Debug, Clone)]
pub struct GCodeOptions {
    /// Feed rate while engraving (mm/min)
    pub speed: u32,
    /// Feed rate for positioning moves with the laser off (mm/min)
    pub travel_speed: u32,
    /// Laser power bounds
    pub power: PowerRange,
    /// Audible marker cycles played before burning starts
    pub marker_cycles: u32,
    /// Emit the focus/locate sequence that traces the burn area
    pub locate: bool,
    /// Extra comment lines placed after the title (without the `;`)
    pub header: Vec<String>,
}

impl Default for GCodeOptions {
    fn default() -> Self {
        Self {
            speed: 1000,
            travel_speed: 3000,
            power: PowerRange::default(),
            marker_cycles: 16,
            locate: true,
            header: Vec::new(),
        }
    }
}

impl GCodeOptions {
    pub fn validate(&self) -> EngraveResult<()> {
        if self.speed == 0 {
            return Err(EngraveError::invalid_parameter(
                "speed",
                self.speed,
                "burn speed must be positive",
            ));
        }
        if self.travel_speed == 0 {
            return Err(EngraveError::invalid_parameter(
                "travel_speed",
                self.travel_speed,
                "travel speed must be positive",
            ));
        }
        self.power.validate()
    }
}

/// Fixed-point key at the emitted precision, so that two positions which
/// print identically are treated as identical.
fn key(n: f64) -> i64 {
    (n * 1000.0).round() as i64
}

/// Machine state as last written to the document
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct MachineState {
    x: i64,
    y: i64,
    power: u8,
}

impl MachineState {
    fn at(position: Point, power: u8) -> Self {
        Self {
            x: key(position.x),
            y: key(position.y),
            power,
        }
    }
}

/// Split a document line into command and comment. Comment-only and blank
/// lines yield `None`.
fn split_command(line: &str) -> Option<(&str, Option<&str>)> {
    let trimmed = line.trim();
    if trimmed.is_empty() || trimmed.starts_with(';') {
        return None;
    }
    match trimmed.split_once(';') {
        Some((command, comment)) => Some((command.trim_end(), Some(comment.trim()))),
        None => Some((trimmed, None)),
    }
}

/// Align trailing comments to the widest command in `lines`.
pub fn align_comments(lines: &[String]) -> Vec<String> {
    let width = lines
        .iter()
        .filter_map(|line| split_command(line))
        .map(|(command, _)| command.len())
        .max()
        .unwrap_or(0);

    lines
        .iter()
        .map(|line| match split_command(line) {
            Some((command, Some(comment))) => format!("{:<width$} ; {}", command, comment),
            Some((command, None)) => command.to_string(),
            None => line.clone(),
        })
        .collect()
}

/// Append `cycles` two-tone beeps
fn push_beeps(
    lines: &mut Vec<String>,
    low: u32,
    high: u32,
    millis: u32,
    cycles: u32,
    comment: &str,
) {
    for i in 0..cycles {
        if i == 0 && !comment.is_empty() {
            lines.push(format!("M300 S{} P{} ; {}", low, millis, comment));
        } else {
            lines.push(format!("M300 S{} P{}", low, millis));
        }
        lines.push(format!("M300 S{} P{}", high, millis));
    }
}

/// Emits Marlin laser-mode G-code
#[derive(Debug, Clone, Default)]
pub struct GCodeEmitter {
    options: GCodeOptions,
}

impl GCodeEmitter {
    pub fn new(options: GCodeOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &GCodeOptions {
        &self.options
    }

    fn push_preamble(&self, lines: &mut Vec<String>) {
        lines.push("; Init Marlin Laser code".to_string());
        lines.push(format!(
            "; Built by {} {}",
            env!("CARGO_PKG_NAME"),
            env!("CARGO_PKG_VERSION")
        ));
        for comment in &self.options.header {
            if comment.is_empty() {
                lines.push(";".to_string());
            } else {
                lines.push(format!("; {}", comment));
            }
        }
        lines.push("M05 S0 ; Power laser off".to_string());
        push_beeps(lines, 440, 880, 150, 2, "Notify start");
        lines.push("G90 ; Set absolute positioning".to_string());
        lines.push("G28 ; Homing".to_string());
        lines.push("G21 ; Set millimeters".to_string());
        lines.push("M400".to_string());
    }

    fn push_locate(&self, lines: &mut Vec<String>, width_mm: f64, height_mm: f64) {
        lines.push(String::new());
        push_beeps(lines, 660, 330, 50, 1, "");
        lines.push(format!(
            "G93 X{} Y{} I0 J0 F5000 S1 ; Focus laser",
            f(width_mm / 2.0),
            f(height_mm / 2.0)
        ));
        push_beeps(lines, 660, 330, 50, 1, "");
        lines.push(format!(
            "G93 X0 Y0 I{} J{} F5000 S1 ; Locate burning area",
            f(width_mm),
            f(height_mm)
        ));
    }

    fn push_burn_start(&self, lines: &mut Vec<String>) {
        lines.push(String::new());
        lines.push(format!(
            "G1 X0 Y0 S0 F{} ; Move to origin",
            self.options.travel_speed
        ));
        push_beeps(
            lines,
            660,
            1320,
            150,
            self.options.marker_cycles,
            "Start burning",
        );
        lines.push("M400".to_string());
    }

    /// Delta-encoded engraving moves.
    ///
    /// Each `G1` carries only the axes and power that differ from the last
    /// emitted state; moves that change nothing are dropped.
    fn push_body(&self, lines: &mut Vec<String>, toolpath: &Toolpath) {
        lines.push(String::new());
        lines.push("; Engraving code".to_string());

        let mapper = Mapper::new(&toolpath.size, self.options.power);
        let Some(first) = toolpath.moves.first().map(|m| mapper.map(m)) else {
            return;
        };

        lines.push(format!(
            "G1 X{} Y{} F{} S0 ; Move to start",
            f(first.position.x),
            f(first.position.y),
            self.options.travel_speed
        ));
        lines.push(format!("G1 F{} ; Set burn speed", self.options.speed));
        lines.push(String::new());

        let mut last = MachineState::at(first.position, 0);
        for m in &toolpath.moves {
            let mapped = mapper.map(m);
            let current = MachineState::at(mapped.position, mapped.power);
            if current == last {
                continue;
            }

            let mut line = String::from("G1");
            if current.x != last.x {
                line.push_str(&format!(" X{}", f(mapped.position.x)));
            }
            if current.y != last.y {
                line.push_str(&format!(" Y{}", f(mapped.position.y)));
            }
            if current.power != last.power {
                line.push_str(&format!(" S{}", current.power));
            }
            lines.push(line);
            last = current;
        }
    }

    fn push_finale(&self, lines: &mut Vec<String>) {
        lines.push(String::new());
        lines.push("; Finalize Marlin Laser code".to_string());
        lines.push("G1 X0 Y0 S0 ; Home laser head".to_string());
        lines.push("M84 ; Disable motors".to_string());
        lines.push("M400 ; Wait till moves are finished".to_string());
        lines.push("M05 S0 ; Power off laser".to_string());
        push_beeps(lines, 660, 1320, 150, 4, "Notify end of job");
    }

    /// Document lines before alignment
    pub fn lines(&self, toolpath: &Toolpath) -> EngraveResult<Vec<String>> {
        self.options.validate()?;

        let mut lines = Vec::with_capacity(toolpath.moves.len() + 64);
        self.push_preamble(&mut lines);
        if self.options.locate {
            self.push_locate(&mut lines, toolpath.size.width_mm, toolpath.size.height_mm);
        }
        self.push_burn_start(&mut lines);
        self.push_body(&mut lines, toolpath);
        self.push_finale(&mut lines);
        Ok(lines)
    }
}

impl Emitter for GCodeEmitter {
    fn mode(&self) -> OutputMode {
        OutputMode::CommandStream
    }

    fn render(&self, toolpath: &Toolpath) -> EngraveResult<String> {
        let lines = align_comments(&self.lines(toolpath)?);
        let mut out = lines.join("\n");
        out.push('\n');
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines(v: &[&str]) -> Vec<String> {
        v.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_align_comments() {
        let input = lines(&["G1 X10 ; Move", "; header", "", "M400", "G28;Home"]);
        let aligned = align_comments(&input);
        assert_eq!(
            aligned,
            lines(&["G1 X10 ; Move", "; header", "", "M400", "G28    ; Home"])
        );
    }

    #[test]
    fn test_split_command() {
        assert_eq!(split_command("  ; only comment"), None);
        assert_eq!(split_command(""), None);
        assert_eq!(split_command("G90"), Some(("G90", None)));
        assert_eq!(
            split_command("G21   ; Set millimeters"),
            Some(("G21", Some("Set millimeters")))
        );
    }

    #[test]
    fn test_push_beeps() {
        let mut out = Vec::new();
        push_beeps(&mut out, 660, 1320, 150, 2, "Start");
        assert_eq!(
            out,
            lines(&[
                "M300 S660 P150 ; Start",
                "M300 S1320 P150",
                "M300 S660 P150",
                "M300 S1320 P150",
            ])
        );
    }

    #[test]
    fn test_rejects_zero_speed() {
        let opts = GCodeOptions {
            speed: 0,
            ..Default::default()
        };
        assert!(matches!(
            opts.validate(),
            Err(EngraveError::InvalidParameter { name: "speed", .. })
        ));
    }

    #[test]
    fn test_key_matches_print_precision() {
        assert_eq!(key(1.0004), key(1.0));
        assert_ne!(key(1.001), key(1.0));
    }
}
