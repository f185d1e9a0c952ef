//! Integration tests for G-code emission

use image::{DynamicImage, GrayImage};
use laser_raster::{
    Binarize, EngraveError, Emitter, GCodeEmitter, GCodeOptions, Mapper, Move, NullReporter,
    PhysicalSize, PowerRange, RasterOptions, Toolpath, rasterize_dynamic_image,
};

fn toolpath_for(rows: &[&[u8]]) -> Toolpath {
    let width = rows[0].len() as u32;
    let height = rows.len() as u32;
    let data: Vec<u8> = rows.iter().flat_map(|r| r.iter().copied()).collect();
    let img = GrayImage::from_raw(width, height, data).unwrap();
    let opts = RasterOptions {
        width_mm: width as f64,
        height_mm: height as f64,
        pitch: 1.0,
        bits: 8,
        binarize: Binarize::None,
    };
    rasterize_dynamic_image(&DynamicImage::ImageLuma8(img), &opts, &NullReporter).unwrap()
}

fn toolpath_from_moves(moves: Vec<Move>, width: u32, height: u32) -> Toolpath {
    Toolpath {
        raw_move_count: moves.len(),
        moves,
        size: PhysicalSize::from_samples(width, height, 1.0),
        image: GrayImage::new(width, height),
        bits: 8,
    }
}

fn quiet() -> GCodeOptions {
    GCodeOptions {
        marker_cycles: 0,
        locate: false,
        ..Default::default()
    }
}

/// Engraving moves between the burn speed line and the finale
fn body(gcode: &str) -> Vec<String> {
    gcode
        .lines()
        .skip_while(|l| !l.starts_with("G1 F"))
        .skip(2)
        .take_while(|l| !l.is_empty())
        .map(|l| l.to_string())
        .collect()
}

// ============================================================================
// Document Structure Tests
// ============================================================================

#[test]
fn test_document_blocks_in_order() {
    let gcode = GCodeEmitter::default()
        .render(&toolpath_for(&[&[0, 255]]))
        .unwrap();

    let position = |needle: &str| {
        gcode
            .find(needle)
            .unwrap_or_else(|| panic!("missing {}", needle))
    };
    let init = position("; Init Marlin Laser code");
    let homing = position("G28");
    let locate = position("Locate burning area");
    let start = position("Start burning");
    let engrave = position("; Engraving code");
    let finale = position("; Finalize Marlin Laser code");
    let park = position("Home laser head");

    assert!(init < homing && homing < locate && locate < start);
    assert!(start < engrave && engrave < finale && finale < park);
    assert!(gcode.contains("G90"));
    assert!(gcode.contains("G21"));
    assert!(gcode.contains("M84"));
    assert!(gcode.ends_with('\n'));
}

#[test]
fn test_locate_block_optional() {
    let toolpath = toolpath_for(&[&[0, 255]]);
    let with = GCodeEmitter::default().render(&toolpath).unwrap();
    let without = GCodeEmitter::new(quiet()).render(&toolpath).unwrap();

    assert_eq!(with.matches("G93").count(), 2);
    assert!(with.contains("G93 X1.000 Y0.500 I0 J0"));
    assert!(with.contains("G93 X0 Y0 I2.000 J1.000"));
    assert!(!without.contains("G93"));
}

#[test]
fn test_marker_cycles() {
    let toolpath = toolpath_for(&[&[0]]);
    let options = GCodeOptions {
        marker_cycles: 3,
        ..quiet()
    };
    let gcode = GCodeEmitter::new(options).render(&toolpath).unwrap();

    // Three before burning, four in the end-of-job notification
    let high = gcode
        .lines()
        .filter(|l| l.trim() == "M300 S1320 P150")
        .count();
    assert_eq!(high, 3 + 4);
}

#[test]
fn test_header_comments() {
    let options = GCodeOptions {
        header: vec!["Parameters:".to_string(), "   bits = 8".to_string()],
        ..quiet()
    };
    let gcode = GCodeEmitter::new(options)
        .render(&toolpath_for(&[&[0]]))
        .unwrap();
    let lines: Vec<&str> = gcode.lines().collect();

    assert_eq!(lines[0], "; Init Marlin Laser code");
    assert!(lines[1].starts_with("; Built by laser-raster"));
    assert_eq!(lines[2], "; Parameters:");
    assert_eq!(lines[3], ";    bits = 8");
}

#[test]
fn test_comments_are_column_aligned() {
    let gcode = GCodeEmitter::default()
        .render(&toolpath_for(&[&[0, 60, 120], &[180, 240, 255]]))
        .unwrap();

    let columns: Vec<usize> = gcode
        .lines()
        .filter(|l| !l.starts_with(';'))
        .filter_map(|l| l.find(" ; "))
        .collect();

    assert!(columns.len() > 5);
    assert!(
        columns.iter().all(|&c| c == columns[0]),
        "Comment columns differ: {:?}",
        columns
    );
}

// ============================================================================
// Engraving Body Tests
// ============================================================================

#[test]
fn test_reference_image_body() {
    let gcode = GCodeEmitter::new(quiet())
        .render(&toolpath_for(&[&[0, 128, 128, 255], &[255, 128, 128, 0]]))
        .unwrap();

    // Starts at the top-left corner, which is Y=2 after the flip
    assert!(gcode.contains("G1 X0.000 Y2.000 F3000 S0"));
    assert_eq!(
        body(&gcode),
        vec![
            "G1 S255",
            "G1 X2.000 S167",
            "G1 X4.000 S0",
            "G1 Y1.000",
            "G1 X3.000 S255",
            "G1 X1.000 S167",
            "G1 X0.000 S0",
        ]
    );
}

#[test]
fn test_all_white_has_no_power_commands() {
    let white: &[u8] = &[255; 6];
    let toolpath = toolpath_for(&[white, white, white]);

    let mapper = Mapper::new(&toolpath.size, PowerRange::default());
    assert!(toolpath.moves.iter().all(|m| mapper.map(m).power == 0));

    let gcode = GCodeEmitter::new(quiet()).render(&toolpath).unwrap();
    let body = body(&gcode);
    assert!(!body.is_empty());
    for line in &body {
        assert!(!line.contains('S'), "Unexpected power in '{}'", line);
        assert_ne!(line, "G1", "Empty command emitted");
    }
}

#[test]
fn test_identical_moves_are_suppressed() {
    let moves = vec![
        Move::at(0, 0, 1.0, 255),
        Move::at(1, 0, 1.0, 0),
        Move::at(1, 0, 1.0, 0),
        Move::at(1, 0, 1.0, 0),
        Move::at(2, 0, 1.0, 0),
    ];
    let gcode = GCodeEmitter::new(quiet())
        .render(&toolpath_from_moves(moves, 2, 1))
        .unwrap();

    assert_eq!(body(&gcode), vec!["G1 X1.000 S255", "G1 X2.000"]);
}

#[test]
fn test_axis_only_deltas() {
    let moves = vec![
        Move::at(0, 0, 1.0, 255),
        Move::at(0, 1, 1.0, 255),
        Move::at(3, 1, 1.0, 255),
        Move::at(3, 1, 1.0, 0),
    ];
    let options = GCodeOptions {
        power: PowerRange::new(0, 100).unwrap(),
        ..quiet()
    };
    let gcode = GCodeEmitter::new(options)
        .render(&toolpath_from_moves(moves, 3, 2))
        .unwrap();

    assert_eq!(body(&gcode), vec!["G1 Y1.000", "G1 X3.000", "G1 S100"]);
}

#[test]
fn test_min_power_applies_only_to_burned_samples() {
    let options = GCodeOptions {
        power: PowerRange::new(50, 60).unwrap(),
        ..quiet()
    };
    let gcode = GCodeEmitter::new(options)
        .render(&toolpath_for(&[&[254, 255]]))
        .unwrap();

    let body = body(&gcode);
    assert!(body.iter().any(|l| l.ends_with("S50")));
    assert!(body.iter().any(|l| l.ends_with("S0")));
    assert!(!body.iter().any(|l| l.contains("S60")));
}

#[test]
fn test_burn_speed_line() {
    let options = GCodeOptions {
        speed: 1800,
        ..quiet()
    };
    let gcode = GCodeEmitter::new(options)
        .render(&toolpath_for(&[&[0]]))
        .unwrap();
    assert!(
        gcode
            .lines()
            .any(|l| l.starts_with("G1 F1800 ") && l.ends_with("; Set burn speed"))
    );
}

// ============================================================================
// Error and Output Tests
// ============================================================================

#[test]
fn test_inverted_power_range_rejected() {
    let options = GCodeOptions {
        power: PowerRange { min: 200, max: 10 },
        ..quiet()
    };
    let err = GCodeEmitter::new(options)
        .render(&toolpath_for(&[&[0]]))
        .unwrap_err();
    assert!(matches!(err, EngraveError::InvalidParameter { name: "min", .. }));
}

#[test]
fn test_write_publishes_document() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("job.gcode");
    let toolpath = toolpath_for(&[&[0, 255]]);
    let emitter = GCodeEmitter::default();

    emitter.write(&toolpath, &path).unwrap();
    assert_eq!(
        std::fs::read_to_string(&path).unwrap(),
        emitter.render(&toolpath).unwrap()
    );
}

#[test]
fn test_write_to_missing_directory_fails() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nope").join("job.gcode");
    let err = GCodeEmitter::default()
        .write(&toolpath_for(&[&[0]]), &path)
        .unwrap_err();
    assert!(matches!(err, EngraveError::Write { .. }));
}

#[test]
fn test_single_pixel_image() {
    let gcode = GCodeEmitter::new(quiet())
        .render(&toolpath_for(&[&[0]]))
        .unwrap();
    // The zero-length black sample merges into the burn to the far edge
    assert_eq!(body(&gcode), vec!["G1 X1.000 S255"]);
}
