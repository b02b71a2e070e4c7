use postkit_core::{MotionCommand, Operation, Param, PathNode, ToolPathDocument};
use postkit_post::{emit, optimize, GCodeOptimizer};
use postkit_settings::{DustCollection, PostConfig};

fn reorder(lines: &[&str]) -> Vec<String> {
    GCodeOptimizer::new(false, true).optimize_lines(lines)
}

#[test]
fn test_split_after_tool_change() {
    let out = reorder(&["M6 T1", "G1 X10 Y10 Z5", "G1 X20 Y20 Z6"]);
    assert_eq!(out, vec!["M6 T1", "G1 X10 Y10", "G1 Z5", "G1 X20 Y20 Z6"]);
}

#[test]
fn test_z_lines_held_until_first_xy_move() {
    let out = reorder(&["M6 T1", "G1 Z1", "G1 Z2", "G1 X1 Y1"]);
    assert_eq!(out, vec!["M6 T1", "G1 X1 Y1", "G1 Z1", "G1 Z2"]);
}

#[test]
fn test_held_z_line_flushed_at_end() {
    let out = reorder(&["G0 X0 Y0", "M6 T2", "G43 H2", "G0 Z15"]);
    assert_eq!(out, vec!["G0 X0 Y0", "M6 T2", "G43 H2", "G0 Z15"]);
    assert_eq!(out.last().map(String::as_str), Some("G0 Z15"));
}

#[test]
fn test_comments_pass_through_while_holding() {
    let out = reorder(&["M6 T1", "G0 Z5", "(approach)", "G0 X1"]);
    assert_eq!(out, vec!["M6 T1", "(approach)", "G0 X1", "G0 Z5"]);
}

#[test]
fn test_tool_change_with_reorder_disabled() {
    let text = "M6 T1\nG1 X10 Y10 Z5\n";
    assert_eq!(optimize(text, false, false), text);
}

#[test]
fn test_trim_redundant_words() {
    let text = "G1 X1 Z-1.000 F300.000\nG1 X2 Z-1.000 F300.000\nG1 X3 F250.000\n";
    assert_eq!(
        optimize(text, true, false),
        "G1 X1 Z-1.000 F300.000\nG1 X2\nG1 X3 F250.000\n"
    );
}

#[test]
fn test_emitted_program_reorders_first_plunge() {
    let config = PostConfig {
        suppress_header: true,
        suppress_comments: true,
        preamble: String::new(),
        postamble: String::new(),
        dust_collection: DustCollection {
            on_at_start: false,
            off_at_end: false,
        },
        ..PostConfig::default()
    };
    let op = Operation::new("Drill").with_commands(vec![
        PathNode::Command(MotionCommand::new("M6").with(Param::T, 5.0)),
        PathNode::Command(MotionCommand::new("M3").with(Param::S, 18000.0)),
        PathNode::Command(
            MotionCommand::new("G0")
                .with(Param::X, 10.0)
                .with(Param::Y, 20.0)
                .with(Param::Z, 5.0),
        ),
    ]);
    let text = emit(&ToolPathDocument::new(vec![op]), &config).unwrap();
    let out = optimize(&text, false, true);
    assert_eq!(
        out,
        "G21\nM5\nM6 T5 G43 H5\nM3 S18000\nG0 X10.000 Y20.000\nG0 Z5.000\n"
    );
}

#[test]
fn test_block_delete_marker_survives_split() {
    let out = reorder(&["/ M5", "/ M6 T1 G43 H1", "/ G0 X1.000 Y2.000 Z3.000", "G0 X5.000"]);
    assert_eq!(
        out,
        vec![
            "/ M5",
            "/ M6 T1 G43 H1",
            "/ G0 X1.000 Y2.000",
            "/ G0 Z3.000",
            "G0 X5.000"
        ]
    );
}
