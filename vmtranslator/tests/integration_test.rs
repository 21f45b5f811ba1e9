use vmtranslator::code_writer::CodeWriter;
use vmtranslator::parser::{self, ArithOp, Command, Segment};

fn translate(src: &str, filename: &str) -> String {
    let lines: Vec<String> = src.lines().map(str::to_string).collect();
    let commands = parser::parse_lines(&lines).unwrap();
    let mut buf = Vec::new();
    let mut writer = CodeWriter::new(&mut buf);
    writer.set_file_name(filename);
    for command in &commands {
        writer.write_command(command).unwrap();
    }
    writer.flush().unwrap();
    String::from_utf8(buf).unwrap()
}

/// `SimpleAdd`: two constants, added, left on the stack.
#[test]
fn test_simple_add() {
    let src = "\
push constant 7
push constant 8
add";
    let out = translate(src, "SimpleAdd");
    assert!(out.contains("@7"));
    assert!(out.contains("@8"));
    assert!(out.contains("D+M"));
}

/// `StackTest`-style exercise of every arithmetic/logical/shift op.
#[test]
fn test_all_arithmetic_ops_parse_and_translate() {
    let src = "\
push constant 17
push constant 17
eq
push constant 17
push constant 16
gt
push constant 892
push constant 891
lt
push constant 5
push constant 1
sub
push constant 1
neg
push constant 0
not
push constant 3
push constant 5
and
push constant 3
push constant 5
or
push constant 1
shiftleft
push constant 4
shiftright";
    let lines: Vec<String> = src.lines().map(str::to_string).collect();
    let commands = parser::parse_lines(&lines).unwrap();
    assert!(commands.contains(&Command::Arithmetic(ArithOp::Eq)));
    assert!(commands.contains(&Command::Arithmetic(ArithOp::ShiftLeft)));

    let out = translate(src, "StackTest");
    assert!(out.contains("M<<"));
    assert!(out.contains("M>>"));
}

/// `BasicTest`: all eight segments, push and pop.
#[test]
fn test_memory_segments() {
    let src = "\
push constant 10
pop local 0
push constant 21
push constant 22
pop argument 2
pop argument 1
push constant 36
pop this 6
push constant 42
push constant 45
pop that 5
pop that 2
push constant 510
pop temp 6
push pointer 0
push pointer 1";
    let out = translate(src, "BasicTest");
    assert!(out.contains("@LCL"));
    assert!(out.contains("@ARG"));
    assert!(out.contains("@THIS"));
    assert!(out.contains("@THAT"));
    assert!(out.contains("@11")); // temp 6 -> RAM[11]
}

/// `PointerTest`: pointer segment push/pop must address THIS/THAT directly,
/// not a computed offset (unlike local/argument/this/that).
#[test]
fn test_pointer_segment_addresses_this_that_directly() {
    let out = translate("push pointer 0\npop pointer 1", "PointerTest");
    assert!(out.contains("@THIS"));
    assert!(out.contains("@THAT"));
}

/// `StaticTest`: static variables are namespaced per source file.
#[test]
fn test_static_segment_namespaced_by_file() {
    let out = translate("push static 3\npop static 8", "StaticsTest");
    assert!(out.contains("StaticsTest.3"));
    assert!(out.contains("StaticsTest.8"));
}

/// `BasicLoop`: label/goto/if-goto inside a function are namespaced.
#[test]
fn test_program_flow_inside_function() {
    let src = "\
function Main.main 1
push constant 0
pop local 0
label LOOP_START
push argument 0
push local 0
add
pop local 0
push argument 0
push constant 1
sub
pop argument 0
push argument 0
if-goto LOOP_START
push local 0
return";
    let out = translate(src, "BasicLoop");
    assert!(out.contains("(Main.main$LOOP_START)"));
    assert!(out.contains("@Main.main$LOOP_START"));
}

/// `FibonacciElement`-style nested calls: verifies call/function/return
/// triples translate without panicking and preserve call-site uniqueness.
#[test]
fn test_nested_function_calls() {
    let src = "\
function Sys.init 0
push constant 4
call Main.fibonacci 1
label WHILE
goto WHILE

function Main.fibonacci 0
push argument 0
push constant 2
lt
if-goto N_LT_2
push argument 0
push constant 2
sub
call Main.fibonacci 1
push argument 0
push constant 1
sub
call Main.fibonacci 1
add
return
label N_LT_2
push argument 0
return";
    let lines: Vec<String> = src.lines().map(str::to_string).collect();
    assert!(vmtranslator::defines_sys_init(&lines));

    let out = translate(src, "Main");
    assert_eq!(out.matches("(RET_ADDRESS_0)").count(), 1);
    assert_eq!(out.matches("(RET_ADDRESS_1)").count(), 1);
    assert!(out.contains("(Main.fibonacci$N_LT_2)"));
}

/// Segment enum rejects unknown segment names instead of silently
/// defaulting, matching the rest of the workspace's no-silent-fallback policy.
#[test]
fn test_unknown_segment_rejected() {
    let lines = vec!["push bogus 0".to_string()];
    assert!(parser::parse_lines(&lines).is_err());
}

#[test]
fn test_segment_round_trip_via_enum() {
    let lines = vec!["push local 4".to_string()];
    let commands = parser::parse_lines(&lines).unwrap();
    assert_eq!(commands, vec![Command::Push(Segment::Local, 4)]);
}

/// `pop constant` has nowhere to pop into — `constant` is push-only — and
/// must be rejected at parse time rather than reaching codegen.
#[test]
fn test_pop_constant_rejected() {
    let lines = vec!["pop constant 0".to_string()];
    assert!(parser::parse_lines(&lines).is_err());
}

/// `temp` only spans RAM 5-12 (index 0-7); an out-of-range index must be a
/// reported error, not a silently computed out-of-bounds address.
#[test]
fn test_temp_index_out_of_range_rejected() {
    let lines = vec!["push temp 8".to_string()];
    assert!(parser::parse_lines(&lines).is_err());

    let lines = vec!["pop temp 200".to_string()];
    assert!(parser::parse_lines(&lines).is_err());
}

/// `pointer` only ever addresses `THIS`/`THAT` (index 0-1); anything else
/// must be a reported error rather than silently treated as `THAT`.
#[test]
fn test_pointer_index_out_of_range_rejected() {
    let lines = vec!["push pointer 2".to_string()];
    assert!(parser::parse_lines(&lines).is_err());

    let lines = vec!["pop pointer 99".to_string()];
    assert!(parser::parse_lines(&lines).is_err());
}
