use assembler::assemble;

/// Nand2Tetris project-6 `Add.asm`: no labels, no variables.
#[test]
fn test_add_program() {
    let source = "\
@2
D=A
@3
D=D+A
@0
M=D"
        .lines()
        .map(str::to_string)
        .collect::<Vec<_>>();

    let expected = vec![
        "0000000000000010",
        "1110110000010000",
        "0000000000000011",
        "1110000010010000",
        "0000000000000000",
        "1110001100001000",
    ];

    assert_eq!(assemble(&source).unwrap(), expected);
}

/// A loop with a label and a variable: labels bind to the following
/// instruction's address; the first unrecognized symbol gets RAM[16].
#[test]
fn test_loop_with_label_and_variable() {
    let source = "\
@17
D=A
@sum
M=D
(LOOP)
@LOOP
0;JMP"
        .lines()
        .map(str::to_string)
        .collect::<Vec<_>>();

    let expected = vec![
        "0000000000010001",
        "1110110000010000",
        "0000000000010000",
        "1110001100001000",
        "0000000000000100",
        "1110101010000111",
    ];

    assert_eq!(assemble(&source).unwrap(), expected);
}

/// Comments and blank lines must be fully transparent to the two passes.
#[test]
fn test_comments_and_whitespace_are_ignored() {
    let source = "\
// This computes 2 + 3
@2       // load 2
D=A
@3
D=D+A    // add 3

@0
M=D"
        .lines()
        .map(str::to_string)
        .collect::<Vec<_>>();

    let output = assemble(&source).unwrap();
    assert_eq!(output.len(), 5);
}

/// Variables are allocated sequentially from RAM[16] in first-seen order,
/// and repeated references resolve to the same address.
#[test]
fn test_variable_allocation_order() {
    let source = "\
@foo
M=0
@bar
M=0
@foo
D=M"
        .lines()
        .map(str::to_string)
        .collect::<Vec<_>>();

    let output = assemble(&source).unwrap();
    assert_eq!(output[0], "0000000000010000"); // foo -> 16
    assert_eq!(output[2], "0000000000010001"); // bar -> 17
    assert_eq!(output[4], "0000000000010000"); // foo -> 16 again
}

/// Predefined symbols (R0-R15, SP/LCL/ARG/THIS/THAT, SCREEN, KBD) resolve
/// without being bound by the user program.
#[test]
fn test_predefined_symbols() {
    let source = "\
@SCREEN
D=A
@KBD
D=A
@R3
D=A"
        .lines()
        .map(str::to_string)
        .collect::<Vec<_>>();

    let output = assemble(&source).unwrap();
    assert_eq!(output[0], "0100000000000000"); // SCREEN = 16384
    assert_eq!(output[2], "0110000000000000"); // KBD = 24576
    assert_eq!(output[4], "0000000000000011"); // R3 = 3
}

/// Shift instructions take the `101` prefix; non-shift C-instructions keep
/// the standard `111` prefix unchanged.
#[test]
fn test_shift_and_standard_prefixes_coexist() {
    let source = "\
@0
D=M
D=D<<
M=D>>
D=D+1"
        .lines()
        .map(str::to_string)
        .collect::<Vec<_>>();

    let output = assemble(&source).unwrap();
    assert_eq!(&output[1][0..3], "111"); // D=M
    assert_eq!(&output[2][0..3], "101"); // D=D<<
    assert_eq!(&output[3][0..3], "101"); // M=D>>
    assert_eq!(&output[4][0..3], "111"); // D=D+1
}

/// An unrecognized comp mnemonic aborts assembly instead of silently
/// emitting the all-zero default encoding.
#[test]
fn test_unknown_mnemonic_is_an_error() {
    let source = vec!["D=NOTACOMP".to_string()];
    assert!(assemble(&source).is_err());
}
