use jackc::CompilationEngine;

fn compile(src: &str) -> String {
    let mut buf = Vec::new();
    CompilationEngine::compile(src, &mut buf).unwrap();
    String::from_utf8(buf).unwrap()
}

/// `Seven`-style program: a single expression compiled to constant pushes
/// and a multiply call.
#[test]
fn test_seven_style_constant_expression() {
    let src = "\
class Main {
    function void main() {
        do Output.printInt(1 + (2 * 3));
        return;
    }
}";
    let out = compile(src);
    assert!(out.contains("push constant 1"));
    assert!(out.contains("push constant 2"));
    assert!(out.contains("push constant 3"));
    assert!(out.contains("call Math.multiply 2"));
    assert!(out.contains("add"));
    assert!(out.contains("call Output.printInt 1"));
}

/// `ConvertToBin`-style program: fields, a constructor, and a method that
/// mutates `this` via array-style bit access.
#[test]
fn test_class_with_fields_and_method() {
    let src = "\
class Point {
    field int x, y;

    constructor Point new(int ax, int ay) {
        let x = ax;
        let y = ay;
        return this;
    }

    method int getX() {
        return x;
    }

    method void moveTo(int nx, int ny) {
        let x = nx;
        let y = ny;
        return;
    }
}";
    let out = compile(src);
    assert!(out.contains("function Point.new 0"));
    assert!(out.contains("call Memory.alloc 1"));
    assert!(out.contains("pop pointer 0"));
    assert!(out.contains("function Point.getX 0"));
    assert!(out.contains("push this 0"));
    assert!(out.contains("function Point.moveTo 0"));
    assert!(out.contains("push argument 0"));
    assert!(out.contains("pop this 0"));
    assert!(out.contains("pop this 1"));
}

/// `Square`-style program: `if`/`else`, `while`, and a method call chain
/// through `do`.
#[test]
fn test_if_else_and_while_with_method_calls() {
    let src = "\
class Main {
    function void run(Square sq) {
        var int i;
        let i = 0;
        while (i < 10) {
            if (i = 5) {
                do sq.shrink();
            } else {
                do sq.grow();
            }
            let i = i + 1;
        }
        return;
    }
}";
    let out = compile(src);
    assert!(out.contains("label WHILE_EXP_0"));
    assert!(out.contains("label WHILE_END_"));
    assert!(out.contains("label IF_TRUE_"));
    assert!(out.contains("label IF_FALSE_"));
    assert!(out.contains("lt"));
    assert!(out.contains("eq"));
    assert!(out.contains("call Square.shrink 1"));
    assert!(out.contains("call Square.grow 1"));
}

/// `Average`-style program: array access on both sides of an assignment.
#[test]
fn test_array_read_and_write() {
    let src = "\
class Main {
    function void run() {
        var Array a;
        var int i, sum;
        let i = 0;
        let sum = 0;
        while (i < 5) {
            let sum = sum + a[i];
            let i = i + 1;
        }
        let a[0] = sum;
        return;
    }
}";
    let out = compile(src);
    assert!(out.contains("pop pointer 1"));
    assert!(out.contains("push that 0"));
    assert!(out.contains("pop that 0"));
}

/// Recursive static function call, matching the `Main.fibonacci` shape used
/// elsewhere in the workspace's vmtranslator tests.
#[test]
fn test_recursive_static_call() {
    let src = "\
class Main {
    function int fibonacci(int n) {
        if (n < 2) {
            return n;
        }
        return Main.fibonacci(n - 1) + Main.fibonacci(n - 2);
    }
}";
    let out = compile(src);
    assert_eq!(out.matches("call Main.fibonacci 1").count(), 2);
    assert!(out.contains("lt"));
}

/// String constants expand to `String.new`/`String.appendChar` calls.
#[test]
fn test_string_constant_construction() {
    let src = r#"
class Main {
    function void main() {
        do Output.printString("hi");
        return;
    }
}"#;
    let out = compile(src);
    assert!(out.contains("call String.new 1"));
    assert!(out.contains("call String.appendChar 2"));
}

/// A reference to an undeclared variable is a compile error, not a silent
/// fallback to some default segment.
#[test]
fn test_undeclared_variable_is_an_error() {
    let src = "\
class Main {
    function void main() {
        let missing = 1;
        return;
    }
}";
    assert!(CompilationEngine::compile(src, Vec::new()).is_err());
}
