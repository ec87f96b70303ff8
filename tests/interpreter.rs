mod common;

use common::{interpreter_with_input, output_of, run, runtime_error_of};
use rlox::error::{Arity, LoxError, RuntimeError};
use rlox::interpreter::Config;
use rlox::parser::Parser;
use rlox::scanner::scan;
use rlox::value::Value;

#[test]
fn arithmetic_precedence() {
    assert_eq!(output_of("print 2 + 3 * 4;"), "14\n");
    assert_eq!(output_of("print (10 - 4) / 3;"), "2\n");
    assert_eq!(output_of("print 7 / 2;"), "3.5\n");
    assert_eq!(output_of("print -(1 + 2);"), "-3\n");
}

#[test]
fn string_concatenation() {
    assert_eq!(output_of("print \"lox\" + \"lang\";"), "loxlang\n");
    assert_eq!(output_of("print \"n = \" + 4;"), "n = 4\n");
    assert_eq!(output_of("print 1 + \"st\";"), "1st\n");
}

#[test]
fn comparison_and_equality() {
    assert_eq!(
        output_of("print 1 < 2, 2 <= 1, 3 == 3, \"a\" != \"a\", nil == false;"),
        "true false true false false\n"
    );
}

#[test]
fn truthiness_and_not() {
    assert_eq!(output_of("print !nil, !0, !\"\";"), "true false false\n");
}

#[test]
fn block_scoping_and_shadowing() {
    let source = r#"
        var g = "Hello";
        {
            var g = "Hi";
            print g;
        }
        print g;
    "#;

    assert_eq!(output_of(source), "Hi\nHello\n");
}

#[test]
fn assignment_reaches_enclosing_scope() {
    assert_eq!(output_of("var a = 1; { a = 2; } print a;"), "2\n");
}

#[test]
fn closures_share_the_captured_binding() {
    let source = r#"
        fun makeCounter() {
            var count = 0;
            fun increment() {
                count = count + 1;
                print count;
            }
            return increment;
        }

        var counter = makeCounter();
        counter();
        counter();

        var other = makeCounter();
        other();
    "#;

    assert_eq!(output_of(source), "1\n2\n1\n");
}

#[test]
fn recursion_and_early_return() {
    let source = r#"
        fun fib(n) {
            if (n < 2) return n;
            return fib(n - 1) + fib(n - 2);
        }
        print fib(15);

        fun firstOver(limit) {
            for (var i = 0; ; i = i + 1) {
                if (i * i > limit) return i;
            }
        }
        print firstOver(50);
    "#;

    assert_eq!(output_of(source), "610\n8\n");
}

#[test]
fn function_without_return_yields_nil() {
    assert_eq!(output_of("fun f() {} print f();"), "nil\n");
    assert_eq!(output_of("fun f() { return; } print f();"), "nil\n");
}

#[test]
fn while_and_for_loops() {
    let source = r#"
        var i = 0;
        while (i < 3) { print i; i = i + 1; }
        for (var j = 10; j > 7; j = j - 1) print j;
    "#;

    assert_eq!(output_of(source), "0\n1\n2\n10\n9\n8\n");
}

#[test]
fn classes_with_init_fields_and_methods() {
    let source = r#"
        class Point {
            init(x, y) {
                this.x = x;
                this.y = y;
            }

            sum() {
                return this.x + this.y;
            }
        }

        var p = Point(1, 2);
        print p.x, p.y, p.sum();

        p.x = 10;
        print p.x, p.sum();

        print p;
        print Point;
    "#;

    assert_eq!(
        output_of(source),
        "1 2 3\n10 12\nPoint instance\nPoint\n"
    );
}

#[test]
fn methods_stay_bound_to_their_instance() {
    let source = r#"
        class Greeter {
            init(name) { this.name = name; }
            greet() { print "hi " + this.name; }
        }

        var method = Greeter("ada").greet;
        method();
    "#;

    assert_eq!(output_of(source), "hi ada\n");
}

#[test]
fn init_returns_the_instance() {
    let source = r#"
        class Box {
            init() { this.v = 1; return; }
        }
        var b = Box();
        print b.init() == b;
    "#;

    assert_eq!(output_of(source), "true\n");
}

#[test]
fn functions_print_by_name() {
    assert_eq!(
        output_of("fun hello() {} print hello, println;"),
        "<fn hello> <native fn println>\n"
    );
}

#[test]
fn undefined_variable() {
    assert_eq!(
        runtime_error_of("print 1;\nprint missing;"),
        "[line 2] Undefined variable 'missing'."
    );
    assert_eq!(
        runtime_error_of("missing = 1;"),
        "[line 1] Undefined variable 'missing'."
    );
}

#[test]
fn calling_a_number_is_an_error() {
    assert_eq!(
        runtime_error_of("var n = 3;\nn();"),
        "[line 2] Can only call functions and classes."
    );
}

#[test]
fn division_by_zero_is_an_error() {
    assert_eq!(runtime_error_of("print 1 / 0;"), "[line 1] Division by zero.");
}

#[test]
fn operand_type_errors() {
    let (_, result) = run("print -\"a\";");
    assert!(matches!(
        result.unwrap_err().as_slice(),
        [LoxError::Runtime(RuntimeError::TypeMismatch { line: 1, .. })]
    ));

    assert_eq!(
        runtime_error_of("print 1 < true;"),
        "[line 1] Invalid operand for '<': operands must be numbers, got number and boolean"
    );
}

#[test]
fn property_errors() {
    assert_eq!(
        runtime_error_of("class A {} var a = A(); print a.nope;"),
        "[line 1] Undefined property 'nope'."
    );
    assert!(runtime_error_of("var x = 1; x.y = 2;").contains("only instances have properties"));
}

#[test]
fn arity_mismatch() {
    let (_, result) = run("fun f(a, b) {}\nf(1);");

    match result.unwrap_err().as_slice() {
        [LoxError::Runtime(RuntimeError::ArityMismatch {
            expected,
            got,
            line,
        })] => {
            assert_eq!(*expected, Arity::Exact(2));
            assert_eq!(*got, 1);
            assert_eq!(*line, 2);
        }
        other => panic!("unexpected result {:?}", other),
    }

    assert_eq!(
        runtime_error_of("class A {} A(1);"),
        "[line 1] Expected 0 arguments but got 1."
    );
}

#[test]
fn runtime_error_halts_the_program() {
    let (out, result) = run("print 1;\nprint nope;\nprint 3;");

    assert_eq!(out, "1\n");
    assert!(result.is_err());
}

#[test]
fn short_circuit_skips_the_right_operand() {
    let source = r#"
        fun explodes() { return 1 / 0; }
        print false and explodes();
        print true or explodes();
        print nil or "fallback";
        print 1 and 2;
    "#;

    assert_eq!(output_of(source), "false\ntrue\nfallback\n2\n");
}

#[test]
fn unbounded_recursion_overflows() {
    let error = runtime_error_of("fun f() { f(); }\nf();");

    assert_eq!(error, "[line 1] Stack overflow.");
}

#[test]
fn call_depth_limit_is_configurable() {
    let source = "fun down(n) { if (n > 0) down(n - 1); }\ndown(20);";

    let (mut shallow, _) = interpreter_with_input("", Config { max_call_depth: 10 });
    let errors = rlox::run_with(&mut shallow, source).unwrap_err();
    assert!(matches!(
        errors.as_slice(),
        [LoxError::Runtime(RuntimeError::StackOverflow { .. })]
    ));

    let (mut deep, _) = interpreter_with_input("", Config { max_call_depth: 100 });
    assert!(rlox::run_with(&mut deep, source).is_ok());
}

#[test]
fn globals_persist_across_runs() {
    let (mut interpreter, out) = interpreter_with_input("", Config::default());

    rlox::run_with(&mut interpreter, "var total = 40;").unwrap();
    rlox::run_with(&mut interpreter, "total = total + 2; print total;").unwrap();

    assert_eq!(out.contents(), "42\n");
}

#[test]
fn pure_expressions_evaluate_identically() {
    let tokens = scan("(1 + 2) * 3 == 9 and \"a\" + \"b\"").unwrap();
    let expr = Parser::new(&tokens).parse_expression().unwrap();

    let (mut interpreter, _) = interpreter_with_input("", Config::default());
    let first = interpreter.evaluate(&expr).unwrap();
    let second = interpreter.evaluate(&expr).unwrap();

    assert_eq!(first, Value::string("ab"));
    assert_eq!(first, second);
}

#[test]
fn parse_errors_prevent_execution() {
    let (out, result) = run("print 1;\nprint ;");

    assert_eq!(out, "");
    assert!(matches!(
        result.unwrap_err().as_slice(),
        [LoxError::Parse { line: 2, .. }]
    ));
}

#[test]
fn this_outside_a_method_is_undefined() {
    assert_eq!(
        runtime_error_of("print this;"),
        "[line 1] Undefined variable 'this'."
    );
    assert_eq!(
        runtime_error_of("fun f() { return this; }\nf();"),
        "[line 1] Undefined variable 'this'."
    );
}

#[test]
fn fields_shadow_methods() {
    let source = r#"
        class A {
            m() { return "method"; }
        }
        var a = A();
        print a.m();
        a.m = 5;
        print a.m;
    "#;

    assert_eq!(output_of(source), "method\n5\n");
}

#[test]
fn class_call_takes_init_arity() {
    assert_eq!(
        runtime_error_of("class P { init(a, b) {} }\nP(1);"),
        "[line 2] Expected 2 arguments but got 1."
    );
}

#[test]
fn deeply_nested_source_runs() {
    let depth: usize = 5000;
    let blocks = format!("{}print 1;{}", "{".repeat(depth), "}".repeat(depth));
    let parens = format!("print {}2{};", "(".repeat(depth), ")".repeat(depth));

    let handle = std::thread::Builder::new()
        .stack_size(8 * 1024 * 1024)
        .spawn(move || (output_of(&blocks), output_of(&parens)))
        .unwrap();

    let (from_blocks, from_parens) = handle.join().unwrap();

    assert_eq!(from_blocks, "1\n");
    assert_eq!(from_parens, "2\n");
}
