#[cfg(test)]
mod interpreter_tests {
    use std::cell::RefCell;
    use std::io::{self, Write};
    use std::rc::Rc;

    use rlox::error::LoxError;
    use rlox::interpreter::Interpreter;
    use rlox::lox;

    /// `print` sink the test can read back after the interpreter is gone.
    #[derive(Clone, Default)]
    struct SharedBuffer(Rc<RefCell<Vec<u8>>>);

    impl SharedBuffer {
        fn contents(&self) -> String {
            String::from_utf8(self.0.borrow().clone()).unwrap()
        }
    }

    impl Write for SharedBuffer {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.borrow_mut().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    fn execute(source: &str, out: SharedBuffer, repl: bool) -> Result<(), LoxError> {
        let tokens = lox::scan(source)?;
        let statements = lox::parse(&tokens)?;
        let mut interpreter = Interpreter::with_output(Box::new(out));
        interpreter.set_repl_mode(repl);
        lox::execute(&mut interpreter, &statements)
    }

    fn run_with(source: &str, repl: bool) -> (String, Result<(), LoxError>) {
        let buffer = SharedBuffer::default();
        let result = execute(source, buffer.clone(), repl);
        (buffer.contents(), result)
    }

    /// Run a program that must succeed and return what it printed.
    fn output(source: &str) -> String {
        let (out, result) = run_with(source, false);
        if let Err(e) = result {
            panic!("program failed: {}\noutput so far: {:?}", e, out);
        }
        out
    }

    /// Run a program that must fail at runtime and return the error text.
    fn runtime_error(source: &str) -> String {
        let (_, result) = run_with(source, false);
        let err = result.expect_err("program should fail");

        assert!(err.is_runtime(), "expected a runtime error, got {}", err);
        assert_eq!(err.exit_code(), 70);

        err.to_string()
    }

    // ───────────────────────── expressions ─────────────────────────

    #[test]
    fn test_interpreter_01_arithmetic_and_display() {
        assert_eq!(
            output("print 1 + 2 * 3;\nprint 10 / 4;\nprint -(3 - 5);\nprint 1 / 0;"),
            "7\n2.5\n2\ninf\n"
        );
    }

    #[test]
    fn test_interpreter_02_string_concatenation() {
        assert_eq!(
            output("print \"lox\" + \"rs\";\nprint 1 + \"a\";\nprint \"a\" + 2.5;\nprint \"n\" + nil;"),
            "loxrs\n1a\na2.5\nnnil\n"
        );
    }

    #[test]
    fn test_interpreter_03_equality_never_coerces() {
        assert_eq!(
            output("print 1 == \"1\";\nprint nil == nil;\nprint nil == false;\nprint \"ab\" == \"a\" + \"b\";\nprint 2 != 2;"),
            "false\ntrue\nfalse\ntrue\nfalse\n"
        );
    }

    #[test]
    fn test_interpreter_04_truthiness() {
        let source = r#"
if (0) print "zero is truthy";
if ("") print "empty string is truthy";
if (nil) print "unreachable"; else print "nil is falsey";
if (false) print "unreachable"; else print "false is falsey";
print !nil;
"#;
        assert_eq!(
            output(source),
            "zero is truthy\nempty string is truthy\nnil is falsey\nfalse is falsey\ntrue\n"
        );
    }

    #[test]
    fn test_interpreter_05_logical_operators_return_operands() {
        assert_eq!(
            output("print nil or \"x\";\nprint 0 and 2;\nprint false and undefined;\nprint \"a\" or undefined;"),
            "x\n2\nfalse\na\n"
        );
    }

    // ───────────────────────── statements ─────────────────────────

    #[test]
    fn test_interpreter_06_loops() {
        let source = r#"
var sum = 0;
for (var i = 1; i <= 4; i = i + 1) sum = sum + i;
print sum;

var n = 3;
while (n > 0) {
  print n;
  n = n - 1;
}
"#;
        assert_eq!(output(source), "10\n3\n2\n1\n");
    }

    #[test]
    fn test_interpreter_07_block_shadowing() {
        let source = r#"
var a = "global a";
var b = "global b";
{
  var a = "outer a";
  {
    var a = "inner a";
    print a;
    print b;
  }
  print a;
}
print a;
"#;
        assert_eq!(output(source), "inner a\nglobal b\nouter a\nglobal a\n");
    }

    #[test]
    fn test_interpreter_08_return_unwinds_blocks() {
        let source = r#"
var a = "outer";
fun f() {
  {
    var a = "inner";
    while (true) {
      return a;
    }
  }
}
print f();
print a;
"#;
        assert_eq!(output(source), "inner\nouter\n");
    }

    #[test]
    fn test_interpreter_09_error_leaves_globals_intact() {
        let buffer = SharedBuffer::default();

        let first_tokens = lox::scan("var a = \"global\";\n{\n  var a = \"local\";\n  print nope;\n}").unwrap();
        let first = lox::parse(&first_tokens).unwrap();
        let second_tokens = lox::scan("print a;").unwrap();
        let second = lox::parse(&second_tokens).unwrap();

        let mut interpreter = Interpreter::with_output(Box::new(buffer.clone()));

        let err = lox::execute(&mut interpreter, &first).unwrap_err();
        assert_eq!(err.to_string(), "Undefined variable 'nope'.\n[line 4]");

        lox::execute(&mut interpreter, &second).unwrap();
        assert_eq!(buffer.contents(), "global\n");
    }

    #[test]
    fn test_interpreter_10_error_halts_program() {
        let (out, result) = run_with("print 1;\nprint missing;\nprint 2;", false);

        assert_eq!(out, "1\n");
        assert_eq!(
            result.unwrap_err().to_string(),
            "Undefined variable 'missing'.\n[line 2]"
        );
    }

    // ───────────────────────── functions ─────────────────────────

    #[test]
    fn test_interpreter_11_closures_capture_variables() {
        let source = r#"
fun makeCounter() {
  var i = 0;
  fun count() {
    i = i + 1;
    print i;
  }
  return count;
}

var c1 = makeCounter();
var c2 = makeCounter();
c1();
c1();
c2();
"#;
        assert_eq!(output(source), "1\n2\n1\n");
    }

    #[test]
    fn test_interpreter_12_recursion() {
        let source = r#"
fun fib(n) {
  if (n < 2) return n;
  return fib(n - 1) + fib(n - 2);
}
print fib(15);
"#;
        assert_eq!(output(source), "610\n");
    }

    #[test]
    fn test_interpreter_13_implicit_nil_return() {
        assert_eq!(output("fun f() {}\nprint f();"), "nil\n");
    }

    #[test]
    fn test_interpreter_14_callable_display() {
        let source = r#"
fun f() {}
class Bagel {}
print f;
print clock;
print Bagel;
print Bagel();
"#;
        assert_eq!(output(source), "<fn f>\n<native fn>\nBagel\nBagel instance\n");
    }

    #[test]
    fn test_interpreter_15_native_clock() {
        assert_eq!(output("print clock() > 1000000000;"), "true\n");
    }

    #[test]
    fn test_interpreter_16_top_level_getter_is_a_function() {
        assert_eq!(output("fun answer { return 42; }\nprint answer();"), "42\n");
    }

    // ───────────────────────── classes ─────────────────────────

    #[test]
    fn test_interpreter_17_fields_and_methods() {
        let source = r#"
class Person {
  init(name) {
    this.name = name;
  }
  greet() {
    print "hi " + this.name;
  }
}

var p = Person("ada");
p.greet();
var bound = p.greet;
p.name = "grace";
bound();
"#;
        assert_eq!(output(source), "hi ada\nhi grace\n");
    }

    #[test]
    fn test_interpreter_18_fields_shadow_methods() {
        let source = r#"
class A {
  m() { return "method"; }
}
var a = A();
print a.m();
a.m = "field";
print a.m;
"#;
        assert_eq!(output(source), "method\nfield\n");
    }

    #[test]
    fn test_interpreter_19_initializer_returns_instance() {
        let source = r#"
class A {
  init() {
    this.v = 1;
    return;
  }
}
var a = A();
print a.init() == a;
print a.v;
"#;
        assert_eq!(output(source), "true\n1\n");
    }

    #[test]
    fn test_interpreter_20_inherited_initializer() {
        let source = r#"
class A {
  init() { this.x = 1; }
}
class B < A {}
print B().x;
"#;
        assert_eq!(output(source), "1\n");
    }

    #[test]
    fn test_interpreter_21_getters_run_on_every_access() {
        let source = r#"
class Counter {
  init() { this.n = 0; }
  next {
    this.n = this.n + 1;
    return this.n;
  }
}
var c = Counter();
print c.next;
print c.next;
print c.n;
"#;
        assert_eq!(output(source), "1\n2\n2\n");
    }

    #[test]
    fn test_interpreter_22_super_dispatch() {
        let source = r#"
class A {
  method() { return "A method"; }
  name { return "A"; }
}
class B < A {
  method() { return "B then " + super.method(); }
  name { return "B over " + super.name; }
}
class C < B {}
var c = C();
print c.method();
print c.name;
"#;
        assert_eq!(output(source), "B then A method\nB over A\n");
    }

    #[test]
    fn test_interpreter_23_methods_are_inherited() {
        let source = r#"
class Doughnut {
  cook() { print "Fry until golden brown."; }
}
class BostonCream < Doughnut {}
BostonCream().cook();
"#;
        assert_eq!(output(source), "Fry until golden brown.\n");
    }

    #[test]
    fn test_interpreter_24_bound_method_accesses_are_distinct() {
        let source = r#"
class A { m() {} }
var a = A();
print a == a;
print a.m == a.m;
print A == A;
"#;
        assert_eq!(output(source), "true\nfalse\ntrue\n");
    }

    // ───────────────────────── runtime errors ─────────────────────────

    #[test]
    fn test_interpreter_25_operand_type_errors() {
        assert_eq!(runtime_error("print -\"a\";"), "Operand must be a number.\n[line 1]");
        assert_eq!(runtime_error("print \"a\" - \"b\";"), "Operands must be numbers.\n[line 1]");
        assert_eq!(runtime_error("print 1 < nil;"), "Operands must be numbers.\n[line 1]");
        assert_eq!(
            runtime_error("print true + nil;"),
            "Operands must be numbers or strings.\n[line 1]"
        );
    }

    #[test]
    fn test_interpreter_26_call_errors() {
        assert_eq!(
            runtime_error("var x = 1;\nx();"),
            "Can only call functions and classes.\n[line 2]"
        );
        assert_eq!(
            runtime_error("fun f(a) {}\nf(1, 2);"),
            "Expected 1 arguments but got 2.\n[line 2]"
        );
        assert_eq!(
            runtime_error("class A { init(a, b) {} }\nclass B < A {}\nB(1);"),
            "Expected 2 arguments but got 1.\n[line 3]"
        );
        assert_eq!(
            runtime_error("class A {}\nA(1);"),
            "Expected 0 arguments but got 1.\n[line 2]"
        );
    }

    #[test]
    fn test_interpreter_27_property_errors() {
        assert_eq!(
            runtime_error("var s = \"str\";\nprint s.len;"),
            "Only instances have properties.\n[line 2]"
        );
        assert_eq!(
            runtime_error("var n = 1;\nn.x = 2;"),
            "Only instances can be set.\n[line 2]"
        );
        assert_eq!(
            runtime_error("class A {}\nA().missing;"),
            "Undefined property 'missing'.\n[line 2]"
        );
        assert_eq!(
            runtime_error("class A {}\nclass B < A {\n  m() { return super.nope(); }\n}\nB().m();"),
            "Undefined property 'nope'.\n[line 3]"
        );
    }

    #[test]
    fn test_interpreter_28_superclass_must_be_a_class() {
        assert_eq!(
            runtime_error("var NotClass = \"x\";\nclass B < NotClass {}"),
            "Superclass must be a class.\n[line 2]"
        );
    }

    #[test]
    fn test_interpreter_29_assign_to_undefined_global() {
        assert_eq!(
            runtime_error("ghost = 1;"),
            "Undefined variable 'ghost'.\n[line 1]"
        );
    }

    // ───────────────────────── REPL mode ─────────────────────────

    #[test]
    fn test_interpreter_30_repl_echoes_top_level_values() {
        let source = r#"
var a = 3;
a + 1;
print "p";
fun f() { 1 + 1; }
f();
var b;
"#;
        let (out, result) = run_with(source, true);
        result.unwrap();
        assert_eq!(out, "3\n4\np\nnil\nnil\n");
    }

    #[test]
    fn test_interpreter_31_evaluate_single_expression() {
        let tokens = lox::scan("(1 + 2) * 4 == 12").unwrap();
        let expr = lox::parse_expression(&tokens).unwrap();
        let mut interpreter = Interpreter::with_output(Box::new(io::sink()));

        let value = lox::evaluate(&mut interpreter, &expr).unwrap();
        assert_eq!(value.to_string(), "true");
    }

    // ───────────────────────── later additions ─────────────────────────

    #[test]
    fn test_interpreter_32_large_integers_print_shortest_form() {
        let source = r#"
var x = 1;
for (var i = 0; i < 30; i = i + 1) x = x * 10;
print x;
print 123456789012345678901234567890;
"#;
        assert_eq!(
            output(source),
            "1000000000000000000000000000000\n123456789012345680000000000000\n"
        );
    }

    #[test]
    fn test_interpreter_33_callable_fields_are_not_invoked() {
        let source = r#"
var n = 0;
fun tick {
  n = n + 1;
  return n;
}
class A {}
var a = A();
a.f = tick;
print a.f;
print n;
print a.f();
print n;
"#;
        assert_eq!(output(source), "<fn tick>\n0\n1\n1\n");
    }

    #[test]
    fn test_interpreter_34_closures_share_captured_scope() {
        let source = r#"
var get;
var set;
fun pair() {
  var x = 1;
  fun g() { return x; }
  fun s(v) { x = v; }
  get = g;
  set = s;
}
pair();
print get();
set(5);
print get();
"#;
        assert_eq!(output(source), "1\n5\n");
    }

    #[test]
    fn test_interpreter_35_calls_get_independent_frames() {
        let source = r#"
fun bump(p) {
  p = p + 1;
  var local = p * 10;
  print local;
}
bump(1);
bump(1);
var v = 7;
bump(v);
print v;
"#;
        assert_eq!(output(source), "20\n20\n80\n7\n");
    }

    #[test]
    fn test_interpreter_36_runaway_recursion_is_a_runtime_error() {
        // The limit must be reached before the host stack runs out.
        let handle = std::thread::Builder::new()
            .stack_size(256 * 1024 * 1024)
            .spawn(|| {
                let source = "fun f(n) {\n  return f(n + 1);\n}\nf(0);";
                let (_, result) = run_with(source, false);
                result.map_err(|e| (e.to_string(), e.exit_code()))
            })
            .unwrap();

        let (message, code) = handle.join().unwrap().unwrap_err();
        assert_eq!(message, "Stack overflow.\n[line 2]");
        assert_eq!(code, 70);
    }

    #[test]
    fn test_interpreter_37_depth_recovers_after_overflow() {
        let handle = std::thread::Builder::new()
            .stack_size(256 * 1024 * 1024)
            .spawn(|| {
                let buffer = SharedBuffer::default();
                let first_tokens = lox::scan("fun f(n) { return f(n + 1); }\nf(0);").unwrap();
                let first = lox::parse(&first_tokens).unwrap();
                let second_tokens = lox::scan("fun g(n) { if (n > 0) return g(n - 1); return \"ok\"; }\nprint g(100);").unwrap();
                let second = lox::parse(&second_tokens).unwrap();

                let mut interpreter = Interpreter::with_output(Box::new(buffer.clone()));
                assert!(lox::execute(&mut interpreter, &first).is_err());
                lox::execute(&mut interpreter, &second).unwrap();
                buffer.contents()
            })
            .unwrap();

        assert_eq!(handle.join().unwrap(), "ok\n");
    }
}
