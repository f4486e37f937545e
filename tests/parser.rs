#[cfg(test)]
mod parser_tests {
    use rlox::ast_printer::{AstPrinter, RpnPrinter};
    use rlox::error::LoxError;
    use rlox::lox;
    use rlox::parser::*;
    use rlox::token::Token;

    fn tokens(source: &str) -> Vec<Token<'_>> {
        lox::scan(source).expect("source should scan")
    }

    fn print_prefix(source: &str) -> String {
        let tokens = tokens(source);
        let expr = lox::parse_expression(&tokens).expect("expression should parse");
        AstPrinter::print(&expr)
    }

    fn print_rpn(source: &str) -> String {
        let tokens = tokens(source);
        let expr = lox::parse_expression(&tokens).expect("expression should parse");
        RpnPrinter::print(&expr)
    }

    fn parse_error(source: &str) -> LoxError {
        let tokens = tokens(source);
        lox::parse(&tokens).expect_err("program should not parse")
    }

    #[test]
    fn test_parser_01_precedence() {
        assert_eq!(print_prefix("1 + 2 * 3"), "(+ 1.0 (* 2.0 3.0))");
        assert_eq!(print_prefix("-(1 + 2) * 3"), "(* (- (group (+ 1.0 2.0))) 3.0)");
        assert_eq!(print_prefix("!true == false"), "(== (! true) false)");
        assert_eq!(print_prefix("a or b and c"), "(or a (and b c))");
    }

    #[test]
    fn test_parser_02_calls_and_properties() {
        assert_eq!(print_prefix("f(1, \"s\")"), "(call f 1.0 s)");
        assert_eq!(print_prefix("a.b.c"), "(. (. a b) c)");
        assert_eq!(print_prefix("a.b = 3"), "(= (. a b) 3.0)");
        assert_eq!(print_prefix("x = y = 2.5"), "(= x (= y 2.5))");
    }

    #[test]
    fn test_parser_03_reverse_polish() {
        assert_eq!(print_rpn("(1 + 2) * (4 - 3)"), "1 2 + 4 3 - *");
        assert_eq!(print_rpn("-a / 2"), "a - 2 /");
    }

    #[test]
    fn test_parser_04_for_is_desugared() {
        let tokens = tokens("for (var i = 0; i < 3; i = i + 1) print i;");
        let statements = lox::parse(&tokens).unwrap();

        assert_eq!(statements.len(), 1);

        let Stmt::Block(outer) = &statements[0] else {
            panic!("expected outer block, got {:?}", statements[0]);
        };
        assert!(matches!(outer[0], Stmt::Var { .. }));

        let Stmt::While { body, .. } = &outer[1] else {
            panic!("expected while loop, got {:?}", outer[1]);
        };
        let Stmt::Block(inner) = body.as_ref() else {
            panic!("expected loop body block, got {:?}", body);
        };
        assert!(matches!(inner[0], Stmt::Print(_)));
        assert!(matches!(inner[1], Stmt::Expression(Expr::Assign { .. })));
    }

    #[test]
    fn test_parser_05_for_without_clauses_loops_on_true() {
        let tokens = tokens("for (;;) print 1;");
        let statements = lox::parse(&tokens).unwrap();

        match &statements[0] {
            Stmt::While { condition, body } => {
                assert_eq!(*condition, Expr::Literal(LiteralValue::True));
                assert!(matches!(body.as_ref(), Stmt::Print(_)));
            }
            other => panic!("expected bare while loop, got {:?}", other),
        }
    }

    #[test]
    fn test_parser_06_class_members() {
        let tokens = tokens(
            "class Circle < Shape {\n  area { return 3; }\n  scale(by, times) { return by * times; }\n}",
        );
        let statements = lox::parse(&tokens).unwrap();

        let Stmt::Class {
            name,
            superclass,
            methods,
        } = &statements[0]
        else {
            panic!("expected class, got {:?}", statements[0]);
        };

        assert_eq!(name.lexeme, "Circle");
        assert!(matches!(superclass, Some(Expr::Variable(t)) if t.lexeme == "Shape"));
        assert_eq!(methods.len(), 2);

        match &methods[0] {
            Stmt::Getter(getter) => assert_eq!(getter.name.lexeme, "area"),
            other => panic!("expected getter, got {:?}", other),
        }

        match &methods[1] {
            Stmt::Function(function) => {
                assert_eq!(function.name.lexeme, "scale");
                let params: Vec<&str> = function.params.iter().map(|p| p.lexeme).collect();
                assert_eq!(params, vec!["by", "times"]);
            }
            other => panic!("expected method, got {:?}", other),
        }
    }

    #[test]
    fn test_parser_07_super_and_this() {
        assert_eq!(print_prefix("super.cook"), "(super cook)");
        assert_eq!(print_prefix("this.name"), "(. this name)");
    }

    #[test]
    fn test_parser_08_invalid_assignment_target() {
        let err = parse_error("1 = 2;");
        assert_eq!(err.to_string(), "[line 1] Error: Invalid assignment target.");

        let err = parse_error("a + b = c;");
        assert_eq!(err.to_string(), "[line 1] Error: Invalid assignment target.");
    }

    #[test]
    fn test_parser_09_reports_every_error() {
        let err = parse_error("var = 1;\nprint ;\nprint \"fine\";");

        match &err {
            LoxError::Many(errors) => assert_eq!(errors.len(), 2),
            other => panic!("expected two errors, got {:?}", other),
        }

        assert_eq!(
            err.to_string(),
            "[line 1] Error: Expected variable name\n[line 2] Error: Expected expression"
        );
        assert_eq!(err.exit_code(), 65);
    }

    #[test]
    fn test_parser_10_argument_limit() {
        let args: Vec<String> = (0..256).map(|i| i.to_string()).collect();
        let source = format!("f({});", args.join(", "));

        let err = parse_error(&source);
        assert_eq!(
            err.to_string(),
            "[line 1] Error: Can't have more than 255 arguments."
        );
    }

    #[test]
    fn test_parser_11_expression_must_end_at_eof() {
        let tokens = tokens("1 + 2 )");
        assert!(lox::parse_expression(&tokens).is_err());
    }
}
