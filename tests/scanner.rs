use rlox::ast::LiteralValue;
use rlox::error::LoxError;
use rlox::scanner::{scan, Scanner};
use rlox::token::TokenType;

fn assert_token_sequence(source: &str, expected: &[(TokenType, &str)]) {
    let tokens = scan(source).expect("source should scan");

    assert_eq!(tokens.len(), expected.len(), "tokens: {:?}", tokens);

    for (actual, (expected_type, expected_lexeme)) in tokens.iter().zip(expected.iter()) {
        assert_eq!(actual.token_type, *expected_type);
        assert_eq!(actual.lexeme, *expected_lexeme);
    }
}

#[test]
fn punctuation_and_operators() {
    assert_token_sequence(
        "({*.,+*}) != == <= >= ! = < > / -;",
        &[
            (TokenType::LEFT_PAREN, "("),
            (TokenType::LEFT_BRACE, "{"),
            (TokenType::STAR, "*"),
            (TokenType::DOT, "."),
            (TokenType::COMMA, ","),
            (TokenType::PLUS, "+"),
            (TokenType::STAR, "*"),
            (TokenType::RIGHT_BRACE, "}"),
            (TokenType::RIGHT_PAREN, ")"),
            (TokenType::BANG_EQUAL, "!="),
            (TokenType::EQUAL_EQUAL, "=="),
            (TokenType::LESS_EQUAL, "<="),
            (TokenType::GREATER_EQUAL, ">="),
            (TokenType::BANG, "!"),
            (TokenType::EQUAL, "="),
            (TokenType::LESS, "<"),
            (TokenType::GREATER, ">"),
            (TokenType::SLASH, "/"),
            (TokenType::MINUS, "-"),
            (TokenType::SEMICOLON, ";"),
            (TokenType::EOF, ""),
        ],
    );
}

#[test]
fn keywords_and_identifiers() {
    assert_token_sequence(
        "var language = nil; class fun for if else while return this and or true false print _x1",
        &[
            (TokenType::VAR, "var"),
            (TokenType::IDENTIFIER, "language"),
            (TokenType::EQUAL, "="),
            (TokenType::NIL, "nil"),
            (TokenType::SEMICOLON, ";"),
            (TokenType::CLASS, "class"),
            (TokenType::FUN, "fun"),
            (TokenType::FOR, "for"),
            (TokenType::IF, "if"),
            (TokenType::ELSE, "else"),
            (TokenType::WHILE, "while"),
            (TokenType::RETURN, "return"),
            (TokenType::THIS, "this"),
            (TokenType::AND, "and"),
            (TokenType::OR, "or"),
            (TokenType::TRUE, "true"),
            (TokenType::FALSE, "false"),
            (TokenType::PRINT, "print"),
            (TokenType::IDENTIFIER, "_x1"),
            (TokenType::EOF, ""),
        ],
    );
}

#[test]
fn comments_and_whitespace_are_skipped() {
    let tokens = scan("// nothing here\n\t 1 // trailing\n").unwrap();

    assert_eq!(tokens.len(), 2);
    assert_eq!(tokens[0].lexeme, "1");
    assert_eq!(tokens[0].line, 2);
    assert_eq!(tokens[1].token_type, TokenType::EOF);
    assert_eq!(tokens[1].line, 3);
}

#[test]
fn numbers_are_digit_runs() {
    let tokens = scan("123 4.5").unwrap();

    assert_eq!(tokens[0].literal(), Some(LiteralValue::Number(123.0)));
    // No fractional literals: `4.5` is NUMBER DOT NUMBER.
    assert_eq!(tokens[1].literal(), Some(LiteralValue::Number(4.0)));
    assert_eq!(tokens[2].token_type, TokenType::DOT);
    assert_eq!(tokens[3].literal(), Some(LiteralValue::Number(5.0)));
}

#[test]
fn strings_keep_raw_text_and_escaped_quotes() {
    let tokens = scan(r#""a \"quoted\" word" "back\\""#).unwrap();

    assert_eq!(
        tokens[0].literal(),
        Some(LiteralValue::Str(r#"a \"quoted\" word"#.to_string()))
    );
    assert_eq!(
        tokens[1].literal(),
        Some(LiteralValue::Str(r"back\\".to_string()))
    );
    assert_eq!(tokens[2].token_type, TokenType::EOF);
}

#[test]
fn multiline_string_advances_line_counter() {
    let tokens = scan("\"one\ntwo\" x").unwrap();

    assert_eq!(tokens[0].literal(), Some(LiteralValue::Str("one\ntwo".to_string())));
    assert_eq!(tokens[1].lexeme, "x");
    assert_eq!(tokens[1].line, 2);
}

#[test]
fn token_display_format() {
    let tokens = scan("var x = 42; \"hi\"").unwrap();
    let lines: Vec<String> = tokens.iter().map(|t| t.to_string()).collect();

    assert_eq!(
        lines,
        vec![
            "VAR var null",
            "IDENTIFIER x null",
            "EQUAL = null",
            "NUMBER 42 42.0",
            "SEMICOLON ; null",
            "STRING \"hi\" hi",
            "EOF  null",
        ]
    );
}

#[test]
fn unexpected_character_reports_its_line() {
    let err = scan("var a = 1;\nvar b = @;").unwrap_err();

    assert!(matches!(err, LoxError::Lex { line: 2, .. }), "{:?}", err);
    assert_eq!(err.to_string(), "[line 2] Error: Unexpected character: @");
}

#[test]
fn unterminated_string_is_an_error() {
    let err = scan("print \"never closed;").unwrap_err();

    assert_eq!(err.to_string(), "[line 1] Error: Unterminated string.");
}

#[test]
fn first_error_ends_the_stream() {
    let results: Vec<_> = Scanner::new(",.$(#").collect();

    assert_eq!(results.len(), 3);
    assert!(results[0].is_ok());
    assert!(results[1].is_ok());
    assert!(results[2].is_err());
}

#[test]
fn unterminated_string_points_at_its_opening_line() {
    let err = scan("var s = 1;\nvar t = \"abc\ndef\nghi").unwrap_err();

    assert_eq!(err.to_string(), "[line 2] Error: Unterminated string.");
}

#[test]
fn ingest_errors_carry_no_line() {
    let bytes: Vec<u8> = vec![b'a', 0xff];
    let utf8 = LoxError::from(std::str::from_utf8(&bytes).unwrap_err());

    assert!(matches!(utf8, LoxError::Utf8(_)));
    assert_eq!(utf8.line(), None);

    let io = LoxError::from(std::io::Error::new(std::io::ErrorKind::NotFound, "missing"));

    assert_eq!(io.to_string(), "missing");
    assert_eq!(io.line(), None);
}
