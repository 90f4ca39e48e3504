//! Deferred condition expressions.
//!
//! Conditions written as `eval:<expression>` are parsed by a small closed
//! grammar rather than executed as code. Only literals, comparisons, boolean
//! operators and a fixed set of predicate functions are available:
//!
//! ```text
//! expr     := or
//! or       := and ( ( "||" | "or" ) and )*
//! and      := compare ( ( "&&" | "and" ) compare )*
//! compare  := unary ( op unary )?          op: == != <> === !== < <= > >=
//! unary    := ( "!" | "not" ) unary | "-" unary | primary
//! primary  := literal | call | "(" expr ")"
//! literal  := integer | float | 'string' | "string" | true | false | null
//! call     := [ "$this->" ] ident "(" [ expr ( "," expr )* ] ")"
//! ```
//!
//! # Example
//!
//! ```
//! use envaudit::environment::StaticEnvironment;
//! use envaudit::requirements::expr::evaluate;
//! use envaudit::requirements::Predicates;
//!
//! let env = StaticEnvironment::new().with_ini("upload_max_filesize", "8M")
//!     .with_ini("post_max_size", "8M");
//! let predicates = Predicates::new(&env);
//!
//! assert!(evaluate("2 > 1", &predicates).unwrap());
//! assert!(evaluate(r#"$this->checkUploadMaxFileSize("5M")"#, &predicates).unwrap());
//! assert!(evaluate("byte_size('1K') == 1024 && !ini_on('display_errors')", &predicates).unwrap());
//! ```

use std::cmp::Ordering;
use std::fmt;
use std::iter::Peekable;
use std::str::CharIndices;

use super::compare::Comparator;
use super::predicates::Predicates;
use super::size::{parse_bytes, parse_numeric};
use crate::error::{AuditError, Result};

/// Marker prefix that turns a string condition into a deferred expression.
pub const EVAL_PREFIX: &str = "eval:";

/// A value produced while evaluating an expression.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
}

impl Value {
    /// Truthiness: `false`, `0`, `0.0`, `""`, `"0"` and `null` are false.
    pub fn truthy(&self) -> bool {
        match self {
            Value::Null => false,
            Value::Bool(b) => *b,
            Value::Int(i) => *i != 0,
            Value::Float(f) => *f != 0.0,
            Value::Str(s) => !s.is_empty() && s != "0",
        }
    }

    fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::Str(_) => "string",
        }
    }

    fn as_number(&self) -> Option<f64> {
        match self {
            Value::Int(i) => Some(*i as f64),
            Value::Float(f) => Some(*f),
            Value::Str(s) => parse_numeric(s),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => Ok(()),
            Value::Bool(true) => f.write_str("1"),
            Value::Bool(false) => Ok(()),
            Value::Int(i) => write!(f, "{}", i),
            Value::Float(x) => write!(f, "{}", x),
            Value::Str(s) => f.write_str(s),
        }
    }
}

/// Comparison operators available inside expressions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    Loose(Comparator),
    Identical,
    NotIdentical,
}

/// Parsed expression tree.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Literal(Value),
    Not(Box<Expr>),
    Negate(Box<Expr>),
    And(Box<Expr>, Box<Expr>),
    Or(Box<Expr>, Box<Expr>),
    Compare(CompareOp, Box<Expr>, Box<Expr>),
    Call { name: String, args: Vec<Expr> },
}

/// Error raised while parsing or evaluating an expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExprError {
    pub message: String,
}

impl ExprError {
    fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl fmt::Display for ExprError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for ExprError {}

type ExprResult<T> = std::result::Result<T, ExprError>;

// --- Lexer ---

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Int(i64),
    Float(f64),
    Str(String),
    Ident(String),
    This,
    LParen,
    RParen,
    Comma,
    Not,
    Minus,
    And,
    Or,
    Op(CompareOp),
}

struct Lexer<'a> {
    input: &'a str,
    chars: Peekable<CharIndices<'a>>,
}

impl<'a> Lexer<'a> {
    fn new(input: &'a str) -> Self {
        Self {
            input,
            chars: input.char_indices().peekable(),
        }
    }

    fn tokenize(mut self) -> ExprResult<Vec<Token>> {
        let mut tokens = Vec::new();
        while let Some(&(pos, c)) = self.chars.peek() {
            if c.is_whitespace() {
                self.chars.next();
                continue;
            }
            let token = match c {
                '(' => self.single(Token::LParen),
                ')' => self.single(Token::RParen),
                ',' => self.single(Token::Comma),
                '-' => self.single(Token::Minus),
                '\'' | '"' => self.string(c),
                '0'..='9' | '.' => self.number(pos),
                '$' => self.this(pos),
                '&' => self.pair('&', Token::And),
                '|' => self.pair('|', Token::Or),
                '!' | '=' | '<' | '>' | '≥' | '≤' | '≠' => self.operator(pos),
                c if c.is_alphabetic() || c == '_' => self.word(pos),
                other => {
                    return Err(ExprError::new(format!(
                        "unexpected character '{}' at offset {}",
                        other, pos
                    )))
                }
            };
            tokens.push(token?);
        }
        Ok(tokens)
    }

    fn single(&mut self, token: Token) -> ExprResult<Token> {
        self.chars.next();
        Ok(token)
    }

    fn pair(&mut self, c: char, token: Token) -> ExprResult<Token> {
        self.chars.next();
        match self.chars.next() {
            Some((_, next)) if next == c => Ok(token),
            _ => Err(ExprError::new(format!("expected '{}{}'", c, c))),
        }
    }

    fn string(&mut self, quote: char) -> ExprResult<Token> {
        self.chars.next();
        let mut value = String::new();
        while let Some((_, c)) = self.chars.next() {
            match c {
                '\\' => match self.chars.next() {
                    Some((_, escaped)) if escaped == quote || escaped == '\\' => {
                        value.push(escaped)
                    }
                    Some((_, other)) => {
                        value.push('\\');
                        value.push(other);
                    }
                    None => break,
                },
                c if c == quote => return Ok(Token::Str(value)),
                c => value.push(c),
            }
        }
        Err(ExprError::new("unterminated string literal"))
    }

    fn number(&mut self, start: usize) -> ExprResult<Token> {
        let mut end = start;
        let mut is_float = false;
        while let Some(&(pos, c)) = self.chars.peek() {
            if c.is_ascii_digit() {
                end = pos + 1;
            } else if c == '.' && !is_float {
                is_float = true;
                end = pos + 1;
            } else {
                break;
            }
            self.chars.next();
        }
        let text = &self.input[start..end];
        if is_float {
            text.parse::<f64>()
                .map(Token::Float)
                .map_err(|_| ExprError::new(format!("invalid number '{}'", text)))
        } else {
            text.parse::<i64>()
                .map(Token::Int)
                .map_err(|_| ExprError::new(format!("invalid number '{}'", text)))
        }
    }

    fn this(&mut self, start: usize) -> ExprResult<Token> {
        const THIS: &str = "$this->";
        if self.input[start..].starts_with(THIS) {
            for _ in 0..THIS.len() {
                self.chars.next();
            }
            Ok(Token::This)
        } else {
            Err(ExprError::new(format!(
                "variables are not supported (offset {})",
                start
            )))
        }
    }

    fn operator(&mut self, start: usize) -> ExprResult<Token> {
        let rest = &self.input[start..];
        let (op, len) = [
            ("===", CompareOp::Identical),
            ("!==", CompareOp::NotIdentical),
            ("==", CompareOp::Loose(Comparator::Equal)),
            ("!=", CompareOp::Loose(Comparator::NotEqual)),
            ("<>", CompareOp::Loose(Comparator::NotEqual)),
            ("<=", CompareOp::Loose(Comparator::LessOrEqual)),
            (">=", CompareOp::Loose(Comparator::GreaterOrEqual)),
            ("<", CompareOp::Loose(Comparator::Less)),
            (">", CompareOp::Loose(Comparator::Greater)),
            ("≤", CompareOp::Loose(Comparator::LessOrEqual)),
            ("≥", CompareOp::Loose(Comparator::GreaterOrEqual)),
            ("≠", CompareOp::Loose(Comparator::NotEqual)),
        ]
        .into_iter()
        .find(|(text, _)| rest.starts_with(text))
        .map(|(text, op)| (Token::Op(op), text.chars().count()))
        .unwrap_or_else(|| {
            if rest.starts_with('!') {
                (Token::Not, 1)
            } else {
                // A lone '=' is assignment, which the grammar does not have.
                (Token::Op(CompareOp::Loose(Comparator::Equal)), 0)
            }
        });

        if len == 0 {
            return Err(ExprError::new(format!(
                "assignment is not supported (offset {})",
                start
            )));
        }
        for _ in 0..len {
            self.chars.next();
        }
        Ok(op)
    }

    fn word(&mut self, start: usize) -> ExprResult<Token> {
        let mut end = start;
        while let Some(&(pos, c)) = self.chars.peek() {
            if c.is_alphanumeric() || c == '_' {
                end = pos + c.len_utf8();
                self.chars.next();
            } else {
                break;
            }
        }
        let word = &self.input[start..end];
        Ok(match word.to_ascii_lowercase().as_str() {
            "true" => Token::Ident("true".into()),
            "false" => Token::Ident("false".into()),
            "null" => Token::Ident("null".into()),
            "and" => Token::And,
            "or" => Token::Or,
            "not" => Token::Not,
            _ => Token::Ident(word.to_string()),
        })
    }
}

// --- Parser ---

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn advance(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).cloned();
        self.pos += 1;
        token
    }

    fn expect(&mut self, expected: Token, what: &str) -> ExprResult<()> {
        match self.advance() {
            Some(token) if token == expected => Ok(()),
            Some(token) => Err(ExprError::new(format!(
                "expected {}, found {:?}",
                what, token
            ))),
            None => Err(ExprError::new(format!(
                "expected {}, found end of expression",
                what
            ))),
        }
    }

    fn parse_or(&mut self) -> ExprResult<Expr> {
        let mut left = self.parse_and()?;
        while self.peek() == Some(&Token::Or) {
            self.advance();
            let right = self.parse_and()?;
            left = Expr::Or(Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    fn parse_and(&mut self) -> ExprResult<Expr> {
        let mut left = self.parse_compare()?;
        while self.peek() == Some(&Token::And) {
            self.advance();
            let right = self.parse_compare()?;
            left = Expr::And(Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    fn parse_compare(&mut self) -> ExprResult<Expr> {
        let left = self.parse_unary()?;
        if let Some(Token::Op(op)) = self.peek().cloned() {
            self.advance();
            let right = self.parse_unary()?;
            if matches!(self.peek(), Some(Token::Op(_))) {
                return Err(ExprError::new("chained comparisons need parentheses"));
            }
            return Ok(Expr::Compare(op, Box::new(left), Box::new(right)));
        }
        Ok(left)
    }

    fn parse_unary(&mut self) -> ExprResult<Expr> {
        match self.peek() {
            Some(Token::Not) => {
                self.advance();
                Ok(Expr::Not(Box::new(self.parse_unary()?)))
            }
            Some(Token::Minus) => {
                self.advance();
                Ok(Expr::Negate(Box::new(self.parse_unary()?)))
            }
            _ => self.parse_primary(),
        }
    }

    fn parse_primary(&mut self) -> ExprResult<Expr> {
        match self.advance() {
            Some(Token::Int(i)) => Ok(Expr::Literal(Value::Int(i))),
            Some(Token::Float(f)) => Ok(Expr::Literal(Value::Float(f))),
            Some(Token::Str(s)) => Ok(Expr::Literal(Value::Str(s))),
            Some(Token::LParen) => {
                let inner = self.parse_or()?;
                self.expect(Token::RParen, "')'")?;
                Ok(inner)
            }
            Some(Token::This) => match self.advance() {
                Some(Token::Ident(name)) => self.parse_call(name),
                _ => Err(ExprError::new("expected a method name after '$this->'")),
            },
            Some(Token::Ident(name)) => {
                let literal = match name.as_str() {
                    "true" => Some(Value::Bool(true)),
                    "false" => Some(Value::Bool(false)),
                    "null" => Some(Value::Null),
                    _ => None,
                };
                match literal {
                    Some(value) => Ok(Expr::Literal(value)),
                    None => self.parse_call(name),
                }
            }
            Some(token) => Err(ExprError::new(format!("unexpected {:?}", token))),
            None => Err(ExprError::new("unexpected end of expression")),
        }
    }

    fn parse_call(&mut self, name: String) -> ExprResult<Expr> {
        self.expect(Token::LParen, &format!("'(' after '{}'", name))?;
        let mut args = Vec::new();
        if self.peek() == Some(&Token::RParen) {
            self.advance();
            return Ok(Expr::Call { name, args });
        }
        loop {
            args.push(self.parse_or()?);
            match self.advance() {
                Some(Token::Comma) => continue,
                Some(Token::RParen) => break,
                Some(token) => {
                    return Err(ExprError::new(format!(
                        "expected ',' or ')' in call to '{}', found {:?}",
                        name, token
                    )))
                }
                None => {
                    return Err(ExprError::new(format!(
                        "unclosed call to '{}'",
                        name
                    )))
                }
            }
        }
        Ok(Expr::Call { name, args })
    }
}

/// Parse an expression.
pub fn parse(expression: &str) -> ExprResult<Expr> {
    let tokens = Lexer::new(expression).tokenize()?;
    if tokens.is_empty() {
        return Err(ExprError::new("empty expression"));
    }
    let mut parser = Parser { tokens, pos: 0 };
    let expr = parser.parse_or()?;
    if let Some(token) = parser.peek() {
        return Err(ExprError::new(format!(
            "unexpected {:?} after end of expression",
            token
        )));
    }
    Ok(expr)
}

// --- Evaluation ---

impl Expr {
    /// Evaluate against the given predicates.
    pub fn eval(&self, predicates: &Predicates<'_>) -> ExprResult<Value> {
        match self {
            Expr::Literal(value) => Ok(value.clone()),
            Expr::Not(inner) => Ok(Value::Bool(!inner.eval(predicates)?.truthy())),
            Expr::Negate(inner) => match inner.eval(predicates)? {
                Value::Int(i) => i
                    .checked_neg()
                    .map(Value::Int)
                    .ok_or_else(|| ExprError::new("integer overflow in negation")),
                Value::Float(f) => Ok(Value::Float(-f)),
                other => Err(ExprError::new(format!(
                    "cannot negate a {}",
                    other.type_name()
                ))),
            },
            Expr::And(left, right) => Ok(Value::Bool(
                left.eval(predicates)?.truthy() && right.eval(predicates)?.truthy(),
            )),
            Expr::Or(left, right) => Ok(Value::Bool(
                left.eval(predicates)?.truthy() || right.eval(predicates)?.truthy(),
            )),
            Expr::Compare(op, left, right) => {
                let left = left.eval(predicates)?;
                let right = right.eval(predicates)?;
                Ok(Value::Bool(compare_values(*op, &left, &right)))
            }
            Expr::Call { name, args } => {
                let args = args
                    .iter()
                    .map(|arg| arg.eval(predicates))
                    .collect::<ExprResult<Vec<_>>>()?;
                call(name, &args, predicates)
            }
        }
    }
}

fn compare_values(op: CompareOp, left: &Value, right: &Value) -> bool {
    match op {
        CompareOp::Identical => identical(left, right),
        CompareOp::NotIdentical => !identical(left, right),
        CompareOp::Loose(comparator) => comparator.matches(loose_order(left, right)),
    }
}

fn identical(left: &Value, right: &Value) -> bool {
    match (left, right) {
        (Value::Float(a), Value::Float(b)) => a == b,
        _ => left == right,
    }
}

fn loose_order(left: &Value, right: &Value) -> Ordering {
    match (left, right) {
        (Value::Bool(_) | Value::Null, _) | (_, Value::Bool(_) | Value::Null) => {
            left.truthy().cmp(&right.truthy())
        }
        (Value::Int(a), Value::Int(b)) => a.cmp(b),
        (Value::Str(a), Value::Str(b)) => match (parse_numeric(a), parse_numeric(b)) {
            (Some(x), Some(y)) => x.partial_cmp(&y).unwrap_or(Ordering::Equal),
            _ => a.cmp(b),
        },
        _ => match (left.as_number(), right.as_number()) {
            (Some(x), Some(y)) => x.partial_cmp(&y).unwrap_or(Ordering::Equal),
            _ => left.to_string().cmp(&right.to_string()),
        },
    }
}

fn arity(name: &str, args: &[Value], min: usize, max: usize) -> ExprResult<()> {
    if args.len() < min || args.len() > max {
        let expected = if min == max {
            min.to_string()
        } else {
            format!("{} to {}", min, max)
        };
        return Err(ExprError::new(format!(
            "{}() takes {} argument(s), {} given",
            name,
            expected,
            args.len()
        )));
    }
    Ok(())
}

fn text_arg(name: &str, value: &Value) -> ExprResult<String> {
    match value {
        Value::Str(_) | Value::Int(_) | Value::Float(_) => Ok(value.to_string()),
        other => Err(ExprError::new(format!(
            "{}() expects a string argument, {} given",
            name,
            other.type_name()
        ))),
    }
}

fn optional_text_arg(name: &str, value: Option<&Value>) -> ExprResult<Option<String>> {
    match value {
        None | Some(Value::Null) => Ok(None),
        Some(value) => text_arg(name, value).map(Some),
    }
}

fn comparator_arg(name: &str, value: Option<&Value>) -> ExprResult<Comparator> {
    match value {
        None => Ok(Comparator::default()),
        Some(value) => text_arg(name, value)?
            .parse()
            .map_err(|e| ExprError::new(format!("{}(): {}", name, e))),
    }
}

fn call(name: &str, args: &[Value], p: &Predicates<'_>) -> ExprResult<Value> {
    match name {
        "extension_loaded" => {
            arity(name, args, 1, 1)?;
            Ok(Value::Bool(p.extension_loaded(&text_arg(name, &args[0])?)))
        }
        "extension_version" | "checkPhpExtensionVersion" => {
            arity(name, args, 2, 3)?;
            let extension = text_arg(name, &args[0])?;
            let version = text_arg(name, &args[1])?;
            let comparator = comparator_arg(name, args.get(2))?;
            Ok(Value::Bool(p.extension_version_satisfies(
                &extension, &version, comparator,
            )))
        }
        "ini_on" | "checkPhpIniOn" => {
            arity(name, args, 1, 1)?;
            Ok(Value::Bool(p.ini_on(&text_arg(name, &args[0])?)))
        }
        "ini_off" | "checkPhpIniOff" => {
            arity(name, args, 1, 1)?;
            Ok(Value::Bool(p.ini_off(&text_arg(name, &args[0])?)))
        }
        "ini_get" => {
            arity(name, args, 1, 1)?;
            Ok(p
                .ini_value(&text_arg(name, &args[0])?)
                .map_or(Value::Bool(false), Value::Str))
        }
        "compare_byte_size" | "compareByteSize" => {
            arity(name, args, 2, 3)?;
            let a = text_arg(name, &args[0])?;
            let b = text_arg(name, &args[1])?;
            let comparator = comparator_arg(name, args.get(2))?;
            Ok(Value::Bool(p.compare_byte_size(&a, &b, comparator)))
        }
        "byte_size" | "getByteSize" => {
            arity(name, args, 1, 1)?;
            Ok(Value::Int(parse_bytes(&text_arg(name, &args[0])?)))
        }
        "upload_max_file_size" | "checkUploadMaxFileSize" => {
            arity(name, args, 0, 2)?;
            let min = optional_text_arg(name, args.first())?;
            let max = optional_text_arg(name, args.get(1))?;
            Ok(Value::Bool(
                p.upload_max_file_size_in_range(min.as_deref(), max.as_deref()),
            ))
        }
        _ => Err(ExprError::new(format!("unknown function '{}'", name))),
    }
}

/// Parse and evaluate an expression to a boolean.
///
/// Parse and evaluation failures become [`AuditError::Evaluation`].
pub fn evaluate(expression: &str, predicates: &Predicates<'_>) -> Result<bool> {
    let to_error = |e: ExprError| AuditError::Evaluation {
        expression: expression.to_string(),
        message: e.message,
    };
    let expr = parse(expression).map_err(to_error)?;
    let value = expr.eval(predicates).map_err(to_error)?;
    tracing::trace!("Evaluated '{}' to {:?}", expression, value);
    Ok(value.truthy())
}
