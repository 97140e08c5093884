//! Restricted arithmetic evaluator.
//!
//! A hand-written tokenizer and recursive-descent parser that evaluates as it
//! parses. Only numeric literals, a fixed operator set, two constants and an
//! allow-listed set of functions are understood; anything else is an error.
//!
//! Grammar, loosest binding first:
//!
//! ```text
//! expression := term (("+" | "-") term)*
//! term       := unary (("*" | "/" | "%") unary)*
//! unary      := ("+" | "-") unary | power
//! power      := atom ("**" unary)?
//! atom       := NUMBER | NAME | NAME "(" arguments? ")" | "(" expression ")"
//! ```
//!
//! `^` is read as `**`. Because `power` takes a `unary` on its right and
//! `unary` wraps `power`, exponentiation is right-associative and binds
//! tighter than a leading minus: `-2 ** 2` is `-4`, `2 ** -1` is `0.5`.

use std::f64::consts::{E, PI};
use std::iter::Peekable;
use std::str::CharIndices;

use thiserror::Error;

/// Longest accepted expression, in bytes.
pub const MAX_EXPRESSION_LEN: usize = 1024;

/// Deepest accepted nesting of unary operators and parentheses.
pub const MAX_DEPTH: usize = 64;

/// Reasons an expression is rejected.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CalcError {
    #[error("expression is empty")]
    Empty,

    #[error("expression is {len} bytes long, the limit is {}", MAX_EXPRESSION_LEN)]
    TooLong { len: usize },

    #[error("expression is nested deeper than {} levels", MAX_DEPTH)]
    TooDeep,

    #[error("unexpected character '{ch}' at position {pos}")]
    UnexpectedChar { ch: char, pos: usize },

    #[error("malformed number '{0}'")]
    InvalidNumber(String),

    #[error("unexpected {0}")]
    UnexpectedToken(String),

    #[error("unexpected end of expression")]
    UnexpectedEnd,

    #[error("unknown name '{0}'")]
    UnknownName(String),

    #[error("'{0}' is a function and must be called")]
    NotAConstant(String),

    #[error("'{0}' is a constant, not a function")]
    NotCallable(String),

    #[error("{name}() takes {expected} argument(s), got {found}")]
    Arity {
        name: String,
        expected: &'static str,
        found: usize,
    },

    #[error("division by zero")]
    DivisionByZero,

    #[error("math domain error in {0}")]
    Domain(String),

    #[error("result is not a finite number")]
    NonFinite,
}

type CalcResult<T> = Result<T, CalcError>;

/// Evaluate an arithmetic expression.
pub fn evaluate(input: &str) -> CalcResult<f64> {
    if input.len() > MAX_EXPRESSION_LEN {
        return Err(CalcError::TooLong { len: input.len() });
    }

    let tokens = tokenize(input)?;
    if tokens.is_empty() {
        return Err(CalcError::Empty);
    }

    let mut parser = Parser {
        tokens,
        pos: 0,
        depth: 0,
    };
    let value = parser.expression()?;
    if let Some(token) = parser.peek() {
        return Err(CalcError::UnexpectedToken(token.describe()));
    }
    finite(value)
}

// ============================================================================
// Tokenizer
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Number(f64),
    Name(String),
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    Power,
    LParen,
    RParen,
    Comma,
}

impl Token {
    fn describe(&self) -> String {
        match self {
            Self::Number(n) => format!("number {n}"),
            Self::Name(name) => format!("name '{name}'"),
            Self::Plus => "'+'".into(),
            Self::Minus => "'-'".into(),
            Self::Star => "'*'".into(),
            Self::Slash => "'/'".into(),
            Self::Percent => "'%'".into(),
            Self::Power => "'**'".into(),
            Self::LParen => "'('".into(),
            Self::RParen => "')'".into(),
            Self::Comma => "','".into(),
        }
    }
}

fn tokenize(input: &str) -> CalcResult<Vec<Token>> {
    let mut tokens = Vec::new();
    let mut chars = input.char_indices().peekable();

    while let Some(&(pos, ch)) = chars.peek() {
        let token = match ch {
            c if c.is_whitespace() => {
                chars.next();
                continue;
            }
            c if c.is_ascii_digit() || c == '.' => number(input, &mut chars)?,
            c if c.is_ascii_alphabetic() || c == '_' => {
                let start = pos;
                let mut end = pos;
                while let Some(&(i, c)) = chars.peek() {
                    if !(c.is_ascii_alphanumeric() || c == '_') {
                        break;
                    }
                    end = i + c.len_utf8();
                    chars.next();
                }
                Token::Name(input[start..end].to_string())
            }
            '*' => {
                chars.next();
                if matches!(chars.peek(), Some(&(_, '*'))) {
                    chars.next();
                    Token::Power
                } else {
                    Token::Star
                }
            }
            _ => {
                chars.next();
                match ch {
                    '+' => Token::Plus,
                    '-' => Token::Minus,
                    '/' => Token::Slash,
                    '%' => Token::Percent,
                    '^' => Token::Power,
                    '(' => Token::LParen,
                    ')' => Token::RParen,
                    ',' => Token::Comma,
                    _ => return Err(CalcError::UnexpectedChar { ch, pos }),
                }
            }
        };
        tokens.push(token);
    }

    Ok(tokens)
}

/// Scan a decimal literal with optional fraction and exponent.
fn number(input: &str, chars: &mut Peekable<CharIndices<'_>>) -> CalcResult<Token> {
    let start = chars.peek().map_or(input.len(), |&(i, _)| i);
    let mut end = start;

    take_digits(chars, &mut end);
    if let Some(&(i, '.')) = chars.peek() {
        end = i + 1;
        chars.next();
        take_digits(chars, &mut end);
    }

    // Only treat `e` as an exponent when digits follow; otherwise it is left
    // for the name scanner (and `2e` then fails as a stray name).
    let rest = &input[end..];
    let exponent_len = exponent_length(rest);
    if exponent_len > 0 {
        for _ in 0..exponent_len {
            chars.next();
        }
        end += exponent_len;
    }

    let literal = &input[start..end];
    literal
        .parse::<f64>()
        .map(Token::Number)
        .map_err(|_| CalcError::InvalidNumber(literal.to_string()))
}

fn take_digits(chars: &mut Peekable<CharIndices<'_>>, end: &mut usize) {
    while let Some(&(i, c)) = chars.peek() {
        if !c.is_ascii_digit() {
            break;
        }
        *end = i + 1;
        chars.next();
    }
}

/// Byte length of an exponent suffix (`e10`, `E-3`) at the start of `rest`.
fn exponent_length(rest: &str) -> usize {
    let bytes = rest.as_bytes();
    if !matches!(bytes.first(), Some(b'e' | b'E')) {
        return 0;
    }
    let sign = usize::from(matches!(bytes.get(1), Some(b'+' | b'-')));
    let digits = bytes[1 + sign..]
        .iter()
        .take_while(|b| b.is_ascii_digit())
        .count();
    if digits == 0 { 0 } else { 1 + sign + digits }
}

// ============================================================================
// Parser
// ============================================================================

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    depth: usize,
}

impl Parser {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn advance(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).cloned();
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn eat(&mut self, expected: &Token) -> bool {
        if self.peek() == Some(expected) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn expect(&mut self, expected: &Token) -> CalcResult<()> {
        match self.advance() {
            Some(ref token) if token == expected => Ok(()),
            Some(token) => Err(CalcError::UnexpectedToken(token.describe())),
            None => Err(CalcError::UnexpectedEnd),
        }
    }

    fn expression(&mut self) -> CalcResult<f64> {
        let mut value = self.term()?;
        loop {
            if self.eat(&Token::Plus) {
                value += self.term()?;
            } else if self.eat(&Token::Minus) {
                value -= self.term()?;
            } else {
                return Ok(value);
            }
        }
    }

    fn term(&mut self) -> CalcResult<f64> {
        let mut value = self.unary()?;
        loop {
            if self.eat(&Token::Star) {
                value *= self.unary()?;
            } else if self.eat(&Token::Slash) {
                let divisor = self.unary()?;
                if divisor == 0.0 {
                    return Err(CalcError::DivisionByZero);
                }
                value /= divisor;
            } else if self.eat(&Token::Percent) {
                let divisor = self.unary()?;
                value = floored_mod(value, divisor)?;
            } else {
                return Ok(value);
            }
        }
    }

    fn unary(&mut self) -> CalcResult<f64> {
        self.depth += 1;
        if self.depth > MAX_DEPTH {
            return Err(CalcError::TooDeep);
        }

        let value = if self.eat(&Token::Minus) {
            self.unary().map(|v| -v)
        } else if self.eat(&Token::Plus) {
            self.unary()
        } else {
            self.power()
        };

        self.depth -= 1;
        value
    }

    fn power(&mut self) -> CalcResult<f64> {
        let base = self.atom()?;
        if !self.eat(&Token::Power) {
            return Ok(base);
        }
        let exponent = self.unary()?;
        if base == 0.0 && exponent < 0.0 {
            return Err(CalcError::DivisionByZero);
        }
        finite(base.powf(exponent))
    }

    fn atom(&mut self) -> CalcResult<f64> {
        match self.advance() {
            Some(Token::Number(n)) => Ok(n),
            Some(Token::LParen) => {
                let value = self.expression()?;
                self.expect(&Token::RParen)?;
                Ok(value)
            }
            Some(Token::Name(name)) => {
                if self.eat(&Token::LParen) {
                    let args = self.arguments()?;
                    call(&name, &args)
                } else {
                    constant(&name)
                }
            }
            Some(token) => Err(CalcError::UnexpectedToken(token.describe())),
            None => Err(CalcError::UnexpectedEnd),
        }
    }

    /// Comma-separated arguments up to and including the closing paren.
    fn arguments(&mut self) -> CalcResult<Vec<f64>> {
        let mut args = Vec::new();
        if self.eat(&Token::RParen) {
            return Ok(args);
        }
        loop {
            args.push(self.expression()?);
            if !self.eat(&Token::Comma) {
                break;
            }
        }
        self.expect(&Token::RParen)?;
        Ok(args)
    }
}

// ============================================================================
// Names
// ============================================================================

const FUNCTIONS: &[&str] = &[
    "sqrt", "sin", "cos", "tan", "log", "log10", "log2", "exp", "abs", "floor", "ceil", "round",
    "min", "max", "pow",
];

fn constant(name: &str) -> CalcResult<f64> {
    match name {
        "pi" => Ok(PI),
        "e" => Ok(E),
        _ if FUNCTIONS.contains(&name) => Err(CalcError::NotAConstant(name.to_string())),
        _ => Err(CalcError::UnknownName(name.to_string())),
    }
}

fn call(name: &str, args: &[f64]) -> CalcResult<f64> {
    let value = match name {
        "sqrt" => {
            let x = single(name, args)?;
            if x < 0.0 {
                return Err(CalcError::Domain(name.to_string()));
            }
            x.sqrt()
        }
        "sin" => single(name, args)?.sin(),
        "cos" => single(name, args)?.cos(),
        "tan" => single(name, args)?.tan(),
        "exp" => single(name, args)?.exp(),
        "abs" => single(name, args)?.abs(),
        "floor" => single(name, args)?.floor(),
        "ceil" => single(name, args)?.ceil(),
        "log10" => positive(name, single(name, args)?)?.log10(),
        "log2" => positive(name, single(name, args)?)?.log2(),
        "log" => {
            arity(name, args, 1, Some(2), "1 or 2")?;
            let x = positive(name, args[0])?;
            match args.get(1) {
                None => x.ln(),
                Some(&base) => {
                    let base = positive(name, base)?;
                    if base == 1.0 {
                        return Err(CalcError::DivisionByZero);
                    }
                    x.ln() / base.ln()
                }
            }
        }
        "round" => {
            arity(name, args, 1, Some(2), "1 or 2")?;
            round(args[0], args.get(1).copied())?
        }
        "min" => {
            arity(name, args, 1, None, "at least 1")?;
            args.iter().copied().fold(f64::INFINITY, f64::min)
        }
        "max" => {
            arity(name, args, 1, None, "at least 1")?;
            args.iter().copied().fold(f64::NEG_INFINITY, f64::max)
        }
        "pow" => {
            arity(name, args, 2, Some(2), "2")?;
            if args[0] == 0.0 && args[1] < 0.0 {
                return Err(CalcError::DivisionByZero);
            }
            args[0].powf(args[1])
        }
        "pi" | "e" => return Err(CalcError::NotCallable(name.to_string())),
        _ => return Err(CalcError::UnknownName(name.to_string())),
    };
    finite(value)
}

fn single(name: &str, args: &[f64]) -> CalcResult<f64> {
    arity(name, args, 1, Some(1), "1")?;
    Ok(args[0])
}

fn arity(
    name: &str,
    args: &[f64],
    min: usize,
    max: Option<usize>,
    expected: &'static str,
) -> CalcResult<()> {
    let found = args.len();
    if found < min || max.is_some_and(|max| found > max) {
        return Err(CalcError::Arity {
            name: name.to_string(),
            expected,
            found,
        });
    }
    Ok(())
}

fn positive(name: &str, x: f64) -> CalcResult<f64> {
    if x > 0.0 {
        Ok(x)
    } else {
        Err(CalcError::Domain(name.to_string()))
    }
}

/// Round half to even, optionally to `ndigits` decimal places.
fn round(x: f64, ndigits: Option<f64>) -> CalcResult<f64> {
    let Some(ndigits) = ndigits else {
        return Ok(x.round_ties_even());
    };
    if ndigits.fract() != 0.0 {
        return Err(CalcError::Domain("round".to_string()));
    }
    let digits = ndigits.clamp(-308.0, 308.0) as i32;
    let scale = 10f64.powi(digits.abs());
    if digits < 0 {
        return Ok((x / scale).round_ties_even() * scale);
    }
    if x == 0.0 {
        return Ok(x);
    }

    // An f64 carries at most 17 significant digits; past that x is already exact.
    let exact_digits = 17 - x.abs().log10().floor() as i32;
    let scaled = x * scale;
    if digits >= exact_digits || !scaled.is_finite() {
        return Ok(x);
    }
    Ok(scaled.round_ties_even() / scale)
}

/// Modulo whose result takes the sign of the divisor.
fn floored_mod(value: f64, divisor: f64) -> CalcResult<f64> {
    if divisor == 0.0 {
        return Err(CalcError::DivisionByZero);
    }
    let mut rem = value % divisor;
    if rem != 0.0 && (rem < 0.0) != (divisor < 0.0) {
        rem += divisor;
    }
    Ok(rem)
}

fn finite(value: f64) -> CalcResult<f64> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(CalcError::NonFinite)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn eval(input: &str) -> f64 {
        evaluate(input).unwrap()
    }

    fn assert_close(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() < 1e-9,
            "expected {expected}, got {actual}"
        );
    }

    #[test]
    fn test_precedence() {
        assert_eq!(eval("2 + 3 * 4"), 14.0);
        assert_eq!(eval("(2 + 3) * 4"), 20.0);
        assert_eq!(eval("10 - 4 - 3"), 3.0);
        assert_eq!(eval("7 / 2"), 3.5);
        assert_eq!(eval("sqrt(144) + 10 ** 2"), 112.0);
    }

    #[test]
    fn test_power_binding() {
        assert_eq!(eval("2 ** 3 ** 2"), 512.0);
        assert_eq!(eval("-2 ** 2"), -4.0);
        assert_eq!(eval("2 ** -1"), 0.5);
        assert_eq!(eval("2 ^ 10"), 1024.0);
        assert_eq!(eval("(-2) ** 2"), 4.0);
    }

    #[test]
    fn test_modulo_follows_divisor_sign() {
        assert_eq!(eval("7 % 3"), 1.0);
        assert_eq!(eval("-7 % 3"), 2.0);
        assert_eq!(eval("7 % -3"), -2.0);
        assert_eq!(eval("6 % 3"), 0.0);
    }

    #[test]
    fn test_number_literals() {
        assert_eq!(eval("1.5e3"), 1500.0);
        assert_eq!(eval(".5 + 2."), 2.5);
        assert_eq!(eval("2E-2"), 0.02);
        assert!(evaluate("1.2.3").is_err());
        assert!(evaluate("2e").is_err());
    }

    #[test]
    fn test_constants_and_functions() {
        assert_close(eval("pi"), PI);
        assert_close(eval("e"), E);
        assert_close(eval("sin(pi / 2)"), 1.0);
        assert_close(eval("cos(0)"), 1.0);
        assert_close(eval("log(e)"), 1.0);
        assert_close(eval("log(8, 2)"), 3.0);
        assert_close(eval("log10(1000)"), 3.0);
        assert_close(eval("log2(1024)"), 10.0);
        assert_close(eval("exp(0)"), 1.0);
        assert_eq!(eval("abs(-3)"), 3.0);
        assert_eq!(eval("floor(2.7) + ceil(2.1)"), 5.0);
        assert_eq!(eval("min(3, 1, 2)"), 1.0);
        assert_eq!(eval("max(3, 1, 2)"), 3.0);
        assert_eq!(eval("pow(2, 8)"), 256.0);
    }

    #[test]
    fn test_round_half_to_even() {
        assert_eq!(eval("round(2.5)"), 2.0);
        assert_eq!(eval("round(3.5)"), 4.0);
        assert_eq!(eval("round(0.125, 2)"), 0.12);
        assert_eq!(eval("round(1234, -2)"), 1200.0);
        assert_eq!(eval("round(1e300, 10)"), 1e300);
        assert_eq!(eval("round(-1e300, 2)"), -1e300);
        assert_eq!(eval("round(1.5, 400)"), 1.5);
        assert_eq!(eval("round(0.1, 300)"), 0.1);
        assert_eq!(eval("round(1e300, -400)"), 0.0);
    }

    #[test]
    fn test_rejects_code() {
        for input in [
            "__import__('os')",
            "open('x')",
            "x + 1",
            "sum(1, 2)",
            "1; 2",
            "[1, 2]",
            "1 if 1 else 0",
        ] {
            assert!(evaluate(input).is_err(), "{input} should be rejected");
        }
        assert_eq!(
            evaluate("__import__"),
            Err(CalcError::UnknownName("__import__".into()))
        );
    }

    #[test]
    fn test_arithmetic_errors() {
        assert_eq!(evaluate("1 / 0"), Err(CalcError::DivisionByZero));
        assert_eq!(evaluate("1 % 0"), Err(CalcError::DivisionByZero));
        assert_eq!(evaluate("0 ** -1"), Err(CalcError::DivisionByZero));
        assert!(matches!(evaluate("sqrt(-1)"), Err(CalcError::Domain(_))));
        assert!(matches!(evaluate("log(0)"), Err(CalcError::Domain(_))));
        assert_eq!(evaluate("10 ** 400"), Err(CalcError::NonFinite));
    }

    #[test]
    fn test_syntax_errors() {
        assert_eq!(evaluate(""), Err(CalcError::Empty));
        assert_eq!(evaluate("   "), Err(CalcError::Empty));
        assert_eq!(evaluate("1 +"), Err(CalcError::UnexpectedEnd));
        assert_eq!(evaluate("(1 + 2"), Err(CalcError::UnexpectedEnd));
        assert!(matches!(evaluate("1 2"), Err(CalcError::UnexpectedToken(_))));
        assert!(matches!(evaluate("sqrt(1, 2)"), Err(CalcError::Arity { .. })));
        assert!(matches!(evaluate("min()"), Err(CalcError::Arity { .. })));
        assert!(matches!(evaluate("sqrt + 1"), Err(CalcError::NotAConstant(_))));
        assert!(matches!(evaluate("pi(2)"), Err(CalcError::NotCallable(_))));
    }

    #[test]
    fn test_size_limits() {
        let long = "1+".repeat(MAX_EXPRESSION_LEN / 2) + "1";
        assert!(matches!(evaluate(&long), Err(CalcError::TooLong { .. })));

        let deep = format!("{}1{}", "(".repeat(100), ")".repeat(100));
        assert_eq!(evaluate(&deep), Err(CalcError::TooDeep));

        let shallow = format!("{}1{}", "(".repeat(10), ")".repeat(10));
        assert_eq!(eval(&shallow), 1.0);

        assert_eq!(evaluate(&"-".repeat(100)), Err(CalcError::TooDeep));
    }
}
