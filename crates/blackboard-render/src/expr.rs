//! Expression parser and evaluator for graph plots.
//!
//! Grammar (lowest precedence first):
//!
//! ```text
//! expr    := term (('+' | '-') term)*
//! term    := unary (('*' | '/') unary | unary)*     juxtaposition multiplies
//! unary   := ('-' | '+') unary | power
//! power   := primary ('^' unary)?                   right associative
//! primary := number | 'x' | constant | func '(' expr ')' | '(' expr ')'
//! ```

use std::fmt;
use thiserror::Error;

/// Expression parse errors.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ExprError {
    #[error("Empty expression")]
    Empty,
    #[error("Unexpected character '{0}' at {1}")]
    UnexpectedChar(char, usize),
    #[error("Unexpected {0}")]
    UnexpectedToken(String),
    #[error("Unexpected end of expression")]
    UnexpectedEnd,
    #[error("Unknown identifier '{0}'")]
    UnknownIdentifier(String),
    #[error("Invalid number '{0}'")]
    InvalidNumber(String),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Func {
    Sin,
    Cos,
    Tan,
    Asin,
    Acos,
    Atan,
    Sqrt,
    Abs,
    Ln,
    Log,
    Exp,
    Floor,
    Ceil,
}

impl Func {
    fn from_name(name: &str) -> Option<Self> {
        Some(match name {
            "sin" => Func::Sin,
            "cos" => Func::Cos,
            "tan" => Func::Tan,
            "asin" | "arcsin" => Func::Asin,
            "acos" | "arccos" => Func::Acos,
            "atan" | "arctan" => Func::Atan,
            "sqrt" => Func::Sqrt,
            "abs" => Func::Abs,
            "ln" => Func::Ln,
            "log" => Func::Log,
            "exp" => Func::Exp,
            "floor" => Func::Floor,
            "ceil" => Func::Ceil,
            _ => return None,
        })
    }

    fn apply(self, v: f64) -> f64 {
        match self {
            Func::Sin => v.sin(),
            Func::Cos => v.cos(),
            Func::Tan => v.tan(),
            Func::Asin => v.asin(),
            Func::Acos => v.acos(),
            Func::Atan => v.atan(),
            Func::Sqrt => v.sqrt(),
            Func::Abs => v.abs(),
            Func::Ln => v.ln(),
            Func::Log => v.log10(),
            Func::Exp => v.exp(),
            Func::Floor => v.floor(),
            Func::Ceil => v.ceil(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
    Pow,
}

/// Parsed expression tree in one variable `x`.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Number(f64),
    X,
    Neg(Box<Expr>),
    Binary(BinOp, Box<Expr>, Box<Expr>),
    Call(Func, Box<Expr>),
}

impl Expr {
    /// Parse an expression. A leading `y =` or `f(x) =` is ignored.
    pub fn parse(source: &str) -> Result<Self, ExprError> {
        let body = strip_assignment(source);
        let tokens = tokenize(body)?;
        if tokens.is_empty() {
            return Err(ExprError::Empty);
        }
        let mut parser = Parser { tokens, pos: 0 };
        let expr = parser.expr()?;
        match parser.peek() {
            None => Ok(expr),
            Some(token) => Err(ExprError::UnexpectedToken(token.to_string())),
        }
    }

    /// Evaluate at `x`. Domain errors yield NaN or infinities.
    pub fn eval(&self, x: f64) -> f64 {
        match self {
            Expr::Number(v) => *v,
            Expr::X => x,
            Expr::Neg(inner) => -inner.eval(x),
            Expr::Binary(op, lhs, rhs) => {
                let (a, b) = (lhs.eval(x), rhs.eval(x));
                match op {
                    BinOp::Add => a + b,
                    BinOp::Sub => a - b,
                    BinOp::Mul => a * b,
                    BinOp::Div => a / b,
                    BinOp::Pow => a.powf(b),
                }
            }
            Expr::Call(func, arg) => func.apply(arg.eval(x)),
        }
    }
}

fn strip_assignment(source: &str) -> &str {
    let trimmed = source.trim();
    match trimmed.split_once('=') {
        Some((lhs, rhs)) => {
            let lhs = lhs.trim().to_ascii_lowercase();
            if lhs == "y" || lhs == "f(x)" {
                rhs
            } else {
                trimmed
            }
        }
        None => trimmed,
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Number(f64),
    Ident(String),
    Op(char),
    LParen,
    RParen,
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Number(v) => write!(f, "number {}", v),
            Token::Ident(name) => write!(f, "identifier '{}'", name),
            Token::Op(c) => write!(f, "operator '{}'", c),
            Token::LParen => f.write_str("'('"),
            Token::RParen => f.write_str("')'"),
        }
    }
}

fn tokenize(source: &str) -> Result<Vec<Token>, ExprError> {
    let chars: Vec<char> = source.chars().collect();
    let mut tokens = Vec::new();
    let mut i = 0;
    while i < chars.len() {
        let c = chars[i];
        match c {
            _ if c.is_whitespace() => i += 1,
            '0'..='9' | '.' => {
                let start = i;
                while i < chars.len() && (chars[i].is_ascii_digit() || chars[i] == '.') {
                    i += 1;
                }
                let text: String = chars[start..i].iter().collect();
                let value = text
                    .parse::<f64>()
                    .map_err(|_| ExprError::InvalidNumber(text.clone()))?;
                tokens.push(Token::Number(value));
            }
            _ if c.is_alphabetic() => {
                let start = i;
                while i < chars.len() && chars[i].is_alphanumeric() {
                    i += 1;
                }
                let name: String = chars[start..i].iter().collect();
                tokens.push(Token::Ident(name.to_lowercase()));
            }
            '+' | '-' | '/' | '^' => {
                tokens.push(Token::Op(c));
                i += 1;
            }
            '*' => {
                // `**` is accepted as power
                if chars.get(i + 1) == Some(&'*') {
                    tokens.push(Token::Op('^'));
                    i += 2;
                } else {
                    tokens.push(Token::Op('*'));
                    i += 1;
                }
            }
            '(' => {
                tokens.push(Token::LParen);
                i += 1;
            }
            ')' => {
                tokens.push(Token::RParen);
                i += 1;
            }
            _ => return Err(ExprError::UnexpectedChar(c, i)),
        }
    }
    Ok(tokens)
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn next(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).cloned();
        self.pos += 1;
        token
    }

    fn eat_op(&mut self, op: char) -> bool {
        if self.peek() == Some(&Token::Op(op)) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn expr(&mut self) -> Result<Expr, ExprError> {
        let mut lhs = self.term()?;
        loop {
            let op = if self.eat_op('+') {
                BinOp::Add
            } else if self.eat_op('-') {
                BinOp::Sub
            } else {
                return Ok(lhs);
            };
            let rhs = self.term()?;
            lhs = Expr::Binary(op, Box::new(lhs), Box::new(rhs));
        }
    }

    fn term(&mut self) -> Result<Expr, ExprError> {
        let mut lhs = self.unary()?;
        loop {
            let op = if self.eat_op('*') {
                BinOp::Mul
            } else if self.eat_op('/') {
                BinOp::Div
            } else if matches!(
                self.peek(),
                Some(Token::Number(_) | Token::Ident(_) | Token::LParen)
            ) {
                BinOp::Mul
            } else {
                return Ok(lhs);
            };
            let rhs = self.unary()?;
            lhs = Expr::Binary(op, Box::new(lhs), Box::new(rhs));
        }
    }

    fn unary(&mut self) -> Result<Expr, ExprError> {
        if self.eat_op('-') {
            return Ok(Expr::Neg(Box::new(self.unary()?)));
        }
        if self.eat_op('+') {
            return self.unary();
        }
        self.power()
    }

    fn power(&mut self) -> Result<Expr, ExprError> {
        let base = self.primary()?;
        if self.eat_op('^') {
            let exponent = self.unary()?;
            return Ok(Expr::Binary(BinOp::Pow, Box::new(base), Box::new(exponent)));
        }
        Ok(base)
    }

    fn primary(&mut self) -> Result<Expr, ExprError> {
        match self.next() {
            Some(Token::Number(v)) => Ok(Expr::Number(v)),
            Some(Token::LParen) => {
                let inner = self.expr()?;
                self.expect_rparen()?;
                Ok(inner)
            }
            Some(Token::Ident(name)) => match name.as_str() {
                "x" => Ok(Expr::X),
                "pi" => Ok(Expr::Number(std::f64::consts::PI)),
                "e" => Ok(Expr::Number(std::f64::consts::E)),
                _ => {
                    let func =
                        Func::from_name(&name).ok_or(ExprError::UnknownIdentifier(name.clone()))?;
                    match self.next() {
                        Some(Token::LParen) => {}
                        Some(token) => return Err(ExprError::UnexpectedToken(token.to_string())),
                        None => return Err(ExprError::UnexpectedEnd),
                    }
                    let arg = self.expr()?;
                    self.expect_rparen()?;
                    Ok(Expr::Call(func, Box::new(arg)))
                }
            },
            Some(token) => Err(ExprError::UnexpectedToken(token.to_string())),
            None => Err(ExprError::UnexpectedEnd),
        }
    }

    fn expect_rparen(&mut self) -> Result<(), ExprError> {
        match self.next() {
            Some(Token::RParen) => Ok(()),
            Some(token) => Err(ExprError::UnexpectedToken(token.to_string())),
            None => Err(ExprError::UnexpectedEnd),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn eval(source: &str, x: f64) -> f64 {
        Expr::parse(source).unwrap().eval(x)
    }

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_precedence() {
        assert!(close(eval("1 + 2 * 3", 0.0), 7.0));
        assert!(close(eval("(1 + 2) * 3", 0.0), 9.0));
        assert!(close(eval("2 ^ 3 ^ 2", 0.0), 512.0));
        assert!(close(eval("-x^2", 3.0), -9.0));
        assert!(close(eval("2^-1", 0.0), 0.5));
        assert!(close(eval("10 - 4 - 3", 0.0), 3.0));
        assert!(close(eval("x ** 2", 4.0), 16.0));
    }

    #[test]
    fn test_implicit_multiplication() {
        assert!(close(eval("2x", 5.0), 10.0));
        assert!(close(eval("3sin(x)", std::f64::consts::FRAC_PI_2), 3.0));
        assert!(close(eval("(x+1)(x-1)", 3.0), 8.0));
        assert!(close(eval("2pi", 0.0), 2.0 * std::f64::consts::PI));
        assert!(close(eval("2x^2", 3.0), 18.0));
    }

    #[test]
    fn test_functions_and_constants() {
        assert!(close(eval("sqrt(x)", 16.0), 4.0));
        assert!(close(eval("abs(x)", -2.5), 2.5));
        assert!(close(eval("ln(e)", 0.0), 1.0));
        assert!(close(eval("log(1000)", 0.0), 3.0));
        assert!(close(eval("floor(x) + ceil(x)", 1.5), 3.0));
        assert!(close(eval("exp(0)", 0.0), 1.0));
        assert!(close(eval("atan(1) * 4", 0.0), std::f64::consts::PI));
        assert!(close(eval("SIN(0)", 0.0), 0.0));
    }

    #[test]
    fn test_assignment_prefix() {
        assert!(close(eval("y = x + 1", 1.0), 2.0));
        assert!(close(eval("f(x) = 2x", 2.0), 4.0));
    }

    #[test]
    fn test_domain_errors_are_not_finite() {
        assert!(eval("sqrt(x)", -1.0).is_nan());
        assert!(eval("1/x", 0.0).is_infinite());
        assert!(eval("ln(x)", 0.0).is_infinite());
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!(Expr::parse("   "), Err(ExprError::Empty));
        assert_eq!(Expr::parse("1 +"), Err(ExprError::UnexpectedEnd));
        assert_eq!(Expr::parse("(x"), Err(ExprError::UnexpectedEnd));
        assert_eq!(Expr::parse("x $ 2"), Err(ExprError::UnexpectedChar('$', 2)));
        assert_eq!(
            Expr::parse("foo(x)"),
            Err(ExprError::UnknownIdentifier("foo".to_string()))
        );
        assert!(matches!(Expr::parse("sin x"), Err(ExprError::UnexpectedToken(_))));
        assert!(matches!(Expr::parse("1..2"), Err(ExprError::InvalidNumber(_))));
        assert!(matches!(Expr::parse("x)"), Err(ExprError::UnexpectedToken(_))));
    }
}
