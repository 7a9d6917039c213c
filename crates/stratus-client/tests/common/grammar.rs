//! A minimal parser/evaluator for the filter grammar, so the in-memory
//! transport honors filter strings the way the real service would.

use std::cmp::Ordering;

use serde_json::Value;

use stratus_client::RowData;

#[derive(Debug, Clone, PartialEq)]
enum Tok {
    Ident(String),
    Str(String),
    Num(f64),
    DateTime(String),
    LParen,
    RParen,
}

#[derive(Debug, Clone)]
pub enum Pred {
    Or(Box<Pred>, Box<Pred>),
    And(Box<Pred>, Box<Pred>),
    Not(Box<Pred>),
    Cmp(Term, CmpOp, Term),
    Bool(bool),
}

#[derive(Debug, Clone)]
pub enum Term {
    Column(String),
    Str(String),
    Num(f64),
    Bool(bool),
    DateTime(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CmpOp {
    Eq,
    Ne,
    Gt,
    Ge,
    Lt,
    Le,
}

pub fn parse(input: &str) -> Result<Pred, String> {
    let tokens = tokenize(input)?;
    let mut parser = Parser { tokens, pos: 0 };
    let pred = parser.parse_or()?;
    if parser.pos != parser.tokens.len() {
        return Err(format!("trailing tokens at {}", parser.pos));
    }
    Ok(pred)
}

fn tokenize(input: &str) -> Result<Vec<Tok>, String> {
    let mut tokens = Vec::new();
    let mut chars = input.chars().peekable();

    while let Some(&c) = chars.peek() {
        match c {
            ' ' => {
                chars.next();
            }
            '(' => {
                chars.next();
                tokens.push(Tok::LParen);
            }
            ')' => {
                chars.next();
                tokens.push(Tok::RParen);
            }
            '\'' => {
                chars.next();
                tokens.push(Tok::Str(read_quoted(&mut chars)?));
            }
            c if c.is_ascii_digit() || c == '-' => {
                let mut text = String::new();
                while let Some(&d) = chars.peek() {
                    if d.is_ascii_digit() || d == '.' || d == '-' {
                        text.push(d);
                        chars.next();
                    } else {
                        break;
                    }
                }
                let n: f64 = text.parse().map_err(|_| format!("bad number '{text}'"))?;
                tokens.push(Tok::Num(n));
            }
            c if c.is_ascii_alphabetic() || c == '_' => {
                let mut ident = String::new();
                while let Some(&d) = chars.peek() {
                    if d.is_ascii_alphanumeric() || d == '_' {
                        ident.push(d);
                        chars.next();
                    } else {
                        break;
                    }
                }
                if ident == "datetime" && chars.peek() == Some(&'\'') {
                    chars.next();
                    tokens.push(Tok::DateTime(read_quoted(&mut chars)?));
                } else {
                    tokens.push(Tok::Ident(ident));
                }
            }
            other => return Err(format!("unexpected character '{other}'")),
        }
    }
    Ok(tokens)
}

fn read_quoted(chars: &mut std::iter::Peekable<std::str::Chars<'_>>) -> Result<String, String> {
    let mut text = String::new();
    loop {
        match chars.next() {
            Some('\'') => {
                // A doubled quote is an escaped quote.
                if chars.peek() == Some(&'\'') {
                    chars.next();
                    text.push('\'');
                } else {
                    return Ok(text);
                }
            }
            Some(c) => text.push(c),
            None => return Err("unterminated string literal".to_string()),
        }
    }
}

struct Parser {
    tokens: Vec<Tok>,
    pos: usize,
}

impl Parser {
    fn peek(&self) -> Option<&Tok> {
        self.tokens.get(self.pos)
    }

    fn eat_keyword(&mut self, keyword: &str) -> bool {
        if matches!(self.peek(), Some(Tok::Ident(w)) if w == keyword) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn parse_or(&mut self) -> Result<Pred, String> {
        let mut left = self.parse_and()?;
        while self.eat_keyword("or") {
            let right = self.parse_and()?;
            left = Pred::Or(Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    fn parse_and(&mut self) -> Result<Pred, String> {
        let mut left = self.parse_not()?;
        while self.eat_keyword("and") {
            let right = self.parse_not()?;
            left = Pred::And(Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    fn parse_not(&mut self) -> Result<Pred, String> {
        if self.eat_keyword("not") {
            return Ok(Pred::Not(Box::new(self.parse_not()?)));
        }
        self.parse_primary()
    }

    fn parse_primary(&mut self) -> Result<Pred, String> {
        if matches!(self.peek(), Some(Tok::LParen)) {
            self.pos += 1;
            let inner = self.parse_or()?;
            if !matches!(self.peek(), Some(Tok::RParen)) {
                return Err("expected ')'".to_string());
            }
            self.pos += 1;
            return Ok(inner);
        }

        let left = self.parse_term()?;
        match self.parse_cmp_op() {
            Some(op) => {
                let right = self.parse_term()?;
                Ok(Pred::Cmp(left, op, right))
            }
            None => match left {
                Term::Bool(b) => Ok(Pred::Bool(b)),
                other => Err(format!("expected comparison after {other:?}")),
            },
        }
    }

    fn parse_cmp_op(&mut self) -> Option<CmpOp> {
        let op = match self.peek() {
            Some(Tok::Ident(w)) => match w.as_str() {
                "eq" => CmpOp::Eq,
                "ne" => CmpOp::Ne,
                "gt" => CmpOp::Gt,
                "ge" => CmpOp::Ge,
                "lt" => CmpOp::Lt,
                "le" => CmpOp::Le,
                _ => return None,
            },
            _ => return None,
        };
        self.pos += 1;
        Some(op)
    }

    fn parse_term(&mut self) -> Result<Term, String> {
        let term = match self.peek() {
            Some(Tok::Ident(w)) => match w.as_str() {
                "true" => Term::Bool(true),
                "false" => Term::Bool(false),
                name => Term::Column(name.to_string()),
            },
            Some(Tok::Str(s)) => Term::Str(s.clone()),
            Some(Tok::Num(n)) => Term::Num(*n),
            Some(Tok::DateTime(s)) => Term::DateTime(s.clone()),
            other => return Err(format!("expected term, got {other:?}")),
        };
        self.pos += 1;
        Ok(term)
    }
}

pub fn eval(pred: &Pred, row: &RowData) -> bool {
    match pred {
        Pred::Or(a, b) => eval(a, row) || eval(b, row),
        Pred::And(a, b) => eval(a, row) && eval(b, row),
        Pred::Not(p) => !eval(p, row),
        Pred::Bool(b) => *b,
        Pred::Cmp(left, op, right) => {
            let ord = compare(&resolve(left, row), &resolve(right, row));
            match op {
                CmpOp::Eq => ord == Some(Ordering::Equal),
                CmpOp::Ne => ord != Some(Ordering::Equal),
                CmpOp::Gt => ord == Some(Ordering::Greater),
                CmpOp::Ge => matches!(ord, Some(Ordering::Greater | Ordering::Equal)),
                CmpOp::Lt => ord == Some(Ordering::Less),
                CmpOp::Le => matches!(ord, Some(Ordering::Less | Ordering::Equal)),
            }
        }
    }
}

fn resolve(term: &Term, row: &RowData) -> Value {
    match term {
        Term::Column(name) => match name.as_str() {
            "PartitionKey" => Value::String(row.partition_key.clone()),
            "RowKey" => Value::String(row.row_key.clone()),
            _ => row.properties.get(name).cloned().unwrap_or(Value::Null),
        },
        Term::Str(s) | Term::DateTime(s) => Value::String(s.clone()),
        Term::Num(n) => serde_json::json!(n),
        Term::Bool(b) => Value::Bool(*b),
    }
}

fn compare(left: &Value, right: &Value) -> Option<Ordering> {
    match (left, right) {
        (Value::Null, Value::Null) => Some(Ordering::Equal),
        (Value::Number(a), Value::Number(b)) => a.as_f64()?.partial_cmp(&b.as_f64()?),
        (Value::String(a), Value::String(b)) => Some(a.cmp(b)),
        (Value::Bool(a), Value::Bool(b)) => Some(a.cmp(b)),
        _ => None,
    }
}
