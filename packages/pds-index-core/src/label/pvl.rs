//! Parser for PDS3 Parameter Value Language (PVL) label documents.
//!
//! A label is an ordered list of `KEY = VALUE` statements. `OBJECT` and
//! `GROUP` statements open nested blocks that are stored under their own
//! name, so `OBJECT = INDEX_TABLE` becomes the entry `INDEX_TABLE`. Keys may
//! repeat (every column of a table is an `OBJECT = COLUMN`), which is why the
//! module keeps pairs in order instead of using a map.

use std::fmt;

use crate::error::{IndexError, Result};

/// A parsed PVL value.
#[derive(Debug, Clone, PartialEq)]
pub enum PvlValue {
    Integer(i64),
    Real(f64),
    /// Double-quoted text
    Text(String),
    /// Single-quoted symbol
    Symbol(String),
    /// Unquoted literal (identifiers, dates, anything non-numeric)
    Identifier(String),
    Sequence(Vec<PvlValue>),
    Set(Vec<PvlValue>),
    WithUnit { value: Box<PvlValue>, unit: String },
    Object(PvlModule),
    Group(PvlModule),
}

impl PvlValue {
    /// Integer value, looking through an attached unit.
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            PvlValue::Integer(v) => Some(*v),
            PvlValue::WithUnit { value, .. } => value.as_integer(),
            _ => None,
        }
    }

    /// String content of text, symbol and identifier values.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            PvlValue::Text(s) | PvlValue::Symbol(s) | PvlValue::Identifier(s) => Some(s),
            PvlValue::WithUnit { value, .. } => value.as_str(),
            _ => None,
        }
    }

    /// Nested block of an `OBJECT` or `GROUP` entry.
    pub fn as_module(&self) -> Option<&PvlModule> {
        match self {
            PvlValue::Object(m) | PvlValue::Group(m) => Some(m),
            _ => None,
        }
    }

    pub fn is_object(&self) -> bool {
        matches!(self, PvlValue::Object(_))
    }
}

impl fmt::Display for PvlValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PvlValue::Integer(v) => write!(f, "{}", v),
            PvlValue::Real(v) => write!(f, "{}", v),
            PvlValue::Text(s) => write!(f, "\"{}\"", s),
            PvlValue::Symbol(s) => write!(f, "'{}'", s),
            PvlValue::Identifier(s) => write!(f, "{}", s),
            PvlValue::Sequence(items) => write_list(f, "(", items, ")"),
            PvlValue::Set(items) => write_list(f, "{", items, "}"),
            PvlValue::WithUnit { value, unit } => write!(f, "{} <{}>", value, unit),
            PvlValue::Object(m) => write!(f, "OBJECT[{} entries]", m.len()),
            PvlValue::Group(m) => write!(f, "GROUP[{} entries]", m.len()),
        }
    }
}

fn write_list(f: &mut fmt::Formatter<'_>, open: &str, items: &[PvlValue], close: &str) -> fmt::Result {
    f.write_str(open)?;
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        write!(f, "{}", item)?;
    }
    f.write_str(close)
}

/// Ordered key/value pairs of one label level.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PvlModule {
    entries: Vec<(String, PvlValue)>,
}

impl PvlModule {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, key: String, value: PvlValue) {
        self.entries.push((key, value));
    }

    /// First value stored under `key`.
    pub fn get(&self, key: &str) -> Option<&PvlValue> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    /// Every value stored under `key`, in document order.
    pub fn get_all<'a>(&'a self, key: &'a str) -> impl Iterator<Item = &'a PvlValue> + 'a {
        self.entries
            .iter()
            .filter(move |(k, _)| k == key)
            .map(|(_, v)| v)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &PvlValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Parses a complete label document.
pub fn parse(text: &str) -> Result<PvlModule> {
    let mut parser = Parser {
        lexer: Lexer::new(text),
    };
    parser.parse_block(None)
}

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Word(String),
    Quoted(String),
    Symbol(String),
    Unit(String),
    Equals,
    Comma,
    OpenParen,
    CloseParen,
    OpenBrace,
    CloseBrace,
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Word(w) => write!(f, "'{}'", w),
            Token::Quoted(_) => f.write_str("quoted text"),
            Token::Symbol(_) => f.write_str("symbol"),
            Token::Unit(u) => write!(f, "unit <{}>", u),
            Token::Equals => f.write_str("'='"),
            Token::Comma => f.write_str("','"),
            Token::OpenParen => f.write_str("'('"),
            Token::CloseParen => f.write_str("')'"),
            Token::OpenBrace => f.write_str("'{'"),
            Token::CloseBrace => f.write_str("'}'"),
        }
    }
}

struct Lexer<'a> {
    chars: std::iter::Peekable<std::str::Chars<'a>>,
    line: usize,
    peeked: Option<Option<(Token, usize)>>,
}

impl<'a> Lexer<'a> {
    fn new(text: &'a str) -> Self {
        Self {
            chars: text.chars().peekable(),
            line: 1,
            peeked: None,
        }
    }

    fn error(line: usize, message: impl Into<String>) -> IndexError {
        IndexError::Parse {
            line,
            message: message.into(),
        }
    }

    fn peek(&mut self) -> Result<Option<&(Token, usize)>> {
        if self.peeked.is_none() {
            let token = self.scan()?;
            self.peeked = Some(token);
        }
        Ok(self.peeked.as_ref().and_then(|t| t.as_ref()))
    }

    fn next(&mut self) -> Result<Option<(Token, usize)>> {
        match self.peeked.take() {
            Some(token) => Ok(token),
            None => self.scan(),
        }
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.chars.next();
        if c == Some('\n') {
            self.line += 1;
        }
        c
    }

    fn skip_trivia(&mut self) -> Result<()> {
        loop {
            match self.chars.peek() {
                Some(c) if c.is_whitespace() => {
                    self.bump();
                }
                Some('/') => {
                    let mut lookahead = self.chars.clone();
                    lookahead.next();
                    if lookahead.peek() != Some(&'*') {
                        return Ok(());
                    }
                    let start = self.line;
                    self.bump();
                    self.bump();
                    let mut prev = '\0';
                    loop {
                        match self.bump() {
                            Some('/') if prev == '*' => break,
                            Some(c) => prev = c,
                            None => return Err(Self::error(start, "unterminated comment")),
                        }
                    }
                }
                _ => return Ok(()),
            }
        }
    }

    fn delimited(&mut self, close: char, what: &str) -> Result<String> {
        let start = self.line;
        let mut buf = String::new();
        loop {
            match self.bump() {
                Some(c) if c == close => return Ok(buf),
                Some(c) => buf.push(c),
                None => return Err(Self::error(start, format!("unterminated {}", what))),
            }
        }
    }

    fn scan(&mut self) -> Result<Option<(Token, usize)>> {
        self.skip_trivia()?;
        let line = self.line;
        let c = match self.chars.peek() {
            Some(c) => *c,
            None => return Ok(None),
        };
        let token = match c {
            '=' => {
                self.bump();
                Token::Equals
            }
            ',' => {
                self.bump();
                Token::Comma
            }
            '(' => {
                self.bump();
                Token::OpenParen
            }
            ')' => {
                self.bump();
                Token::CloseParen
            }
            '{' => {
                self.bump();
                Token::OpenBrace
            }
            '}' => {
                self.bump();
                Token::CloseBrace
            }
            '"' => {
                self.bump();
                let raw = self.delimited('"', "quoted text")?;
                if raw.contains('\n') {
                    Token::Quoted(raw.split_whitespace().collect::<Vec<_>>().join(" "))
                } else {
                    Token::Quoted(raw)
                }
            }
            '\'' => {
                self.bump();
                Token::Symbol(self.delimited('\'', "symbol")?)
            }
            '<' => {
                self.bump();
                Token::Unit(self.delimited('>', "unit")?.trim().to_string())
            }
            _ => {
                let mut word = String::new();
                while let Some(&c) = self.chars.peek() {
                    if c.is_whitespace() || "=,(){}\"'<>".contains(c) {
                        break;
                    }
                    if c == '/' {
                        let mut lookahead = self.chars.clone();
                        lookahead.next();
                        if lookahead.peek() == Some(&'*') {
                            break;
                        }
                    }
                    word.push(c);
                    self.bump();
                }
                if word.is_empty() {
                    return Err(Self::error(line, format!("unexpected character '{}'", c)));
                }
                Token::Word(word)
            }
        };
        Ok(Some((token, line)))
    }
}

struct Parser<'a> {
    lexer: Lexer<'a>,
}

fn is_keyword(word: &str, candidates: &[&str]) -> bool {
    candidates.iter().any(|k| word.eq_ignore_ascii_case(k))
}

impl Parser<'_> {
    /// Parses statements until `END` (top level) or the matching block end.
    ///
    /// `open` carries the block kind (`OBJECT`/`GROUP`), its name and the
    /// line it was opened on.
    fn parse_block(&mut self, open: Option<(&str, &str, usize)>) -> Result<PvlModule> {
        let mut module = PvlModule::new();
        loop {
            let (token, line) = match self.lexer.next()? {
                Some(t) => t,
                None => {
                    return match open {
                        Some((kind, name, opened)) => Err(Lexer::error(
                            opened,
                            format!("{} '{}' is never closed", kind, name),
                        )),
                        None => Ok(module),
                    };
                }
            };

            let key = match token {
                Token::Word(w) => w,
                other => {
                    return Err(Lexer::error(line, format!("expected a keyword, found {}", other)))
                }
            };

            if key.eq_ignore_ascii_case("END") {
                if let Some((kind, name, opened)) = open {
                    return Err(Lexer::error(
                        opened,
                        format!("{} '{}' is never closed", kind, name),
                    ));
                }
                return Ok(module);
            }

            if is_keyword(&key, &["END_OBJECT", "END_GROUP"]) {
                let (kind, name, _) = match open {
                    Some(o) => o,
                    None => {
                        return Err(Lexer::error(line, format!("{} without open block", key)))
                    }
                };
                let expected_end = format!("END_{}", kind);
                if !key.eq_ignore_ascii_case(&expected_end) {
                    return Err(Lexer::error(
                        line,
                        format!("{} closes {} '{}'", key, kind, name),
                    ));
                }
                if matches!(self.lexer.peek()?, Some((Token::Equals, _))) {
                    self.lexer.next()?;
                    let closing = self.expect_word()?;
                    if closing != name {
                        return Err(Lexer::error(
                            line,
                            format!("{} = {} does not match {} = {}", key, closing, kind, name),
                        ));
                    }
                }
                return Ok(module);
            }

            self.expect_equals(&key, line)?;

            if is_keyword(&key, &["OBJECT", "BEGIN_OBJECT"]) {
                let name = self.expect_word()?;
                let body = self.parse_block(Some(("OBJECT", &name, line)))?;
                module.push(name, PvlValue::Object(body));
            } else if is_keyword(&key, &["GROUP", "BEGIN_GROUP"]) {
                let name = self.expect_word()?;
                let body = self.parse_block(Some(("GROUP", &name, line)))?;
                module.push(name, PvlValue::Group(body));
            } else {
                let value = self.parse_value()?;
                module.push(key, value);
            }
        }
    }

    fn expect_equals(&mut self, key: &str, line: usize) -> Result<()> {
        match self.lexer.next()? {
            Some((Token::Equals, _)) => Ok(()),
            Some((other, l)) => Err(Lexer::error(
                l,
                format!("expected '=' after {}, found {}", key, other),
            )),
            None => Err(Lexer::error(line, format!("expected '=' after {}", key))),
        }
    }

    fn expect_word(&mut self) -> Result<String> {
        let line = self.lexer.line;
        match self.lexer.next()? {
            Some((Token::Word(w), _)) => Ok(w),
            Some((other, l)) => Err(Lexer::error(l, format!("expected a name, found {}", other))),
            None => Err(Lexer::error(line, "expected a name, found end of input")),
        }
    }

    fn parse_value(&mut self) -> Result<PvlValue> {
        let line = self.lexer.line;
        let (token, line) = self
            .lexer
            .next()?
            .ok_or_else(|| Lexer::error(line, "expected a value, found end of input"))?;

        let scalar = match token {
            Token::OpenParen => return Ok(PvlValue::Sequence(self.parse_list(Token::CloseParen)?)),
            Token::OpenBrace => return Ok(PvlValue::Set(self.parse_list(Token::CloseBrace)?)),
            Token::Word(w) => literal(w),
            Token::Quoted(s) => PvlValue::Text(s),
            Token::Symbol(s) => PvlValue::Symbol(s),
            other => {
                return Err(Lexer::error(line, format!("expected a value, found {}", other)))
            }
        };

        if let Some((Token::Unit(_), _)) = self.lexer.peek()? {
            if let Some((Token::Unit(unit), _)) = self.lexer.next()? {
                return Ok(PvlValue::WithUnit {
                    value: Box::new(scalar),
                    unit,
                });
            }
        }
        Ok(scalar)
    }

    fn parse_list(&mut self, close: Token) -> Result<Vec<PvlValue>> {
        let mut items = Vec::new();
        if let Some((t, _)) = self.lexer.peek()? {
            if *t == close {
                self.lexer.next()?;
                return Ok(items);
            }
        }
        loop {
            items.push(self.parse_value()?);
            let line = self.lexer.line;
            match self.lexer.next()? {
                Some((Token::Comma, _)) => continue,
                Some((t, _)) if t == close => return Ok(items),
                Some((other, l)) => {
                    return Err(Lexer::error(l, format!("expected ',' or {}, found {}", close, other)))
                }
                None => return Err(Lexer::error(line, "unterminated sequence")),
            }
        }
    }
}

/// Interprets an unquoted word as a number when it looks like one.
fn literal(word: String) -> PvlValue {
    let numeric_start = {
        let mut chars = word.chars();
        match chars.next() {
            Some(c) if c.is_ascii_digit() => true,
            Some('+') | Some('-') | Some('.') => chars.next().is_some_and(|c| c.is_ascii_digit() || c == '.'),
            _ => false,
        }
    };
    if numeric_start {
        if let Ok(v) = word.parse::<i64>() {
            return PvlValue::Integer(v);
        }
        if let Ok(v) = word.parse::<f64>() {
            return PvlValue::Real(v);
        }
    }
    PvlValue::Identifier(word)
}
