// Python literal text: what `repr()` prints on the hub and what
// `eval()` reads back. Used for the slot registry and for listings.

use std::{error, fmt};

#[derive(Debug, PartialEq)]
pub enum SedesError {
    UnexpectedEnd,
    UnexpectedChar(usize, char),
    InvalidNumber(usize),
    InvalidEscape(usize),
    TrailingInput(usize),
    /// Containers nested deeper than `MAX_DEPTH`.
    TooDeep(usize),
    Shape(String),
}

impl error::Error for SedesError {}

impl fmt::Display for SedesError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[SEDES] {:?}", self)
    }
}

type Result<T> = std::result::Result<T, SedesError>;

/// Deepest container nesting accepted when parsing.
pub const MAX_DEPTH: usize = 64;

pub trait Serialize {
    fn serialize(&self) -> String;
}

pub trait Deserialize {
    fn deserialize(src: &str) -> Result<Self> where Self: Sized;
}

#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    None,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    Bytes(Vec<u8>),
    List(Vec<Literal>),
    Tuple(Vec<Literal>),
    /// Insertion ordered, like a Python dict.
    Dict(Vec<(Literal, Literal)>),
}

impl Literal {
    pub fn str(s: &str) -> Self {
        Self::Str(String::from(s))
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Look up a string key in a dict.
    pub fn get(&self, key: &str) -> Option<&Literal> {
        match self {
            Self::Dict(pairs) => pairs
                .iter()
                .find(|(k, _)| k.as_str() == Some(key))
                .map(|(_, v)| v),
            _ => None,
        }
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => write!(f, "None"),
            Self::Bool(true) => write!(f, "True"),
            Self::Bool(false) => write!(f, "False"),
            Self::Int(i) => write!(f, "{i}"),
            Self::Float(x) => write!(f, "{x:?}"),
            Self::Str(s) => write_str(f, s),
            Self::Bytes(b) => write!(f, "{}", bytes_repr(b)),
            Self::List(items) => {
                write!(f, "[")?;
                write_seq(f, items)?;
                write!(f, "]")
            }
            Self::Tuple(items) => {
                write!(f, "(")?;
                write_seq(f, items)?;
                if items.len() == 1 {
                    write!(f, ",")?;
                }
                write!(f, ")")
            }
            Self::Dict(pairs) => {
                write!(f, "{{")?;
                for (i, (k, v)) in pairs.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{k}: {v}")?;
                }
                write!(f, "}}")
            }
        }
    }
}

fn write_seq(f: &mut fmt::Formatter<'_>, items: &[Literal]) -> fmt::Result {
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            write!(f, ", ")?;
        }
        write!(f, "{item}")?;
    }
    Ok(())
}

fn write_str(f: &mut fmt::Formatter<'_>, s: &str) -> fmt::Result {
    write!(f, "'")?;
    for c in s.chars() {
        match c {
            '\\' => write!(f, "\\\\")?,
            '\'' => write!(f, "\\'")?,
            '\n' => write!(f, "\\n")?,
            '\r' => write!(f, "\\r")?,
            '\t' => write!(f, "\\t")?,
            c if (c as u32) < 0x20 || c as u32 == 0x7f => write!(f, "\\x{:02x}", c as u32)?,
            c => write!(f, "{c}")?,
        }
    }
    write!(f, "'")
}

/// Render bytes the way Python prints a `bytes` object.
pub fn bytes_repr(data: &[u8]) -> String {
    let mut out = String::from("b'");
    for &b in data {
        match b {
            b'\\' => out.push_str("\\\\"),
            b'\'' => out.push_str("\\'"),
            b'\n' => out.push_str("\\n"),
            b'\r' => out.push_str("\\r"),
            b'\t' => out.push_str("\\t"),
            0x20..=0x7e => out.push(b as char),
            _ => out.push_str(&format!("\\x{b:02x}")),
        }
    }
    out.push('\'');
    out
}

impl Serialize for Literal {
    fn serialize(&self) -> String {
        self.to_string()
    }
}

impl Deserialize for Literal {
    fn deserialize(src: &str) -> Result<Self> {
        let mut p = Parser { chars: src.char_indices().collect(), pos: 0, depth: 0 };
        let value = p.value()?;
        p.skip_ws();
        match p.peek() {
            None => Ok(value),
            Some(_) => Err(SedesError::TrailingInput(p.offset())),
        }
    }
}

struct Parser {
    chars: Vec<(usize, char)>,
    pos: usize,
    depth: usize,
}

impl Parser {
    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).map(|&(_, c)| c)
    }

    fn offset(&self) -> usize {
        self.chars.get(self.pos).map_or_else(
            || self.chars.last().map_or(0, |&(i, c)| i + c.len_utf8()),
            |&(i, _)| i,
        )
    }

    fn next(&mut self) -> Result<char> {
        let c = self.peek().ok_or(SedesError::UnexpectedEnd)?;
        self.pos += 1;
        Ok(c)
    }

    fn skip_ws(&mut self) {
        while matches!(self.peek(), Some(c) if c.is_whitespace()) {
            self.pos += 1;
        }
    }

    fn expect(&mut self, want: char) -> Result<()> {
        let at = self.offset();
        match self.next()? {
            c if c == want => Ok(()),
            c => Err(SedesError::UnexpectedChar(at, c)),
        }
    }

    fn value(&mut self) -> Result<Literal> {
        self.skip_ws();
        let at = self.offset();
        match self.peek().ok_or(SedesError::UnexpectedEnd)? {
            '{' => self.nested(Self::dict),
            '[' => self.nested(|p| {
                p.pos += 1;
                Ok(Literal::List(p.items(']')?))
            }),
            '(' => self.nested(|p| {
                p.pos += 1;
                Ok(Literal::Tuple(p.items(')')?))
            }),
            '\'' | '"' => Ok(Literal::Str(self.string()?)),
            'b' if matches!(self.chars.get(self.pos + 1), Some((_, '\'' | '"'))) => {
                self.pos += 1;
                let s = self.string()?;
                s.chars()
                    .map(|c| u8::try_from(c as u32).map_err(|_| SedesError::InvalidEscape(at)))
                    .collect::<Result<Vec<u8>>>()
                    .map(Literal::Bytes)
            }
            c if c == '-' || c.is_ascii_digit() => self.number(),
            c if c.is_ascii_alphabetic() => {
                let word = self.word();
                match word.as_str() {
                    "None" => Ok(Literal::None),
                    "True" => Ok(Literal::Bool(true)),
                    "False" => Ok(Literal::Bool(false)),
                    _ => Err(SedesError::UnexpectedChar(at, c)),
                }
            }
            c => Err(SedesError::UnexpectedChar(at, c)),
        }
    }

    fn nested(&mut self, parse: fn(&mut Self) -> Result<Literal>) -> Result<Literal> {
        if self.depth >= MAX_DEPTH {
            return Err(SedesError::TooDeep(self.offset()));
        }
        self.depth += 1;
        let value = parse(self);
        self.depth -= 1;
        value
    }

    fn word(&mut self) -> String {
        let mut w = String::new();
        while let Some(c) = self.peek().filter(|c| c.is_ascii_alphanumeric() || *c == '_') {
            w.push(c);
            self.pos += 1;
        }
        w
    }

    fn number(&mut self) -> Result<Literal> {
        let at = self.offset();
        let mut text = String::new();
        while let Some(c) = self.peek() {
            if c.is_ascii_digit() || matches!(c, '-' | '+' | '.' | 'e' | 'E') {
                text.push(c);
                self.pos += 1;
            } else {
                break;
            }
        }
        if let Ok(i) = text.parse::<i64>() {
            return Ok(Literal::Int(i));
        }
        text.parse::<f64>()
            .map(Literal::Float)
            .map_err(|_| SedesError::InvalidNumber(at))
    }

    fn string(&mut self) -> Result<String> {
        let quote = self.next()?;
        let mut s = String::new();
        loop {
            let at = self.offset();
            match self.next()? {
                c if c == quote => return Ok(s),
                '\\' => match self.next()? {
                    'n' => s.push('\n'),
                    'r' => s.push('\r'),
                    't' => s.push('\t'),
                    '0' => s.push('\0'),
                    'x' => s.push(self.hex_escape(2, at)?),
                    'u' => s.push(self.hex_escape(4, at)?),
                    c @ ('\\' | '\'' | '"') => s.push(c),
                    _ => return Err(SedesError::InvalidEscape(at)),
                },
                c => s.push(c),
            }
        }
    }

    fn hex_escape(&mut self, len: usize, at: usize) -> Result<char> {
        let mut code = 0u32;
        for _ in 0..len {
            let digit = self.next()?.to_digit(16).ok_or(SedesError::InvalidEscape(at))?;
            code = code * 16 + digit;
        }
        char::from_u32(code).ok_or(SedesError::InvalidEscape(at))
    }

    fn items(&mut self, close: char) -> Result<Vec<Literal>> {
        let mut items = Vec::new();
        loop {
            self.skip_ws();
            if self.peek() == Some(close) {
                self.pos += 1;
                return Ok(items);
            }
            items.push(self.value()?);
            self.skip_ws();
            if self.peek() == Some(',') {
                self.pos += 1;
            } else {
                self.skip_ws();
                self.expect(close)?;
                return Ok(items);
            }
        }
    }

    fn dict(&mut self) -> Result<Literal> {
        self.expect('{')?;
        let mut pairs = Vec::new();
        loop {
            self.skip_ws();
            if self.peek() == Some('}') {
                self.pos += 1;
                return Ok(Literal::Dict(pairs));
            }
            let key = self.value()?;
            self.skip_ws();
            self.expect(':')?;
            let value = self.value()?;
            pairs.push((key, value));
            self.skip_ws();
            if self.peek() == Some(',') {
                self.pos += 1;
            } else {
                self.expect('}')?;
                return Ok(Literal::Dict(pairs));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_python_dict_repr() {
        let src = "{0: {'name': 'a.py', 'size': 12, 'type': \"python\"}, 3: {}}";
        let lit = Literal::deserialize(src).unwrap();
        let Literal::Dict(pairs) = &lit else { panic!("not a dict") };
        assert_eq!(pairs.len(), 2);
        assert_eq!(pairs[0].0, Literal::Int(0));
        assert_eq!(pairs[0].1.get("name"), Some(&Literal::str("a.py")));
        assert_eq!(pairs[0].1.get("size").and_then(Literal::as_int), Some(12));
        assert_eq!(pairs[1].1, Literal::Dict(vec![]));
    }

    #[test]
    fn renders_like_python_repr() {
        let lit = Literal::Dict(vec![
            (Literal::Int(5), Literal::Dict(vec![
                (Literal::str("name"), Literal::str("it's.py")),
                (Literal::str("ok"), Literal::Bool(true)),
                (Literal::str("none"), Literal::None),
            ])),
        ]);
        assert_eq!(lit.serialize(), "{5: {'name': 'it\\'s.py', 'ok': True, 'none': None}}");
        assert_eq!(Literal::Tuple(vec![Literal::Int(1)]).to_string(), "(1,)");
        assert_eq!(Literal::Float(1.0).to_string(), "1.0");
    }

    #[test]
    fn rendered_text_parses_back_unchanged() {
        let lit = Literal::List(vec![
            Literal::Tuple(vec![Literal::str("/main.py"), Literal::Int(-3)]),
            Literal::str("tab\there\nnew \\ line"),
            Literal::Bytes(vec![0, b'a', 0xff]),
            Literal::Float(2.5),
        ]);
        assert_eq!(Literal::deserialize(&lit.serialize()).unwrap(), lit);
    }

    #[test]
    fn handles_trailing_commas_and_whitespace() {
        let lit = Literal::deserialize("  [ 1 , 2 , ]\r\n").unwrap();
        assert_eq!(lit, Literal::List(vec![Literal::Int(1), Literal::Int(2)]));
    }

    #[test]
    fn bytes_repr_escapes_non_printables() {
        assert_eq!(bytes_repr(b"hi\n\x00\xff'"), "b'hi\\n\\x00\\xff\\''");
    }

    #[test]
    fn rejects_malformed_input() {
        assert_eq!(Literal::deserialize("{1: 2"), Err(SedesError::UnexpectedEnd));
        assert_eq!(Literal::deserialize("[1] x"), Err(SedesError::TrailingInput(4)));
        assert!(matches!(Literal::deserialize("{1 2}"), Err(SedesError::UnexpectedChar(3, '2'))));
        assert!(matches!(Literal::deserialize("nope"), Err(SedesError::UnexpectedChar(0, 'n'))));
    }

    #[test]
    fn nesting_is_bounded() {
        let ok = format!("{}{}", "[".repeat(MAX_DEPTH), "]".repeat(MAX_DEPTH));
        assert!(Literal::deserialize(&ok).is_ok());

        let deep = "[".repeat(MAX_DEPTH + 1);
        assert_eq!(Literal::deserialize(&deep), Err(SedesError::TooDeep(MAX_DEPTH)));
        let hostile = "({".repeat(100_000);
        assert!(matches!(Literal::deserialize(&hostile), Err(SedesError::TooDeep(_))));
    }
}
