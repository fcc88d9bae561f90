//! The DeX parser.
//!
//! A single-pass character state machine over a stack of frames. Each frame
//! is one open scope holding the scope's raw entry buffer, an optional
//! pending key and the pending value (empty, a token in progress, or a
//! closed child table awaiting attachment). The bottom frame is the implicit
//! file-level scope; [`from_str`](crate::from_str) returns it compiled, so a
//! source of `{1,2,3}` yields an outer table whose entry `0` is the array.
//!
//! Scope buffers defer classification: whether a scope is an array or a map
//! is only decided from the complete key set when its `}` compiles it, and
//! duplicate-key validation happens at the same point so that keys derived
//! from child tags are checked against explicitly written keys.
//!
//! # Token rules
//!
//! - Bare tokens keep inner spaces (`foo bar` is one string) and lose
//!   trailing ones. When `:` or `{` follows a bare token with inner
//!   whitespace, the last word becomes the new key or tag and the prefix is
//!   committed as the previous value — this is what lets
//!   `a : 1 b : 2` and `name : kind { ... }` be written without commas.
//! - Newlines outside strings commit a finished entry, so line-oriented
//!   documents need no separators; inside strings they are content.
//! - Bare numeric tokens become numbers, `true`/`false` become booleans,
//!   and a keyless `+name`/`-name` token is the flag shorthand for
//!   `name : true` / `name : false`.
//! - A keyless entry whose value is a tagged table is keyed by the tag,
//!   which moves off the value: `list { x }` and `list : { x }` denote the
//!   same entry.

use crate::error::{ParseError, ParseErrorKind};
use crate::map::{DexMap, Key};
use crate::number::parse_number;
use crate::table::Table;
use crate::value::Value;
use std::mem;

/// Knobs for a parse call.
///
/// ```rust
/// use dex::ParseOptions;
///
/// // Trusted input: skip the per-scope duplicate-key scan.
/// let options = ParseOptions::new().with_duplicate_check(false);
/// let table = dex::from_str_with_options("{a:1,a:2}", options).unwrap();
/// assert_eq!(table.values().get_table(0).unwrap().len(), 1);
/// ```
#[derive(Clone, Debug)]
pub struct ParseOptions {
    /// Validate key uniqueness per scope (default `true`). When disabled a
    /// duplicate silently replaces the earlier value at its original
    /// position.
    pub check_duplicates: bool,
}

impl Default for ParseOptions {
    fn default() -> Self {
        ParseOptions {
            check_duplicates: true,
        }
    }
}

impl ParseOptions {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_duplicate_check(mut self, check: bool) -> Self {
        self.check_duplicates = check;
        self
    }
}

/// The pending value of a frame.
enum Pending {
    Empty,
    /// Bare token accumulator.
    Bare(String),
    /// Open string literal; the parser is in string context.
    InString(String),
    /// Closed string literal awaiting attachment.
    Quoted(String),
    /// Compiled child table awaiting attachment.
    Table(Table),
}

/// One stack element: an open scope plus its in-progress entry.
struct Frame {
    scope: RawTable,
    pending_key: Option<Value>,
    pending: Pending,
    /// Offset where the pending token began, for diagnostics.
    pending_start: usize,
    /// Offset of the `{` that opened this scope.
    open_at: usize,
}

impl Frame {
    fn open(tag: String, at: usize) -> Self {
        Frame {
            scope: RawTable::new(tag),
            pending_key: None,
            pending: Pending::Empty,
            pending_start: at,
            open_at: at,
        }
    }
}

/// Mutable precursor of a [`Table`]: entries in discovery order, compiled
/// when the scope closes.
struct RawTable {
    tag: String,
    entries: Vec<RawEntry>,
    auto_index: usize,
    /// Flips permanently on the first explicit key; a scope that never saw
    /// one holds only auto indices and skips the duplicate scan.
    saw_explicit_key: bool,
    /// Set when a keyless child carries a tag, whose compile-time key could
    /// collide with a sibling.
    has_tagged_child: bool,
}

struct RawEntry {
    key: RawKey,
    value: Value,
    offset: usize,
}

enum RawKey {
    Auto(usize),
    Explicit(Value),
}

impl RawTable {
    fn new(tag: String) -> Self {
        RawTable {
            tag,
            entries: Vec::new(),
            auto_index: 0,
            saw_explicit_key: false,
            has_tagged_child: false,
        }
    }

    fn push_explicit(&mut self, key: Value, value: Value, offset: usize) {
        self.saw_explicit_key = true;
        self.entries.push(RawEntry {
            key: RawKey::Explicit(key),
            value,
            offset,
        });
    }

    fn push_auto(&mut self, value: Value, offset: usize) {
        if matches!(&value, Value::Table(t) if t.has_tag()) {
            self.has_tagged_child = true;
        }
        let index = self.auto_index;
        self.auto_index += 1;
        self.entries.push(RawEntry {
            key: RawKey::Auto(index),
            value,
            offset,
        });
    }
}

pub(crate) fn parse_str(src: &str, options: ParseOptions) -> Result<Table, ParseError> {
    Parser {
        src,
        offset: 0,
        options,
        stack: vec![Frame::open(String::new(), 0)],
    }
    .run()
}

struct Parser<'a> {
    src: &'a str,
    offset: usize,
    options: ParseOptions,
    stack: Vec<Frame>,
}

impl Parser<'_> {
    fn run(mut self) -> Result<Table, ParseError> {
        while let Some(c) = self.bump() {
            let at = self.offset - c.len_utf8();
            if matches!(self.top().pending, Pending::InString(_)) {
                self.string_char(c, at)?;
            } else {
                self.structural_char(c, at)?;
            }
        }
        self.finish()
    }

    fn peek(&self) -> Option<char> {
        self.src[self.offset..].chars().next()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.offset += c.len_utf8();
        Some(c)
    }

    fn top(&self) -> &Frame {
        self.stack.last().expect("frame stack is never empty")
    }

    fn top_mut(&mut self) -> &mut Frame {
        self.stack.last_mut().expect("frame stack is never empty")
    }

    fn err_at(&self, kind: ParseErrorKind, at: usize) -> ParseError {
        ParseError::at(kind, self.src, at)
    }

    fn unexpected(&self, msg: &str, at: usize) -> ParseError {
        self.err_at(ParseErrorKind::UnexpectedToken(msg.to_string()), at)
    }

    /// One character inside a string literal.
    fn string_char(&mut self, c: char, at: usize) -> Result<(), ParseError> {
        match c {
            '"' => {
                let top = self.top_mut();
                if let Pending::InString(s) = mem::replace(&mut top.pending, Pending::Empty) {
                    top.pending = Pending::Quoted(s);
                }
                Ok(())
            }
            '\\' => self.escape(at),
            other => {
                if let Pending::InString(s) = &mut self.top_mut().pending {
                    s.push(other);
                }
                Ok(())
            }
        }
    }

    fn escape(&mut self, at: usize) -> Result<(), ParseError> {
        let resolved = match self.bump() {
            Some('"') => '"',
            Some('t') => '\t',
            Some('n') => '\n',
            Some('r') => '\r',
            Some('f') => '\u{000C}',
            Some('b') => '\u{0008}',
            Some('\\') => '\\',
            Some('u') => {
                let mut code = 0u32;
                for _ in 0..4 {
                    let digit = self.bump().and_then(|c| c.to_digit(16)).ok_or_else(|| {
                        self.err_at(
                            ParseErrorKind::InvalidEscape(
                                "\\u requires exactly 4 hex digits".to_string(),
                            ),
                            at,
                        )
                    })?;
                    code = code * 16 + digit;
                }
                char::from_u32(code).ok_or_else(|| {
                    self.err_at(
                        ParseErrorKind::InvalidEscape(format!(
                            "\\u{:04x} is not a valid code point",
                            code
                        )),
                        at,
                    )
                })?
            }
            Some(other) => {
                return Err(self.err_at(
                    ParseErrorKind::InvalidEscape(format!("unknown escape `\\{}`", other)),
                    at,
                ))
            }
            None => {
                return Err(self.err_at(
                    ParseErrorKind::UnexpectedEof("escape at end of input".to_string()),
                    at,
                ))
            }
        };
        if let Pending::InString(s) = &mut self.top_mut().pending {
            s.push(resolved);
        }
        Ok(())
    }

    /// One character outside string context.
    fn structural_char(&mut self, c: char, at: usize) -> Result<(), ParseError> {
        match c {
            '"' => {
                if matches!(self.top().pending, Pending::Table(_)) {
                    self.commit_adjacent(at)?;
                }
                if matches!(self.top().pending, Pending::Empty) {
                    let top = self.top_mut();
                    top.pending_start = at;
                    top.pending = Pending::InString(String::new());
                    Ok(())
                } else {
                    Err(self.unexpected("string literal cannot start inside another token", at))
                }
            }
            ':' => self.promote_key(at),
            ',' => self.commit_entry(at, true),
            '\n' => {
                if matches!(self.top().pending, Pending::Empty) {
                    Ok(())
                } else {
                    self.commit_entry(at, false)
                }
            }
            '{' => self.open_scope(at),
            '}' => self.close_scope(at),
            ' ' | '\t' | '\r' => {
                if let Pending::Bare(s) = &mut self.top_mut().pending {
                    s.push(c);
                }
                Ok(())
            }
            other => {
                if matches!(self.top().pending, Pending::Table(_)) {
                    self.commit_adjacent(at)?;
                } else if matches!(self.top().pending, Pending::Quoted(_)) {
                    return Err(self.unexpected("expected separator after string literal", at));
                }
                let top = self.top_mut();
                match &mut top.pending {
                    Pending::Bare(s) => s.push(other),
                    pending @ Pending::Empty => {
                        *pending = Pending::Bare(other.to_string());
                        top.pending_start = at;
                    }
                    _ => unreachable!("token starts only on empty or bare pending"),
                }
                Ok(())
            }
        }
    }

    /// Commits a pending child table so the next token can begin. At the
    /// file level a keyless closed scope admits no sibling: anything after
    /// it (other than a separator) is trailing content.
    fn commit_adjacent(&mut self, at: usize) -> Result<(), ParseError> {
        if self.stack.len() == 1 && self.top().pending_key.is_none() {
            return Err(self.unexpected("trailing content after top-level table", at));
        }
        self.commit_entry(at, false)
    }

    /// `:` — the pending value becomes the entry's key.
    fn promote_key(&mut self, at: usize) -> Result<(), ParseError> {
        let pending = mem::replace(&mut self.top_mut().pending, Pending::Empty);
        let key = match pending {
            Pending::Empty => return Err(self.unexpected("key expected before `:`", at)),
            Pending::Quoted(s) => Value::Str(s),
            Pending::Table(t) => Value::Table(t),
            Pending::Bare(s) => {
                let token = s.trim_end();
                if let Some(split) = token.rfind(is_token_space) {
                    // The last word keys the next entry; the prefix closes
                    // the previous one.
                    let prefix = token[..split].trim_end().to_string();
                    let last = token[split + 1..].to_string();
                    self.top_mut().pending = Pending::Bare(prefix);
                    self.commit_entry(at, false)?;
                    self.top_mut().pending_key = Some(bare_value(&last));
                    return Ok(());
                }
                bare_value(token)
            }
            Pending::InString(_) => unreachable!("string context is dispatched separately"),
        };
        if self.top().pending_key.is_some() {
            return Err(self.unexpected("entry already has a key", at));
        }
        self.top_mut().pending_key = Some(key);
        Ok(())
    }

    /// `{` — opens a nested scope, consuming a pending token as its tag.
    fn open_scope(&mut self, at: usize) -> Result<(), ParseError> {
        let pending = mem::replace(&mut self.top_mut().pending, Pending::Empty);
        let tag = match pending {
            Pending::Empty => String::new(),
            Pending::Quoted(s) => s,
            Pending::Bare(s) => {
                let token = s.trim_end();
                if let Some(split) = token.rfind(is_token_space) {
                    let prefix = token[..split].trim_end().to_string();
                    let tag = token[split + 1..].to_string();
                    self.top_mut().pending = Pending::Bare(prefix);
                    self.commit_entry(at, false)?;
                    tag
                } else {
                    token.to_string()
                }
            }
            Pending::Table(t) => {
                self.top_mut().pending = Pending::Table(t);
                self.commit_adjacent(at)?;
                String::new()
            }
            Pending::InString(_) => unreachable!("string context is dispatched separately"),
        };
        self.stack.push(Frame::open(tag, at));
        Ok(())
    }

    /// `}` — commits a trailing entry, then compiles the scope in place as
    /// the parent frame's pending value.
    fn close_scope(&mut self, at: usize) -> Result<(), ParseError> {
        if !matches!(self.top().pending, Pending::Empty) || self.top().pending_key.is_some() {
            self.commit_entry(at, false)?;
        }
        if self.stack.len() == 1 {
            return Err(self.unexpected("unmatched `}`", at));
        }
        let frame = self.stack.pop().expect("checked above");
        let open_at = frame.open_at;
        let table = self.compile(frame.scope)?;
        let top = self.top_mut();
        top.pending = Pending::Table(table);
        top.pending_start = open_at;
        Ok(())
    }

    /// Attaches the pending `(key, value)` to the current scope buffer.
    ///
    /// `required` is set for `,`, which demands a value; the soft
    /// separators (newline, `}`, end of input) tolerate nothing pending but
    /// still reject a key without a value.
    fn commit_entry(&mut self, at: usize, required: bool) -> Result<(), ParseError> {
        let (pending, key, start) = {
            let top = self.top_mut();
            (
                mem::replace(&mut top.pending, Pending::Empty),
                top.pending_key.take(),
                top.pending_start,
            )
        };
        match pending {
            Pending::Empty => {
                if key.is_some() {
                    Err(self.unexpected("value expected after key", at))
                } else if required {
                    Err(self.unexpected("value expected before `,`", at))
                } else {
                    Ok(())
                }
            }
            Pending::Bare(s) => {
                let token = s.trim_end();
                let scope = &mut self.top_mut().scope;
                match key {
                    Some(k) => scope.push_explicit(k, bare_value(token), start),
                    None => match keyless_bare(token) {
                        KeylessToken::Value(v) => scope.push_auto(v, start),
                        KeylessToken::Flag(name, set) => {
                            scope.push_explicit(Value::Str(name), Value::Bool(set), start)
                        }
                    },
                }
                Ok(())
            }
            Pending::Quoted(s) => {
                let scope = &mut self.top_mut().scope;
                match key {
                    Some(k) => scope.push_explicit(k, Value::Str(s), start),
                    None => scope.push_auto(Value::Str(s), start),
                }
                Ok(())
            }
            Pending::Table(t) => {
                let scope = &mut self.top_mut().scope;
                match key {
                    Some(k) => scope.push_explicit(k, Value::Table(t), start),
                    None => scope.push_auto(Value::Table(t), start),
                }
                Ok(())
            }
            Pending::InString(_) => unreachable!("checked before commit"),
        }
    }

    /// Compiles a closed scope buffer into an immutable table, resolving
    /// tag-derived keys and validating uniqueness.
    fn compile(&self, raw: RawTable) -> Result<Table, ParseError> {
        // A scope that only ever saw auto indices cannot collide.
        let check = self.options.check_duplicates
            && (raw.saw_explicit_key || raw.has_tagged_child);
        let mut map = DexMap::with_capacity(raw.entries.len());
        for entry in raw.entries {
            let (key, value) = resolve_entry(entry.key, entry.value);
            if check && map.get(&key).is_some() {
                return Err(self.err_at(
                    ParseErrorKind::KeyDuplication(key.render()),
                    entry.offset,
                ));
            }
            map.insert(key, value);
        }
        Ok(Table::from_map(raw.tag, map))
    }

    fn finish(&mut self) -> Result<Table, ParseError> {
        let end = self.src.len();
        if matches!(self.top().pending, Pending::InString(_)) {
            let start = self.top().pending_start;
            return Err(self.unexpected("unterminated string literal", start));
        }
        if self.stack.len() > 1 {
            return Err(self.err_at(
                ParseErrorKind::UnexpectedEof(format!(
                    "{} unclosed scope(s)",
                    self.stack.len() - 1
                )),
                end,
            ));
        }
        if !matches!(self.top().pending, Pending::Empty) || self.top().pending_key.is_some() {
            self.commit_entry(end, false)?;
        }
        let root = self.stack.pop().expect("root frame");
        self.compile(root.scope)
    }
}

/// The insignificant whitespace characters of the tokenizer. Other Unicode
/// whitespace is ordinary bare-token content.
fn is_token_space(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\r')
}

/// Effective key and value of one raw entry. A keyless tagged table is keyed
/// by its tag, and the tag moves off the value.
fn resolve_entry(key: RawKey, value: Value) -> (Key, Value) {
    match key {
        RawKey::Explicit(k) => (Key::from(k), value),
        RawKey::Auto(index) => match value {
            Value::Table(t) if t.has_tag() => {
                let key = Key::from(t.tag().to_string());
                (key, Value::Table(t.strip_tag()))
            }
            other => (Key::from(index), other),
        },
    }
}

/// A keyed bare token: opportunistic number, boolean keyword, else string.
fn bare_value(token: &str) -> Value {
    if let Some(n) = parse_number(token) {
        Value::Num(n)
    } else {
        match token {
            "true" => Value::Bool(true),
            "false" => Value::Bool(false),
            _ => Value::Str(token.to_string()),
        }
    }
}

enum KeylessToken {
    Value(Value),
    Flag(String, bool),
}

/// A keyless bare token additionally admits the flag shorthand:
/// `+name` / `-name` that is not a number becomes `name : true/false`.
fn keyless_bare(token: &str) -> KeylessToken {
    if parse_number(token).is_none() && token.len() > 1 {
        if let Some(name) = token.strip_prefix('+') {
            return KeylessToken::Flag(name.to_string(), true);
        }
        if let Some(name) = token.strip_prefix('-') {
            return KeylessToken::Flag(name.to_string(), false);
        }
    }
    KeylessToken::Value(bare_value(token))
}
