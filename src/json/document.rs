use crate::error::Result;
use crate::json::builder;
use crate::json::token::{strip_whitespace, tokenize, Token};

/// What a pool entry or member refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JsonKind {
    #[default]
    None,
    String,
    Array,
    Primitive,
    Object,
}

impl JsonKind {
    /// Object and Array members index `Document::objects`; Primitive and
    /// String members index `Document::values`.
    pub fn is_container(self) -> bool {
        matches!(self, JsonKind::Object | JsonKind::Array)
    }

    /// True for kinds whose payload lives in `Document::values`.
    pub fn is_scalar(self) -> bool {
        matches!(self, JsonKind::Primitive | JsonKind::String)
    }
}

/// Named slot of an object or positional slot of an array.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Member {
    pub name: String,
    pub kind: JsonKind,
    pub index: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Object {
    pub kind: JsonKind,
    pub members: Vec<Member>,
}

/// Raw literal text; conversion happens on read.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Value {
    pub text: String,
}

pub(crate) const SENTINEL: usize = 0;
pub(crate) const ROOT: usize = 1;

/// Parsed JSON tree stored as two index-linked pools.
///
/// `objects[0]` is a sentinel returned by failed lookups and `objects[1]`
/// is the top-level value. The document is immutable once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    pub(crate) objects: Vec<Object>,
    pub(crate) values: Vec<Value>,
}

impl Document {
    /// Strips, tokenizes and builds `text` in one go.
    pub fn parse(text: &str) -> Result<Self> {
        let tokens = tokenize(&strip_whitespace(text));
        log::debug!("tokenized JSON into {} tokens", tokens.len());
        Self::from_tokens(&tokens)
    }

    /// Builds a document from an already tokenized stream.
    pub fn from_tokens(tokens: &[Token]) -> Result<Self> {
        builder::build(tokens)
    }

    /// Returns the object pool, sentinel included.
    pub fn objects(&self) -> &[Object] {
        &self.objects
    }

    /// Returns the pool of scalar literals.
    pub fn values(&self) -> &[Value] {
        &self.values
    }

    /// Returns the empty object handed out by failed lookups.
    pub fn sentinel(&self) -> ObjectRef<'_> {
        self.object(SENTINEL)
    }

    /// Top-level value, or the sentinel for an empty token stream.
    pub fn root(&self) -> ObjectRef<'_> {
        if self.objects.len() > ROOT {
            self.object(ROOT)
        } else {
            self.sentinel()
        }
    }

    fn object(&self, index: usize) -> ObjectRef<'_> {
        ObjectRef {
            doc: self,
            object: &self.objects[index],
        }
    }
}

/// Borrowed view of an object or array inside a [`Document`].
#[derive(Debug, Clone, Copy)]
pub struct ObjectRef<'a> {
    doc: &'a Document,
    object: &'a Object,
}

impl<'a> ObjectRef<'a> {
    /// Returns the document this view borrows from.
    pub fn document(&self) -> &'a Document {
        self.doc
    }

    /// Returns whether this is an object or an array.
    pub fn kind(&self) -> JsonKind {
        self.object.kind
    }

    /// Returns the number of members, or elements for an array.
    pub fn len(&self) -> usize {
        self.object.members.len()
    }

    /// True when the object or array has no members.
    pub fn is_empty(&self) -> bool {
        self.object.members.is_empty()
    }

    /// Case-sensitive exact match on member names.
    pub fn exists(&self, name: &str) -> bool {
        self.object.members.iter().any(|m| m.name == name)
    }

    /// Returns the first member called `name`, if any.
    pub fn member(&self, name: &str) -> Option<MemberRef<'a>> {
        self.object
            .members
            .iter()
            .find(|m| m.name == name)
            .map(|member| MemberRef {
                doc: self.doc,
                member,
            })
    }

    /// Nested object or array by name. Falls back to the sentinel when the
    /// member is missing or holds a scalar.
    pub fn get(&self, name: &str) -> ObjectRef<'a> {
        self.member(name)
            .and_then(|m| m.as_object())
            .unwrap_or_else(|| self.doc.sentinel())
    }

    /// Returns the member at `index` in source order.
    pub fn at(&self, index: usize) -> Option<MemberRef<'a>> {
        self.object.members.get(index).map(|member| MemberRef {
            doc: self.doc,
            member,
        })
    }

    /// Iterates members in source order.
    pub fn members(&self) -> impl Iterator<Item = MemberRef<'a>> + 'a {
        let doc = self.doc;
        self.object
            .members
            .iter()
            .map(move |member| MemberRef { doc, member })
    }

    /// True when this view is the lookup-failure sentinel.
    pub fn is_sentinel(&self) -> bool {
        std::ptr::eq(self.object, &self.doc.objects[SENTINEL])
    }
}

/// Borrowed view of a member with lazy conversions of its literal.
///
/// Conversions never fail: a member of the wrong shape reads as zero or an
/// empty string.
#[derive(Debug, Clone, Copy)]
pub struct MemberRef<'a> {
    doc: &'a Document,
    member: &'a Member,
}

impl<'a> MemberRef<'a> {
    /// Returns the member name; empty for array elements.
    pub fn name(&self) -> &'a str {
        &self.member.name
    }

    /// Returns the kind of value the member holds.
    pub fn kind(&self) -> JsonKind {
        self.member.kind
    }

    /// Raw literal text; empty for containers.
    pub fn text(&self) -> &'a str {
        if !self.member.kind.is_scalar() {
            return "";
        }
        self.doc
            .values
            .get(self.member.index)
            .map(|v| v.text.as_str())
            .unwrap_or("")
    }

    /// Returns the nested object or array; `None` for scalars.
    pub fn as_object(&self) -> Option<ObjectRef<'a>> {
        if !self.member.kind.is_container() {
            return None;
        }
        self.doc.objects.get(self.member.index).map(|object| ObjectRef {
            doc: self.doc,
            object,
        })
    }

    /// Reads the leading integer of the literal, 0 when there is none.
    pub fn as_i32(&self) -> i32 {
        leading_int(self.text())
    }

    /// Same as [`MemberRef::as_i32`], reinterpreted as unsigned.
    pub fn as_u32(&self) -> u32 {
        self.as_i32() as u32
    }

    /// Non-negative integers as an index; anything else is absent.
    pub fn as_index(&self) -> Option<usize> {
        if self.member.kind != JsonKind::Primitive {
            return None;
        }
        usize::try_from(self.as_i32()).ok()
    }

    /// Reads the longest leading float of the literal, 0.0 when there is none.
    pub fn as_f32(&self) -> f32 {
        leading_float(self.text())
    }

    /// True when the literal starts with `t`.
    pub fn as_bool(&self) -> bool {
        self.text().starts_with('t')
    }
}

/// Optional sign followed by decimal digits; 0 when there are none.
fn leading_int(text: &str) -> i32 {
    let bytes = text.as_bytes();
    let (negative, start) = match bytes.first() {
        Some(b'-') => (true, 1),
        Some(b'+') => (false, 1),
        _ => (false, 0),
    };
    let mut value: i64 = 0;
    for &b in &bytes[start..] {
        if !b.is_ascii_digit() {
            break;
        }
        value = (value * 10 + i64::from(b - b'0')).min(i64::from(u32::MAX));
    }
    let value = if negative { -value } else { value };
    value.clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32
}

/// Longest prefix that parses as a float; 0.0 when there is none.
fn leading_float(text: &str) -> f32 {
    let end = text
        .find(|c: char| !(c.is_ascii_digit() || matches!(c, '+' | '-' | '.' | 'e' | 'E')))
        .unwrap_or(text.len());
    let candidate = &text[..end];
    (1..=candidate.len())
        .rev()
        .find_map(|len| candidate[..len].parse::<f32>().ok())
        .unwrap_or(0.0)
}
