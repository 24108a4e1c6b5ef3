//! Non-recursive tree builder.
//!
//! Nesting is rebuilt from the flat token stream with two explicit stacks:
//! the containers currently open and the object members still waiting for
//! their value. Stack depth is bounded by input nesting, never by the call
//! stack.

use crate::error::{Error, Result};
use crate::json::document::{Document, JsonKind, Member, Object, Value, SENTINEL};
use crate::json::token::{Token, TokenKind};

struct Builder {
    objects: Vec<Object>,
    values: Vec<Value>,
    object_stack: Vec<usize>,
    member_stack: Vec<usize>,
}

pub(crate) fn build(tokens: &[Token]) -> Result<Document> {
    let mut builder = Builder::new(tokens.len());

    for (position, token) in tokens.iter().enumerate() {
        match token.kind {
            TokenKind::LeftBrace => builder.open(position, JsonKind::Object)?,
            TokenKind::LeftBracket => builder.open(position, JsonKind::Array)?,
            TokenKind::RightBrace | TokenKind::RightBracket => builder.close(position)?,
            TokenKind::Member => {
                let kind = value_kind(tokens.get(position + 2)).ok_or_else(|| {
                    Error::parse(position, format!("member \"{}\" has no value", token.text))
                })?;
                builder.member(position, &token.text, kind)?;
            }
            TokenKind::String => builder.scalar(position, &token.text, JsonKind::String)?,
            TokenKind::Primitive => builder.scalar(position, &token.text, JsonKind::Primitive)?,
            TokenKind::Comma | TokenKind::Colon => {}
        }
    }

    builder.finish(tokens.len())
}

/// Kind of the value a member token introduces, judged from the token two
/// positions ahead (past the colon).
fn value_kind(token: Option<&Token>) -> Option<JsonKind> {
    Some(match token?.kind {
        TokenKind::LeftBracket => JsonKind::Array,
        TokenKind::LeftBrace => JsonKind::Object,
        TokenKind::Primitive => JsonKind::Primitive,
        TokenKind::String => JsonKind::String,
        _ => return None,
    })
}

impl Builder {
    fn new(token_count: usize) -> Self {
        let sentinel = Object {
            kind: JsonKind::Object,
            members: vec![Member::default()],
        };
        let mut object_stack = Vec::with_capacity(token_count / 2 + 1);
        let mut member_stack = Vec::with_capacity(token_count / 2 + 1);
        object_stack.push(SENTINEL);
        member_stack.push(0);
        Self {
            objects: vec![sentinel],
            values: Vec::new(),
            object_stack,
            member_stack,
        }
    }

    fn top(&self, position: usize) -> Result<usize> {
        self.object_stack
            .last()
            .copied()
            .ok_or_else(|| Error::parse(position, "no open container"))
    }

    /// Links a new value into the open container: through the pending
    /// member for objects, as a new positional member for arrays.
    fn attach(&mut self, position: usize, kind: JsonKind, index: usize) -> Result<()> {
        let parent = self.top(position)?;
        match self.objects[parent].kind {
            JsonKind::Object => {
                let pending = self
                    .member_stack
                    .pop()
                    .ok_or_else(|| Error::parse(position, "value without a pending member"))?;
                let member = self.objects[parent]
                    .members
                    .get_mut(pending)
                    .ok_or_else(|| Error::parse(position, "pending member is out of range"))?;
                member.kind = kind;
                member.index = index;
            }
            JsonKind::Array => self.objects[parent].members.push(Member {
                name: String::new(),
                kind,
                index,
            }),
            other => {
                return Err(Error::parse(
                    position,
                    format!("container of kind {other:?} cannot hold values"),
                ))
            }
        }
        Ok(())
    }

    fn open(&mut self, position: usize, kind: JsonKind) -> Result<()> {
        let index = self.objects.len();
        self.attach(position, kind, index)?;
        self.objects.push(Object {
            kind,
            members: Vec::new(),
        });
        self.object_stack.push(index);
        Ok(())
    }

    fn close(&mut self, position: usize) -> Result<()> {
        if self.object_stack.len() <= 1 {
            return Err(Error::parse(position, "closing bracket without open container"));
        }
        self.object_stack.pop();
        Ok(())
    }

    fn member(&mut self, position: usize, name: &str, kind: JsonKind) -> Result<()> {
        let parent = self.top(position)?;
        let object = &mut self.objects[parent];
        if object.kind != JsonKind::Object {
            return Err(Error::parse(
                position,
                format!("member \"{name}\" inside a non-object container"),
            ));
        }
        let member_index = object.members.len();
        object.members.push(Member {
            name: name.to_owned(),
            kind,
            index: 0,
        });
        self.member_stack.push(member_index);
        Ok(())
    }

    fn scalar(&mut self, position: usize, text: &str, kind: JsonKind) -> Result<()> {
        let index = self.values.len();
        self.attach(position, kind, index)?;
        self.values.push(Value {
            text: text.to_owned(),
        });
        Ok(())
    }

    fn finish(mut self, position: usize) -> Result<Document> {
        if self.object_stack.len() != 1 {
            return Err(Error::parse(
                position,
                format!("{} container(s) left open", self.object_stack.len() - 1),
            ));
        }
        self.object_stack.pop();
        log::debug!(
            "built JSON document with {} objects and {} values",
            self.objects.len(),
            self.values.len()
        );
        Ok(Document {
            objects: self.objects,
            values: self.values,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::json::token::{strip_whitespace, tokenize};

    fn parse(text: &str) -> Result<Document> {
        build(&tokenize(&strip_whitespace(text)))
    }

    #[test]
    fn sentinel_links_to_root() {
        let doc = parse(r#"{"a":1}"#).unwrap();
        assert_eq!(doc.objects.len(), 2);
        assert_eq!(doc.objects[0].members.len(), 1);
        assert_eq!(doc.objects[0].members[0].index, 1);
        assert_eq!(doc.objects[1].members[0].name, "a");
        assert_eq!(doc.objects[1].members[0].kind, JsonKind::Primitive);
        assert_eq!(doc.values[0].text, "1");
    }

    #[test]
    fn objects_inside_arrays_become_positional_members() {
        let doc = parse(r#"{"nodes":[{"name":"A"},{"name":"B","mesh":0}]}"#).unwrap();
        let nodes = doc.root().get("nodes");
        assert_eq!(nodes.len(), 2);
        let second = nodes.at(1).unwrap();
        assert_eq!(second.kind(), JsonKind::Object);
        assert_eq!(second.name(), "");
        let second = second.as_object().unwrap();
        assert_eq!(second.member("name").unwrap().text(), "B");
        assert_eq!(second.member("mesh").unwrap().as_i32(), 0);
    }

    #[test]
    fn nested_members_pop_their_own_pending_slot() {
        let doc = parse(r#"{"a":{"b":{"c":[1,2]},"d":"x"},"e":3}"#).unwrap();
        let root = doc.root();
        assert_eq!(root.get("a").member("d").unwrap().text(), "x");
        assert_eq!(root.get("a").get("b").get("c").len(), 2);
        assert_eq!(root.member("e").unwrap().as_i32(), 3);
    }

    #[test]
    fn nested_arrays_are_positional_arrays() {
        let doc = parse(r#"{"m":[[1,2],[3]]}"#).unwrap();
        let m = doc.root().get("m");
        assert_eq!(m.len(), 2);
        let first = m.at(0).unwrap();
        assert_eq!(first.kind(), JsonKind::Array);
        assert_eq!(first.as_object().unwrap().len(), 2);
    }

    #[test]
    fn top_level_array_hangs_off_the_sentinel() {
        let doc = parse("[1,2,3]").unwrap();
        assert_eq!(doc.root().kind(), JsonKind::Array);
        assert_eq!(doc.root().len(), 3);
    }

    #[test]
    fn empty_input_yields_sentinel_root() {
        let doc = parse("").unwrap();
        assert!(doc.root().is_sentinel());
    }

    #[test]
    fn unbalanced_input_is_a_parse_error() {
        assert!(matches!(parse(r#"{"a":1}}"#), Err(Error::Parse { .. })));
        assert!(matches!(parse(r#"{"a":[1,2"#), Err(Error::Parse { .. })));
        assert!(matches!(parse(r#"{"a":}"#), Err(Error::Parse { .. })));
    }

    #[test]
    fn value_without_member_is_a_parse_error() {
        assert!(matches!(parse(r#"{"a":1,2}"#), Err(Error::Parse { .. })));
        assert!(matches!(parse(r#"{"a":1,[3]}"#), Err(Error::Parse { .. })));
    }

    #[test]
    fn member_inside_array_is_a_parse_error() {
        let err = parse(r#"["a":1]"#).unwrap_err();
        assert!(matches!(err, Error::Parse { position: 1, .. }));
    }
}
