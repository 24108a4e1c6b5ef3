mod builder;
pub mod document;
pub mod token;

pub use document::{Document, JsonKind, Member, MemberRef, Object, ObjectRef, Value};
pub use token::{strip_whitespace, tokenize, Token, TokenKind};
