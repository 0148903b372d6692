//! Parse ubb markup into a document tree.
//!
//! ```
//! let doc = ubb_parser::parse("[b]Hello[/b] [ac01]");
//! assert_eq!(doc.text_content(doc.root_id()), "Hello ");
//! ```

pub mod ast;
pub mod lexer;
pub mod parser;
mod scanner;
pub mod tag;
pub mod token;

pub use ast::{DocumentStats, NodeId, NodeKind, UbbDocument, UbbNode};
pub use parser::Parser;
pub use tag::NodeType;
pub use token::{Token, TokenKind};
pub use ubb_emoticon::{EmoticonError, EmoticonRuleSet};

const OPEN: char = '[';
const CLOSE: char = ']';
const SLASH: char = '/';
const EQUAL: char = '=';
const COMMA: char = ',';
const DOLLAR: char = '$';

/// Split `data` into tokens, ending with [`TokenKind::Eof`].
pub fn scan(data: impl AsRef<str>) -> Vec<Token> {
    lexer::Lexer::new(data.as_ref()).scan()
}

/// Parse `data` with the built-in emoticon rules.
pub fn parse(data: impl AsRef<str>) -> UbbDocument {
    parse_with(data, EmoticonRuleSet::builtin())
}

/// Parse `data`, recognizing emoticons by `emoticons`.
pub fn parse_with(data: impl AsRef<str>, emoticons: &EmoticonRuleSet) -> UbbDocument {
    Parser::new(scan(data), emoticons).parse()
}
