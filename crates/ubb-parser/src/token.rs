use serde::Serialize;
use std::fmt;

/// All kinds of tokens.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum TokenKind {
    /// `[`
    LeftBracket,

    /// `]`
    RightBracket,

    /// `/` right after `[`, marks a closing tag.
    Slash,

    /// `=` right after a tag name.
    Equal,

    /// `,` inside a tag.
    Comma,

    /// `$`, inline math delimiter.
    Dollar,

    /// `$$`, block math delimiter.
    DoubleDollar,

    /// Name right after `[` or `[/`.
    ///
    /// `b`, `url`, `img`, `ac01`.
    TagName,

    /// Attribute value after `=` or `,`.
    AttrValue,

    /// Plain text outside tags.
    Text,

    /// End of input, always the last token and always empty.
    Eof,
}

/// Tokens are units of ubb markup.
///
/// Text of all tokens in a stream joins back into the source.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Token {
    pub kind: TokenKind,

    /// Source text covered by the token.
    pub text: String,

    /// Byte offset in the source.
    pub position: usize,
}

impl Token {
    pub fn new(kind: TokenKind, text: impl Into<String>, position: usize) -> Self {
        Self {
            kind,
            text: text.into(),
            position,
        }
    }

    pub fn is(&self, kind: TokenKind) -> bool {
        self.kind == kind
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:>6} {:?} {:?}", self.position, self.kind, self.text)
    }
}
