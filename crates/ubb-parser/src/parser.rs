use std::collections::BTreeMap;

use tracing::{debug, trace};
use ubb_emoticon::EmoticonRuleSet;

use crate::ast::{NodeId, NodeKind, UbbDocument};
use crate::tag::{positional_key, NodeType, DEFAULT_ATTR, EMOTICON_CODE_ATTR};
use crate::token::{Token, TokenKind};
use crate::OPEN;

/// A tag waiting for its closing tag.
#[derive(Clone, Copy, Debug)]
struct Frame {
    node: NodeId,

    /// Type a closing tag must map to for this frame to end.
    ///
    /// `None` for the document root, which only ends with the input.
    closing: Option<NodeType>,
}

/// One parsed element, not attached to the tree yet.
#[derive(Debug, PartialEq, Eq)]
enum Element {
    Text(String),

    Latex { formula: String, is_block: bool },

    Tag {
        node_type: NodeType,
        attributes: BTreeMap<String, String>,
    },
}

/// Build a [`UbbDocument`] from tokens.
///
/// Parsing never fails. A tag that can not be parsed is replaced by text holding exactly the
/// tokens it consumed, and the rest of the input is not affected.
///
/// Open tags are kept on an explicit frame stack instead of the call stack, so deeply nested
/// input can not overflow.
pub struct Parser<'a> {
    tokens: Vec<Token>,

    /// Index of the next token to consume.
    index: usize,

    emoticons: &'a EmoticonRuleSet,

    document: UbbDocument,
}

impl<'a> Parser<'a> {
    pub fn new(tokens: Vec<Token>, emoticons: &'a EmoticonRuleSet) -> Self {
        Self {
            tokens,
            index: 0,
            emoticons,
            document: UbbDocument::new(),
        }
    }

    /// Run the process.
    pub fn parse(mut self) -> UbbDocument {
        let mut frames = vec![Frame {
            node: self.document.root_id(),
            closing: None,
        }];

        while !self.at_end() {
            let Some(frame) = frames.last().copied() else {
                break;
            };

            // Only the innermost frame may take a closing tag.
            if let Some(expected) = frame.closing {
                if self.try_consume_closing(expected) {
                    frames.pop();
                    continue;
                }
            }

            match self.parse_element() {
                Element::Text(content) => {
                    self.document
                        .append(frame.node, NodeType::Text, NodeKind::Text { content });
                }
                Element::Latex { formula, is_block } => {
                    self.document.append(
                        frame.node,
                        NodeType::Latex,
                        NodeKind::Latex { formula, is_block },
                    );
                }
                Element::Tag {
                    node_type,
                    attributes,
                } => {
                    let node =
                        self.document
                            .append(frame.node, node_type, NodeKind::Tag { attributes });
                    if node_type.is_self_closing() {
                        continue;
                    }
                    if node_type.is_verbatim() {
                        self.parse_verbatim_content(node, node_type);
                    } else {
                        frames.push(Frame {
                            node,
                            closing: Some(node_type),
                        });
                    }
                }
            }
        }

        if frames.len() > 1 {
            debug!("{} tag(s) left open at end of input", frames.len() - 1);
        }
        debug!(
            "parsed {} tokens into {} nodes",
            self.tokens.len(),
            self.document.nodes().len()
        );
        self.document
    }

    fn at_end(&self) -> bool {
        self.kind_at(0) == TokenKind::Eof
    }

    /// Kind of the token `offset` after the current one, [`TokenKind::Eof`] if out of range.
    fn kind_at(&self, offset: usize) -> TokenKind {
        self.tokens
            .get(self.index + offset)
            .map_or(TokenKind::Eof, |x| x.kind)
    }

    fn text_at(&self, offset: usize) -> &str {
        self.tokens
            .get(self.index + offset)
            .map_or("", |x| x.text.as_str())
    }

    fn bump(&mut self) {
        if self.index < self.tokens.len() {
            self.index += 1;
        }
    }

    /// Consume `count` tokens and return their text.
    fn consume_text(&mut self, count: usize) -> String {
        let end = (self.index + count).min(self.tokens.len());
        let text = self.text_between(self.index, end);
        self.index = end;
        text
    }

    fn text_between(&self, start: usize, end: usize) -> String {
        self.tokens[start..end]
            .iter()
            .map(|x| x.text.as_str())
            .collect()
    }

    /// Check current position is on a closing tag `[/name]` of type `expected`, consume it if so.
    ///
    /// The `]` may be missing at end of input.
    fn try_consume_closing(&mut self, expected: NodeType) -> bool {
        if self.kind_at(0) != TokenKind::LeftBracket
            || self.kind_at(1) != TokenKind::Slash
            || self.kind_at(2) != TokenKind::TagName
            || !matches!(self.kind_at(3), TokenKind::RightBracket | TokenKind::Eof)
        {
            return false;
        }
        if NodeType::from_tag_name(self.text_at(2)) != Some(expected) {
            return false;
        }

        self.consume_text(3);
        if self.kind_at(0) == TokenKind::RightBracket {
            self.bump();
        }
        true
    }

    fn parse_element(&mut self) -> Element {
        match self.kind_at(0) {
            TokenKind::Dollar | TokenKind::DoubleDollar => self.parse_latex(),
            TokenKind::LeftBracket => self.parse_tag_header_or_fallback(),
            // Text, and stray tokens like a lonely `]` left by a failed tag.
            _ => Element::Text(self.consume_text(1)),
        }
    }

    /// The caller shall ensure current position is on a `$` or `$$`.
    fn parse_latex(&mut self) -> Element {
        let delimiter = self.kind_at(0);
        self.bump();

        let formula = if self.kind_at(0) == TokenKind::Text {
            self.consume_text(1)
        } else {
            String::new()
        };
        if self.kind_at(0) == delimiter {
            self.bump();
        } else {
            trace!("unterminated math delimiter before token {}", self.index);
        }

        Element::Latex {
            formula,
            is_block: delimiter == TokenKind::DoubleDollar,
        }
    }

    /// The caller shall ensure current position is on the `[`.
    fn parse_tag_header_or_fallback(&mut self) -> Element {
        let start = self.index;
        self.bump();

        if self.kind_at(0) != TokenKind::TagName {
            return Element::Text(self.text_between(start, self.index));
        }
        let name = self.consume_text(1);

        // Bare emoticon codes take priority over the tag table.
        if self.kind_at(0) == TokenKind::RightBracket && self.emoticons.is_emoticon(&name) {
            self.bump();
            return Element::Tag {
                node_type: NodeType::Emoji,
                attributes: BTreeMap::from([(EMOTICON_CODE_ATTR.to_string(), name)]),
            };
        }

        let Some(node_type) = NodeType::from_tag_name(&name) else {
            trace!("unknown tag {name:?} at token {start}, keep as text");
            return Element::Text(self.text_between(start, self.index));
        };

        let mut attributes = BTreeMap::new();
        let mut count = 0;
        loop {
            match self.kind_at(0) {
                TokenKind::RightBracket => {
                    self.bump();
                    break;
                }
                TokenKind::Equal | TokenKind::Comma => {
                    self.bump();
                    match self.kind_at(0) {
                        TokenKind::AttrValue => {
                            let value = self.consume_text(1);
                            if value.contains(OPEN) {
                                return self.fallback(start);
                            }
                            attributes.insert(positional_key(count), value);
                            count += 1;
                        }
                        // Empty value.
                        TokenKind::RightBracket | TokenKind::Comma => {}
                        _ => return self.fallback(start),
                    }
                }
                _ => return self.fallback(start),
            }
        }

        if let Some(key) = node_type.conventional_key() {
            if let Some(value) = attributes.get(DEFAULT_ATTR).cloned() {
                attributes.insert(key.to_string(), value);
            }
        }

        Element::Tag {
            node_type,
            attributes,
        }
    }

    /// Replace everything consumed since `start` with plain text.
    fn fallback(&self, start: usize) -> Element {
        trace!(
            "malformed tag from token {start} to {}, fallback to text",
            self.index
        );
        Element::Text(self.text_between(start, self.index))
    }

    /// Capture the raw body of a verbatim tag until its matching closing tag.
    ///
    /// Bare opening tags of the same name inside the body nest, so
    /// `[noubb][noubb]x[/noubb][/noubb]` keeps the inner pair as text.
    fn parse_verbatim_content(&mut self, node: NodeId, node_type: NodeType) {
        let Some(name) = node_type.tag_name() else {
            return;
        };

        let mut depth = 1usize;
        let mut raw = String::new();
        while !self.at_end() {
            if self.is_verbatim_closing(name) {
                depth -= 1;
                if depth == 0 {
                    self.consume_text(4);
                    break;
                }
                raw.push_str(&self.consume_text(4));
            } else if self.is_verbatim_opening(name) {
                depth += 1;
                raw.push_str(&self.consume_text(3));
            } else {
                raw.push_str(&self.consume_text(1));
            }
        }

        if depth > 0 {
            trace!("verbatim {name} not closed before end of input");
        }
        if !raw.is_empty() {
            self.document
                .append(node, NodeType::Text, NodeKind::Text { content: raw });
        }
    }

    /// `[/name]`
    fn is_verbatim_closing(&self, name: &str) -> bool {
        self.kind_at(0) == TokenKind::LeftBracket
            && self.kind_at(1) == TokenKind::Slash
            && self.kind_at(2) == TokenKind::TagName
            && self.text_at(2).eq_ignore_ascii_case(name)
            && self.kind_at(3) == TokenKind::RightBracket
    }

    /// `[name]`
    fn is_verbatim_opening(&self, name: &str) -> bool {
        self.kind_at(0) == TokenKind::LeftBracket
            && self.kind_at(1) == TokenKind::TagName
            && self.text_at(1).eq_ignore_ascii_case(name)
            && self.kind_at(2) == TokenKind::RightBracket
    }
}
