use crate::scanner::Scanner;
use crate::token::{Token, TokenKind};
use crate::{CLOSE, COMMA, DOLLAR, EQUAL, OPEN, SLASH};

/// Turn ubb markup into tokens.
///
/// Lexing is context sensitive: inside a bracket, `=` only separates a tag name from its value,
/// and `/` only marks a closing tag right after `[`. Everywhere else they are content, which
/// keeps urls like `[url=http://a.com/?x=1]` in one value.
pub struct Lexer<'a> {
    /// Inner scanner.
    source: Scanner<'a>,

    /// Inside a `[` that is not closed yet.
    in_tag: bool,

    /// Kind of the last emitted token.
    last_kind: TokenKind,

    /// Scanned tokens.
    tokens: Vec<Token>,
}

impl<'a> Lexer<'a> {
    pub fn new(data: &'a str) -> Self {
        Self {
            source: Scanner::new(data),
            in_tag: false,
            last_kind: TokenKind::Eof,
            tokens: vec![],
        }
    }

    /// Run the process.
    ///
    /// The returned stream always ends with a [`TokenKind::Eof`] token.
    pub fn scan(mut self) -> Vec<Token> {
        while let Some(ch) = self.source.curr() {
            let token = if self.in_tag {
                self.scan_in_tag(ch)
            } else {
                match ch {
                    OPEN => {
                        self.in_tag = true;
                        self.single(TokenKind::LeftBracket)
                    }
                    DOLLAR => self.scan_math_delimiter(),
                    _ => self.scan_text(),
                }
            };

            self.last_kind = token.kind;
            self.tokens.push(token);
        }

        self.tokens
            .push(Token::new(TokenKind::Eof, "", self.source.position()));
        self.tokens
    }

    /// The caller shall ensure current position is inside a bracket, on `ch`.
    fn scan_in_tag(&mut self, ch: char) -> Token {
        match ch {
            CLOSE => {
                self.in_tag = false;
                self.single(TokenKind::RightBracket)
            }
            COMMA => self.single(TokenKind::Comma),
            EQUAL if self.last_kind == TokenKind::TagName => self.single(TokenKind::Equal),
            SLASH if self.last_kind == TokenKind::LeftBracket => self.single(TokenKind::Slash),
            _ => self.scan_tag_content(),
        }
    }

    /// Scan a tag name or an attribute value.
    ///
    /// Always takes at least the current character, so `[=x]` gives a tag name `=x` rather than
    /// an empty one.
    fn scan_tag_content(&mut self) -> Token {
        let start = self.source.position();
        let reading_name = matches!(self.last_kind, TokenKind::LeftBracket | TokenKind::Slash);
        self.source.next();
        self.source
            .skip_while(|x| !(x == CLOSE || x == COMMA || (reading_name && x == EQUAL)));

        let kind = if reading_name {
            TokenKind::TagName
        } else {
            TokenKind::AttrValue
        };
        Token::new(kind, self.source.slice_from(start), start)
    }

    fn scan_text(&mut self) -> Token {
        let start = self.source.position();
        self.source.skip_while(|x| x != OPEN && x != DOLLAR);
        Token::new(TokenKind::Text, self.source.slice_from(start), start)
    }

    /// The caller shall ensure current position is on a `$`.
    fn scan_math_delimiter(&mut self) -> Token {
        if self.source.peek() != Some(DOLLAR) {
            return self.single(TokenKind::Dollar);
        }
        let start = self.source.position();
        self.source.next();
        self.source.next();
        Token::new(TokenKind::DoubleDollar, self.source.slice_from(start), start)
    }

    /// Consume the current character as a token of `kind`.
    fn single(&mut self, kind: TokenKind) -> Token {
        let start = self.source.position();
        self.source.next();
        Token::new(kind, self.source.slice_from(start), start)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use TokenKind::*;

    fn kinds(data: &str) -> Vec<TokenKind> {
        Lexer::new(data).scan().into_iter().map(|x| x.kind).collect()
    }

    fn texts(data: &str) -> Vec<String> {
        Lexer::new(data)
            .scan()
            .into_iter()
            .filter(|x| x.kind != Eof)
            .map(|x| x.text)
            .collect()
    }

    #[test]
    fn test_empty_input() {
        let tokens = Lexer::new("").scan();
        assert_eq!(tokens, vec![Token::new(Eof, "", 0)]);
    }

    #[test]
    fn test_simple_tag() {
        assert_eq!(
            kinds("[b]Bold[/b]"),
            vec![
                LeftBracket,
                TagName,
                RightBracket,
                Text,
                LeftBracket,
                Slash,
                TagName,
                RightBracket,
                Eof
            ]
        );
        assert_eq!(texts("[b]Bold[/b]"), ["[", "b", "]", "Bold", "[", "/", "b", "]"]);
    }

    #[test]
    fn test_attributes() {
        assert_eq!(
            kinds("[upload=jpg,1]"),
            vec![LeftBracket, TagName, Equal, AttrValue, Comma, AttrValue, RightBracket, Eof]
        );
        assert_eq!(texts("[upload=jpg,1]"), ["[", "upload", "=", "jpg", ",", "1", "]"]);
    }

    #[test]
    fn test_equal_and_slash_inside_value() {
        let tokens = Lexer::new("[url=http://cc98.org/index.asp?id=1]Link[/url]").scan();
        assert_eq!(tokens[1], Token::new(TagName, "url", 1));
        assert_eq!(tokens[2], Token::new(Equal, "=", 4));
        assert_eq!(tokens[3], Token::new(AttrValue, "http://cc98.org/index.asp?id=1", 5));
        assert_eq!(tokens[4].kind, RightBracket);
    }

    #[test]
    fn test_value_split_by_comma() {
        assert_eq!(
            texts("[url=http://cc98.org,1]"),
            ["[", "url", "=", "http://cc98.org", ",", "1", "]"]
        );
    }

    #[test]
    fn test_missing_value() {
        assert_eq!(kinds("[size=]"), vec![LeftBracket, TagName, Equal, RightBracket, Eof]);
        assert_eq!(
            kinds("[size=,2]"),
            vec![LeftBracket, TagName, Equal, Comma, AttrValue, RightBracket, Eof]
        );
    }

    #[test]
    fn test_math_delimiters() {
        assert_eq!(
            kinds("$x+y$ and $$E=mc^2$$"),
            vec![Dollar, Text, Dollar, Text, DoubleDollar, Text, DoubleDollar, Eof]
        );
        assert_eq!(kinds("$$$"), vec![DoubleDollar, Dollar, Eof]);
    }

    #[test]
    fn test_unclosed_bracket() {
        let tokens = Lexer::new("Hello [b PlainText").scan();
        assert_eq!(tokens[2], Token::new(TagName, "b PlainText", 7));
        assert_eq!(tokens[3].kind, Eof);
        assert_eq!(tokens[3].position, 18);
    }

    #[test]
    fn test_nested_open_bracket_is_content() {
        assert_eq!(texts("[[b]]"), ["[", "[b", "]", "]"]);
        assert_eq!(kinds("[[b]]"), vec![LeftBracket, TagName, RightBracket, Text, Eof]);
    }

    #[test]
    fn test_right_bracket_outside_tag_is_text() {
        let tokens =
            Lexer::new("[size]this is a test that contains a right bracket] and a slash/,[/size]")
                .scan();
        assert_eq!(tokens[3].kind, Text);
        assert_eq!(
            tokens[3].text,
            "this is a test that contains a right bracket] and a slash/,"
        );
        assert_eq!(tokens[5].kind, Slash);
        assert_eq!(tokens[6].kind, TagName);
    }

    #[test]
    fn test_leading_equal_is_tag_name() {
        assert_eq!(texts("[=x]"), ["[", "=x", "]"]);
        assert_eq!(kinds("[=x]"), vec![LeftBracket, TagName, RightBracket, Eof]);
        assert_eq!(texts("[b==1]"), ["[", "b", "=", "=1", "]"]);
    }

    #[test]
    fn test_multibyte_positions() {
        let tokens = Lexer::new("表情[ac01]").scan();
        assert_eq!(tokens[0], Token::new(Text, "表情", 0));
        assert_eq!(tokens[1], Token::new(LeftBracket, "[", 6));
        assert_eq!(tokens[2], Token::new(TagName, "ac01", 7));
    }
}
