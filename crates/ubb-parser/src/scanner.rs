/// Scanner on a string.
///
/// Walks characters and reports byte positions, so any range it hands out is a valid slice of
/// the source.
pub(crate) struct Scanner<'a> {
    /// Source text.
    source: &'a str,

    /// Current byte position.
    position: usize,
}

impl<'a> Scanner<'a> {
    pub(crate) fn new(source: &'a str) -> Scanner<'a> {
        Self {
            source,
            position: 0,
        }
    }

    /// Get character at the current position, without advancing.
    pub fn curr(&self) -> Option<char> {
        self.source[self.position..].chars().next()
    }

    /// Get the character after the current one, without advancing.
    pub fn peek(&self) -> Option<char> {
        let mut chars = self.source[self.position..].chars();
        chars.next()?;
        chars.next()
    }

    /// Move the position forward and return the character walked through.
    ///
    /// Return `None` if already finished.
    pub fn next(&mut self) -> Option<char> {
        let ch = self.curr()?;
        self.position += ch.len_utf8();
        Some(ch)
    }

    /// Advance while `pred` holds on the current character.
    pub fn skip_while(&mut self, mut pred: impl FnMut(char) -> bool) {
        while let Some(ch) = self.curr() {
            if !pred(ch) {
                break;
            }
            self.position += ch.len_utf8();
        }
    }

    /// Get a slice from `start` to the current position.
    ///
    /// The caller must ensure `start` is a position previously reported by this scanner.
    pub fn slice_from(&self, start: usize) -> &'a str {
        &self.source[start..self.position]
    }

    pub fn position(&self) -> usize {
        self.position
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_walk_multibyte() {
        let mut scanner = Scanner::new("表情[b]");
        assert_eq!(scanner.curr(), Some('表'));
        assert_eq!(scanner.peek(), Some('情'));
        scanner.skip_while(|x| x != '[');
        assert_eq!(scanner.position(), "表情".len());
        assert_eq!(scanner.slice_from(0), "表情");
        assert_eq!(scanner.next(), Some('['));
        assert_eq!(scanner.next(), Some('b'));
        assert_eq!(scanner.next(), Some(']'));
        assert_eq!(scanner.curr(), None);
        assert_eq!(scanner.next(), None);
        assert_eq!(scanner.peek(), None);
    }
}
