use serde::Serialize;
use std::fmt;

/// Attribute key for the first positional value.
pub const DEFAULT_ATTR: &str = "default";

/// Attribute key holding the original text of an emoticon tag.
pub const EMOTICON_CODE_ATTR: &str = "code";

/// Type of a node in the document tree.
///
/// Renderers dispatch on this, a type they do not handle is skipped and its children are
/// rendered in place.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum NodeType {
    /// Document root.
    Document,

    /// Plain text.
    Text,

    /// `[b]`
    Bold,

    /// `[i]`
    Italic,

    /// `[u]`
    Underline,

    /// `[del]`
    Strikethrough,

    /// `[size=$SIZE]`
    Size,

    /// `[font=$FAMILY]`
    Font,

    /// `[color=$COLOR]`
    Color,

    /// `[url]` or `[url=$URL]`
    Url,

    /// `[img]`
    Image,

    /// `[audio]`
    Audio,

    /// `[video]`
    Video,

    /// `[code]` or `[code=$LANGUAGE]`, body kept verbatim.
    Code,

    /// `[quote]` or `[quote=$AUTHOR]`
    Quote,

    /// `[align=$ALIGN]`
    Align,

    /// `[left]`
    Left,

    /// `[center]`
    Center,

    /// `[right]`
    Right,

    /// `[list]`
    List,

    /// `[*]`
    ListItem,

    /// `[br]`, self closing.
    LineBreak,

    /// `[hr]`, self closing.
    Divider,

    /// Emoticon like `[ac01]`, self closing.
    Emoji,

    /// Math, both `$...$` formulas and `[math]` blocks.
    Latex,

    /// `[bili]` video embed.
    Bilibili,

    /// `[upload=$EXT,$FLAG]` attachment.
    Upload,

    /// `[noubb]`, body kept verbatim.
    NoUbb,
}

/// Tag names and the node type they map to.
///
/// Names are matched case insensitive.
const TAG_TABLE: &[(&str, NodeType)] = &[
    ("b", NodeType::Bold),
    ("i", NodeType::Italic),
    ("u", NodeType::Underline),
    ("del", NodeType::Strikethrough),
    ("size", NodeType::Size),
    ("font", NodeType::Font),
    ("color", NodeType::Color),
    ("url", NodeType::Url),
    ("img", NodeType::Image),
    ("audio", NodeType::Audio),
    ("video", NodeType::Video),
    ("code", NodeType::Code),
    ("quote", NodeType::Quote),
    ("align", NodeType::Align),
    ("left", NodeType::Left),
    ("center", NodeType::Center),
    ("right", NodeType::Right),
    ("list", NodeType::List),
    ("*", NodeType::ListItem),
    ("br", NodeType::LineBreak),
    ("hr", NodeType::Divider),
    ("math", NodeType::Latex),
    ("bili", NodeType::Bilibili),
    ("upload", NodeType::Upload),
    ("noubb", NodeType::NoUbb),
];

impl NodeType {
    /// Map a tag name to its node type.
    ///
    /// Emoticon codes are not in the table, they are recognized by the emoticon rules.
    pub fn from_tag_name(name: &str) -> Option<Self> {
        TAG_TABLE
            .iter()
            .find(|(x, _)| x.eq_ignore_ascii_case(name))
            .map(|(_, ty)| *ty)
    }

    /// The canonical tag name, if the type is written as a tag.
    pub fn tag_name(self) -> Option<&'static str> {
        TAG_TABLE
            .iter()
            .find(|(_, ty)| *ty == self)
            .map(|(name, _)| *name)
    }

    /// Never holds children.
    pub fn is_self_closing(self) -> bool {
        matches!(self, Self::LineBreak | Self::Divider | Self::Emoji)
    }

    /// Body is captured as raw text without parsing tags inside.
    pub fn is_verbatim(self) -> bool {
        matches!(self, Self::Code | Self::NoUbb)
    }

    /// The well known attribute key renderers read the first value from.
    pub fn conventional_key(self) -> Option<&'static str> {
        match self {
            Self::Image | Self::Audio | Self::Video => Some("src"),
            Self::Size => Some("size"),
            Self::Font => Some("font"),
            Self::Color => Some("color"),
            Self::Url => Some("href"),
            Self::Align => Some("align"),
            Self::Code => Some("language"),
            Self::Quote => Some("author"),
            _ => None,
        }
    }
}

impl fmt::Display for NodeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Attribute key of the positional value at `index`.
///
/// `default` for the first one, then `1`, `2`, ...
pub(crate) fn positional_key(index: usize) -> String {
    if index == 0 {
        DEFAULT_ATTR.to_string()
    } else {
        index.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_ignores_case() {
        assert_eq!(NodeType::from_tag_name("B"), Some(NodeType::Bold));
        assert_eq!(NodeType::from_tag_name("Url"), Some(NodeType::Url));
        assert_eq!(NodeType::from_tag_name("*"), Some(NodeType::ListItem));
        assert_eq!(NodeType::from_tag_name("NOUBB"), Some(NodeType::NoUbb));
        assert_eq!(NodeType::from_tag_name("ghost"), None);
        assert_eq!(NodeType::from_tag_name(""), None);
    }

    #[test]
    fn test_names_round_trip() {
        for (name, ty) in TAG_TABLE {
            assert_eq!(ty.tag_name(), Some(*name));
        }
        assert_eq!(NodeType::Document.tag_name(), None);
        assert_eq!(NodeType::Emoji.tag_name(), None);
    }

    #[test]
    fn test_positional_keys() {
        assert_eq!(positional_key(0), "default");
        assert_eq!(positional_key(1), "1");
        assert_eq!(positional_key(12), "12");
    }
}
