//! Leaf constructs shared by feeds, sources and entries.
use url::Url;

use super::base::{impl_extensible, AtomBase, EntityKind};
use crate::util::resolve_uri;

// ============================================================================
// Link
// ============================================================================

/// `<link>`. Collections key links on `(rel, content_type)`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Link {
    pub href: Option<String>,
    pub rel: Option<String>,
    pub content_type: Option<String>,
    pub hreflang: Option<String>,
    pub title: Option<String>,
    pub length: Option<u64>,
    pub base: AtomBase,
}

impl Link {
    pub fn new(href: impl Into<String>, rel: Option<&str>, content_type: Option<&str>) -> Self {
        Self {
            href: Some(href.into()),
            rel: rel.map(str::to_owned),
            content_type: content_type.map(str::to_owned),
            ..Self::default()
        }
    }

    /// Resolves `href` against this link's own `xml:base`, which is in turn
    /// resolved against `inherited`.
    pub fn resolve(&self, inherited: Option<&str>) -> Result<Url, url::ParseError> {
        let base = match self.base.xml_base.as_deref() {
            Some(own) => Some(resolve_uri(inherited, own)?.to_string()),
            None => inherited.map(str::to_owned),
        };
        resolve_uri(base.as_deref(), self.href.as_deref().unwrap_or_default())
    }
}

// ============================================================================
// Category
// ============================================================================

/// `<category>`. Collections key categories on `term`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Category {
    pub term: String,
    pub scheme: Option<String>,
    pub label: Option<String>,
    pub base: AtomBase,
}

impl Category {
    pub fn new(term: impl Into<String>, scheme: Option<&str>) -> Self {
        Self {
            term: term.into(),
            scheme: scheme.map(str::to_owned),
            ..Self::default()
        }
    }
}

// ============================================================================
// Person
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PersonKind {
    Author,
    Contributor,
}

impl PersonKind {
    pub fn as_str(self) -> &'static str {
        match self {
            PersonKind::Author => "author",
            PersonKind::Contributor => "contributor",
        }
    }
}

/// `<author>` or `<contributor>`; both roles share one shape.
#[derive(Debug, Clone, PartialEq)]
pub struct Person {
    pub kind: PersonKind,
    pub name: Option<String>,
    pub uri: Option<String>,
    pub email: Option<String>,
    pub base: AtomBase,
}

impl Person {
    pub fn new(kind: PersonKind) -> Self {
        Self {
            kind,
            name: None,
            uri: None,
            email: None,
            base: AtomBase::default(),
        }
    }

    pub fn author(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::new(PersonKind::Author)
        }
    }

    pub fn contributor(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::new(PersonKind::Contributor)
        }
    }
}

// ============================================================================
// Text Construct
// ============================================================================

/// How the body of a text construct is encoded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum TextType {
    /// Plain character data, read unescaped.
    #[default]
    Text,
    /// Escaped HTML, kept as it appears in the document.
    Html,
    /// An inline XHTML `div`, kept as raw markup.
    Xhtml,
}

impl TextType {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "text" => Some(TextType::Text),
            "html" => Some(TextType::Html),
            "xhtml" => Some(TextType::Xhtml),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            TextType::Text => "text",
            TextType::Html => "html",
            TextType::Xhtml => "xhtml",
        }
    }
}

/// `<title>`, `<subtitle>`, `<rights>` and `<summary>`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TextConstruct {
    pub text_type: TextType,
    pub text: String,
    pub base: AtomBase,
}

impl TextConstruct {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::default()
        }
    }
}

// ============================================================================
// Generator, Content, Uri
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Generator {
    pub text: String,
    pub uri: Option<String>,
    pub version: Option<String>,
    pub base: AtomBase,
}

/// `<content>`. Without a `type` the body is plain text.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Content {
    pub content_type: Option<String>,
    pub src: Option<String>,
    pub body: String,
    pub base: AtomBase,
}

impl Content {
    /// True when the body was read as character data rather than markup.
    pub fn is_text(&self) -> bool {
        matches!(self.content_type.as_deref(), None | Some("text"))
    }
}

/// An element whose whole value is one URI: `<id>`, `<icon>`, `<logo>`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BaseLink {
    pub uri: String,
    pub base: AtomBase,
}

impl BaseLink {
    pub fn new(uri: impl Into<String>) -> Self {
        Self {
            uri: uri.into(),
            base: AtomBase::default(),
        }
    }
}

impl_extensible! {
    Link => EntityKind::Link,
    Category => EntityKind::Category,
    Person => EntityKind::Person,
    TextConstruct => EntityKind::Text,
    Generator => EntityKind::Generator,
    Content => EntityKind::Content,
    BaseLink => EntityKind::Uri,
}
