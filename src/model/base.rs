use std::any::Any;
use std::fmt;

// ============================================================================
// Extension Elements
// ============================================================================

/// Object-safe plumbing for [`ExtensionElement`]. Implemented automatically
/// for every extension type that is `Clone + PartialEq`.
pub trait ExtensionObject: fmt::Debug + Any {
    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
    fn clone_boxed(&self) -> Box<dyn ExtensionElement>;
    fn eq_dyn(&self, other: &dyn ExtensionElement) -> bool;
}

impl<T> ExtensionObject for T
where
    T: ExtensionElement + Clone + PartialEq + 'static,
{
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    fn clone_boxed(&self) -> Box<dyn ExtensionElement> {
        Box::new(self.clone())
    }

    fn eq_dyn(&self, other: &dyn ExtensionElement) -> bool {
        other
            .as_any()
            .downcast_ref::<T>()
            .is_some_and(|other| other == self)
    }
}

/// A value contributed by a schema module. The core stores it in document
/// position but never looks inside.
pub trait ExtensionElement: ExtensionObject {
    /// Namespace URI of the element (or attribute) this value came from.
    fn namespace(&self) -> &str;
    fn local_name(&self) -> &str;
}

impl Clone for Box<dyn ExtensionElement> {
    fn clone(&self) -> Self {
        self.clone_boxed()
    }
}

impl PartialEq for dyn ExtensionElement {
    fn eq(&self, other: &Self) -> bool {
        self.eq_dyn(other)
    }
}

/// Ordered sequence of extension values attached to one entity.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExtensionElements(Vec<Box<dyn ExtensionElement>>);

impl ExtensionElements {
    pub fn push<T: ExtensionElement>(&mut self, element: T) {
        self.0.push(Box::new(element));
    }

    pub fn push_boxed(&mut self, element: Box<dyn ExtensionElement>) {
        self.0.push(element);
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &dyn ExtensionElement> {
        self.0.iter().map(|element| element.as_ref())
    }

    /// First element of type `T`.
    pub fn find<T: ExtensionElement>(&self) -> Option<&T> {
        self.0
            .iter()
            .find_map(|element| element.as_any().downcast_ref::<T>())
    }

    pub fn find_mut<T: ExtensionElement>(&mut self) -> Option<&mut T> {
        self.0
            .iter_mut()
            .find_map(|element| element.as_any_mut().downcast_mut::<T>())
    }

    /// Every element of type `T`, in document order.
    pub fn find_all<T: ExtensionElement>(&self) -> impl Iterator<Item = &T> {
        self.0
            .iter()
            .filter_map(|element| element.as_any().downcast_ref::<T>())
    }

    /// Drops every element of type `T`. Returns how many were removed.
    pub fn remove_all<T: ExtensionElement>(&mut self) -> usize {
        let before = self.0.len();
        self.0.retain(|element| !element.as_any().is::<T>());
        before - self.0.len()
    }
}

// ============================================================================
// Base Attributes
// ============================================================================

/// State every entity carries: the inherited `xml:base` and `xml:lang`, and
/// the extension values schema modules attached to it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AtomBase {
    pub xml_base: Option<String>,
    pub xml_lang: Option<String>,
    pub extensions: ExtensionElements,
}

/// What an [`Extensible`] entity is, so extension handlers can decide
/// whether an element makes sense where it was found.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Feed,
    Source,
    Entry,
    Link,
    Category,
    Person,
    Text,
    Generator,
    Content,
    Uri,
}

impl EntityKind {
    pub fn as_str(self) -> &'static str {
        match self {
            EntityKind::Feed => "feed",
            EntityKind::Source => "source",
            EntityKind::Entry => "entry",
            EntityKind::Link => "link",
            EntityKind::Category => "category",
            EntityKind::Person => "person",
            EntityKind::Text => "text construct",
            EntityKind::Generator => "generator",
            EntityKind::Content => "content",
            EntityKind::Uri => "uri",
        }
    }
}

/// An entity extension handlers can populate.
pub trait Extensible {
    fn base(&self) -> &AtomBase;
    fn base_mut(&mut self) -> &mut AtomBase;
    fn kind(&self) -> EntityKind;

    fn extensions(&self) -> &ExtensionElements {
        &self.base().extensions
    }

    fn extensions_mut(&mut self) -> &mut ExtensionElements {
        &mut self.base_mut().extensions
    }
}

macro_rules! impl_extensible {
    ($($ty:ty => $kind:expr),* $(,)?) => {
        $(
            impl $crate::model::Extensible for $ty {
                fn base(&self) -> &$crate::model::AtomBase {
                    &self.base
                }

                fn base_mut(&mut self) -> &mut $crate::model::AtomBase {
                    &mut self.base
                }

                fn kind(&self) -> $crate::model::EntityKind {
                    $kind
                }
            }
        )*
    };
}

pub(crate) use impl_extensible;
