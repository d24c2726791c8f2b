//! Extension dispatch: how schema modules claim elements and attributes the
//! core grammar does not own.
//!
//! A handler is registered for one namespace. Each unknown node is offered
//! exactly once, to the handler of its namespace or, failing that, to the
//! catch-all handler if one is installed. A handler either consumes the
//! node (usually attaching an [`ExtensionElement`] to the target) or
//! declines it, in which case the engine skips it.
//!
//! [`ExtensionElement`]: crate::model::ExtensionElement
pub mod calendar;
mod raw;

use std::collections::HashMap;

pub use raw::{RawAttribute, RawCapture, RawElement};

use crate::error::Fault;
use crate::model::Extensible;
use crate::parser::Constructs;
use crate::xml::{Atom, Attribute, XmlCursor};

/// Outcome of offering a node to a handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    /// The handler read the node. For elements the cursor may be anywhere
    /// inside it; the engine resumes at the next sibling.
    Consumed,
    /// The handler did not touch the cursor.
    Declined,
}

/// A schema module plugged into the parse pass.
pub trait ExtensionHandler {
    /// Namespace URI this handler serves.
    fn namespace(&self) -> &str;

    /// Called with the cursor on an element in [`ExtensionHandler::namespace`]
    /// that belongs to `target`.
    fn on_element(
        &self,
        constructs: &Constructs<'_>,
        cursor: &mut XmlCursor<'_>,
        target: &mut dyn Extensible,
    ) -> Result<Disposition, Fault>;

    /// Called for an attribute of the current element that the core did not
    /// recognise.
    fn on_attribute(
        &self,
        _cursor: &XmlCursor<'_>,
        _attribute: &Attribute,
        _target: &mut dyn Extensible,
    ) -> Result<Disposition, Fault> {
        Ok(Disposition::Declined)
    }
}

/// Handlers keyed by namespace atom, plus an optional catch-all.
#[derive(Default)]
pub struct ExtensionRegistry {
    handlers: HashMap<Atom, Box<dyn ExtensionHandler>>,
    fallback: Option<Box<dyn ExtensionHandler>>,
}

impl ExtensionRegistry {
    /// Installs `handler` for `namespace`, replacing any earlier one.
    pub fn insert(&mut self, namespace: Atom, handler: Box<dyn ExtensionHandler>) {
        if let Some(previous) = self.handlers.insert(namespace, handler) {
            tracing::warn!(
                namespace = previous.namespace(),
                "Replacing previously registered extension handler"
            );
        }
    }

    /// Installs the handler that sees nodes no namespace handler claims.
    pub fn set_fallback(&mut self, handler: Box<dyn ExtensionHandler>) {
        self.fallback = Some(handler);
    }

    pub fn len(&self) -> usize {
        self.handlers.len() + usize::from(self.fallback.is_some())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn handler_for(&self, namespace: Option<Atom>) -> Option<&dyn ExtensionHandler> {
        namespace
            .and_then(|ns| self.handlers.get(&ns))
            .or(self.fallback.as_ref())
            .map(|handler| handler.as_ref())
    }

    pub(crate) fn dispatch_element(
        &self,
        constructs: &Constructs<'_>,
        cursor: &mut XmlCursor<'_>,
        target: &mut dyn Extensible,
    ) -> Result<Disposition, Fault> {
        let namespace = cursor.name()?.namespace_atom();
        match self.handler_for(namespace) {
            Some(handler) => handler.on_element(constructs, cursor, target),
            None => Ok(Disposition::Declined),
        }
    }

    pub(crate) fn dispatch_attribute(
        &self,
        cursor: &XmlCursor<'_>,
        attribute: &Attribute,
        target: &mut dyn Extensible,
    ) -> Result<Disposition, Fault> {
        match self.handler_for(attribute.name.namespace_atom()) {
            Some(handler) => handler.on_attribute(cursor, attribute, target),
            None => Ok(Disposition::Declined),
        }
    }
}

impl std::fmt::Debug for ExtensionRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut namespaces: Vec<&str> = self.handlers.values().map(|h| h.namespace()).collect();
        namespaces.sort_unstable();
        f.debug_struct("ExtensionRegistry")
            .field("namespaces", &namespaces)
            .field("fallback", &self.fallback.is_some())
            .finish()
    }
}
