use super::{Disposition, ExtensionHandler};
use crate::error::Fault;
use crate::model::{ExtensionElement, Extensible};
use crate::parser::Constructs;
use crate::xml::{Attribute, XmlCursor};

/// A foreign element kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawElement {
    pub namespace: String,
    pub local_name: String,
    pub attributes: Vec<RawAttribute>,
    /// Markup between the start and end tags, as it appeared in the document.
    pub inner_xml: String,
}

impl ExtensionElement for RawElement {
    fn namespace(&self) -> &str {
        &self.namespace
    }

    fn local_name(&self) -> &str {
        &self.local_name
    }
}

/// A foreign attribute kept verbatim. Unprefixed attributes have no
/// namespace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawAttribute {
    pub namespace: Option<String>,
    pub local_name: String,
    pub value: String,
}

impl RawAttribute {
    fn capture(cursor: &XmlCursor<'_>, attribute: &Attribute) -> Self {
        Self {
            namespace: attribute
                .name
                .namespace_uri(cursor.names())
                .map(str::to_owned),
            local_name: attribute.name.local_name().to_owned(),
            value: attribute.value.clone(),
        }
    }
}

impl ExtensionElement for RawAttribute {
    fn namespace(&self) -> &str {
        self.namespace.as_deref().unwrap_or_default()
    }

    fn local_name(&self) -> &str {
        &self.local_name
    }
}

/// Catch-all handler that records every node nobody else claims.
#[derive(Debug, Default, Clone, Copy)]
pub struct RawCapture;

impl ExtensionHandler for RawCapture {
    fn namespace(&self) -> &str {
        ""
    }

    fn on_element(
        &self,
        _constructs: &Constructs<'_>,
        cursor: &mut XmlCursor<'_>,
        target: &mut dyn Extensible,
    ) -> Result<Disposition, Fault> {
        let attributes = cursor
            .attributes()?
            .iter()
            .map(|attr| RawAttribute::capture(cursor, attr))
            .collect();
        let element = RawElement {
            namespace: cursor.namespace_uri().unwrap_or_default().to_owned(),
            local_name: cursor.local_name().to_owned(),
            attributes,
            inner_xml: cursor.read_inner_xml()?,
        };
        target.extensions_mut().push(element);
        Ok(Disposition::Consumed)
    }

    fn on_attribute(
        &self,
        cursor: &XmlCursor<'_>,
        attribute: &Attribute,
        target: &mut dyn Extensible,
    ) -> Result<Disposition, Fault> {
        target
            .extensions_mut()
            .push(RawAttribute::capture(cursor, attribute));
        Ok(Disposition::Consumed)
    }
}
