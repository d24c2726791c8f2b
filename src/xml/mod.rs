//! Token source adapter: a namespace-aware pull cursor and the name table
//! that turns element names into cheap-to-compare atoms.
mod cursor;
mod names;

pub use cursor::{Attribute, Element, XmlCursor};
pub use names::{atoms, Atom, Name, NameTable, NsRef, Term};
