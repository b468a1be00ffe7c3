//! Artifact trees: Java compilation units and XML documents
//!
//! Both trees are plain values with no reference back to the table model.
//! Generators build them, plugins mutate them, and each renders itself.

pub mod java;
pub mod xml;

pub use java::{CompilationUnit, Field, JavaType, Method, Parameter, TypeKind, Visibility};
pub use xml::{XmlDocument, XmlElement, XmlNode};
