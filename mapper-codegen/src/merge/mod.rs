//! Merge regenerated artifacts into files that already exist
//!
//! Both merges keep hand-written content and replace only what the
//! generator owns. A merge that cannot be done safely fails, and the caller
//! leaves the old file alone.

mod java;
mod xml;

pub use java::merge_java;
pub use xml::merge_xml;

use crate::codegen::{ArtifactBody, GeneratedArtifact};
use crate::error::Result;

/// Merge `artifact` into `existing`, dispatching on the artifact body
pub fn merge(existing: &str, artifact: &GeneratedArtifact, file: &str) -> Result<String> {
    match &artifact.body {
        ArtifactBody::Java(unit) => merge_java(existing, unit, file),
        ArtifactBody::Xml(document) => merge_xml(existing, document, file),
    }
}
