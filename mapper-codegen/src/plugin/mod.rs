//! Plugin chain wrapped around every generated artifact
//!
//! Every artifact a generator produces is offered to the registered plugins
//! in order. A plugin may mutate the artifact in place and approve it, or veto
//! it. The first veto discards the artifact and ends the chain for that event;
//! later plugins never see it. Other artifacts are unaffected.

mod builtin;

pub use builtin::*;

use tracing::debug;

use crate::dom::{CompilationUnit, Field, Method, XmlDocument, XmlElement};
use crate::model::{ColumnModel, FragmentId, TableModel};

/// Outcome of one plugin hook
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// Approve unchanged
    Keep,
    /// Approve after mutating the artifact
    Changed,
    /// Discard the artifact
    Veto,
}

/// Which record class a model event belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelKind {
    Record,
    QueryCondition,
}

/// An artifact offered to the chain, borrowed mutably
#[derive(Debug)]
pub enum ArtifactEvent<'a> {
    ModelField {
        kind: ModelKind,
        field: &'a mut Field,
        /// `None` for fields with no backing column, such as paging fields
        column: Option<&'a ColumnModel>,
    },
    ModelGetter {
        kind: ModelKind,
        method: &'a mut Method,
        column: Option<&'a ColumnModel>,
    },
    ModelSetter {
        kind: ModelKind,
        method: &'a mut Method,
        column: Option<&'a ColumnModel>,
    },
    ModelClass {
        kind: ModelKind,
        unit: &'a mut CompilationUnit,
    },
    ClientMethod {
        statement: FragmentId,
        method: &'a mut Method,
    },
    ClientInterface {
        unit: &'a mut CompilationUnit,
    },
    SqlMapElement {
        fragment: FragmentId,
        element: &'a mut XmlElement,
    },
    SqlMapDocument {
        document: &'a mut XmlDocument,
    },
}

impl ArtifactEvent<'_> {
    /// Short label for logging
    pub fn label(&self) -> String {
        match self {
            ArtifactEvent::ModelField { field, .. } => format!("field {}", field.name),
            ArtifactEvent::ModelGetter { method, .. } | ArtifactEvent::ModelSetter { method, .. } => {
                format!("method {}", method.name)
            }
            ArtifactEvent::ModelClass { unit, .. } | ArtifactEvent::ClientInterface { unit } => {
                format!("type {}", unit.ty.short_name())
            }
            ArtifactEvent::ClientMethod { method, .. } => format!("mapper method {}", method.name),
            ArtifactEvent::SqlMapElement { fragment, .. } => {
                format!("fragment {}", fragment.as_str())
            }
            ArtifactEvent::SqlMapDocument { document } => {
                format!("document {}", document.root.name)
            }
        }
    }
}

/// Extension point invoked for every artifact event
pub trait ArtifactPlugin {
    fn name(&self) -> &str {
        "anonymous"
    }

    fn on_artifact(&self, event: &mut ArtifactEvent<'_>, table: &TableModel) -> Verdict;
}

impl<F> ArtifactPlugin for F
where
    F: Fn(&mut ArtifactEvent<'_>, &TableModel) -> Verdict,
{
    fn on_artifact(&self, event: &mut ArtifactEvent<'_>, table: &TableModel) -> Verdict {
        self(event, table)
    }
}

/// Ordered list of plugins; lives for one run
#[derive(Default)]
pub struct PluginChain {
    plugins: Vec<Box<dyn ArtifactPlugin>>,
}

impl PluginChain {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, plugin: Box<dyn ArtifactPlugin>) {
        self.plugins.push(plugin);
    }

    pub fn len(&self) -> usize {
        self.plugins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.plugins.is_empty()
    }

    /// Run the chain; `false` means the artifact was vetoed
    pub fn approve(&self, mut event: ArtifactEvent<'_>, table: &TableModel) -> bool {
        for plugin in &self.plugins {
            if plugin.on_artifact(&mut event, table) == Verdict::Veto {
                debug!(
                    "Plugin {} vetoed {} of table {}",
                    plugin.name(),
                    event.label(),
                    table.table()
                );
                return false;
            }
        }
        true
    }
}

impl std::fmt::Debug for PluginChain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list()
            .entries(self.plugins.iter().map(|p| p.name()))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::JavaType;
    use crate::model::test_support::orders_table;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn recording(
        log: Rc<RefCell<Vec<&'static str>>>,
        name: &'static str,
        verdict: Verdict,
    ) -> Box<dyn ArtifactPlugin> {
        Box::new(move |_: &mut ArtifactEvent<'_>, _: &TableModel| {
            log.borrow_mut().push(name);
            verdict
        })
    }

    #[test]
    fn test_all_approve() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut chain = PluginChain::new();
        chain.push(recording(log.clone(), "a", Verdict::Keep));
        chain.push(recording(log.clone(), "b", Verdict::Keep));

        let table = orders_table();
        let mut field = Field::new("id", JavaType::new("java.lang.Long"));
        let approved = chain.approve(
            ArtifactEvent::ModelField {
                kind: ModelKind::Record,
                field: &mut field,
                column: table.columns().first(),
            },
            &table,
        );
        assert!(approved);
        assert_eq!(*log.borrow(), vec!["a", "b"]);
    }

    #[test]
    fn test_veto_stops_chain() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut chain = PluginChain::new();
        chain.push(recording(log.clone(), "a", Verdict::Keep));
        chain.push(recording(log.clone(), "veto", Verdict::Veto));
        chain.push(recording(log.clone(), "never", Verdict::Keep));

        let table = orders_table();
        let mut field = Field::new("id", JavaType::new("java.lang.Long"));
        let approved = chain.approve(
            ArtifactEvent::ModelField {
                kind: ModelKind::Record,
                field: &mut field,
                column: table.columns().first(),
            },
            &table,
        );
        assert!(!approved);
        assert_eq!(*log.borrow(), vec!["a", "veto"]);
    }

    #[test]
    fn test_later_plugins_see_mutation() {
        let mut chain = PluginChain::new();
        chain.push(Box::new(|event: &mut ArtifactEvent<'_>, _: &TableModel| {
            if let ArtifactEvent::ModelField { field, .. } = event {
                field.name = "renamed".into();
                return Verdict::Changed;
            }
            Verdict::Keep
        }));
        chain.push(Box::new(|event: &mut ArtifactEvent<'_>, _: &TableModel| match event {
            ArtifactEvent::ModelField { field, .. } if field.name == "renamed" => Verdict::Keep,
            _ => Verdict::Veto,
        }));

        let table = orders_table();
        let mut field = Field::new("id", JavaType::new("java.lang.Long"));
        assert!(chain.approve(
            ArtifactEvent::ModelField {
                kind: ModelKind::Record,
                field: &mut field,
                column: table.columns().first(),
            },
            &table,
        ));
        assert_eq!(field.name, "renamed");
    }
}
