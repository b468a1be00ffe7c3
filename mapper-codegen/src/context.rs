//! Run-scoped state
//!
//! A [`RunContext`] is built fresh for every generation run and dropped when
//! the run ends, so caches and warnings never leak from one run into the next.

use std::collections::{BTreeSet, HashMap};

use tracing::warn;

use crate::config::RootClass;

/// Progress notifications and cooperative cancellation
pub trait ProgressCallback {
    fn introspection_started(&mut self, _tables: usize) {}

    fn generation_started(&mut self, _tables: usize) {}

    fn save_started(&mut self, _files: usize) {}

    fn start_task(&mut self, _name: &str) {}

    fn done(&mut self) {}

    /// Polled between tables and between files; `true` stops the run
    fn check_cancel(&mut self) -> bool {
        false
    }
}

/// Callback that reports nothing and never cancels
#[derive(Debug, Default)]
pub struct NullProgress;

impl ProgressCallback for NullProgress {}

/// Mutable state shared by every phase of one run
pub struct RunContext {
    warnings: Vec<String>,
    root_class_properties: HashMap<String, BTreeSet<String>>,
    progress: Box<dyn ProgressCallback>,
}

impl RunContext {
    pub fn new(progress: Box<dyn ProgressCallback>) -> Self {
        Self {
            warnings: Vec::new(),
            root_class_properties: HashMap::new(),
            progress,
        }
    }

    /// Record a non-fatal problem
    pub fn warn(&mut self, message: impl Into<String>) {
        let message = message.into();
        warn!("{}", message);
        self.warnings.push(message);
    }

    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }

    pub fn into_warnings(self) -> Vec<String> {
        self.warnings
    }

    pub fn progress(&mut self) -> &mut dyn ProgressCallback {
        self.progress.as_mut()
    }

    pub fn is_cancelled(&mut self) -> bool {
        self.progress.check_cancel()
    }

    /// Properties the root class declares, computed once per class per run
    pub fn root_class_properties(&mut self, root: &RootClass) -> &BTreeSet<String> {
        self.root_class_properties
            .entry(root.type_name.clone())
            .or_insert_with(|| {
                root.properties
                    .iter()
                    .map(|p| p.trim().to_string())
                    .filter(|p| !p.is_empty())
                    .collect()
            })
    }
}

impl Default for RunContext {
    fn default() -> Self {
        Self::new(Box::new(NullProgress))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct CancelAfter(usize);

    impl ProgressCallback for CancelAfter {
        fn check_cancel(&mut self) -> bool {
            if self.0 == 0 {
                return true;
            }
            self.0 -= 1;
            false
        }
    }

    #[test]
    fn test_warnings_collected() {
        let mut ctx = RunContext::default();
        ctx.warn("first");
        ctx.warn(String::from("second"));
        assert_eq!(ctx.warnings(), ["first", "second"]);
    }

    #[test]
    fn test_fresh_context_has_no_state() {
        let mut ctx = RunContext::default();
        ctx.warn("stale");
        let ctx = RunContext::default();
        assert!(ctx.warnings().is_empty());
    }

    #[test]
    fn test_root_class_properties_cached() {
        let mut ctx = RunContext::default();
        let root = RootClass {
            type_name: "com.example.BaseDO".into(),
            properties: vec!["id".into(), " gmtCreate ".into(), "".into()],
        };
        let props = ctx.root_class_properties(&root).clone();
        assert_eq!(props.len(), 2);
        assert!(props.contains("gmtCreate"));
    }

    #[test]
    fn test_cancellation() {
        let mut ctx = RunContext::new(Box::new(CancelAfter(1)));
        assert!(!ctx.is_cancelled());
        assert!(ctx.is_cancelled());
    }
}
