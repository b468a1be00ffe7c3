//! Mapper XML generator
//!
//! The document is assembled from one [`FragmentGenerator`] per fragment id.
//! Reusable SQL pieces live in [`fragments`], mapped statements in
//! [`statements`]; statements reference pieces through `<include refid>`.

pub mod fragments;
pub mod statements;

use tracing::debug;

use crate::codegen::{ArtifactGenerator, GeneratedArtifact, GenerationContext};
use crate::dom::{XmlDocument, XmlElement};
use crate::model::{FragmentId, TableModel};
use crate::plugin::ArtifactEvent;

pub const MAPPER_PUBLIC_ID: &str = "-//mybatis.org//DTD Mapper 3.0//EN";
pub const MAPPER_SYSTEM_ID: &str = "http://mybatis.org/dtd/mybatis-3-mapper.dtd";

/// Builds the element for one fragment id, or nothing when the table rules exclude it
pub trait FragmentGenerator {
    fn id(&self) -> FragmentId;

    fn build(&self, table: &TableModel) -> Option<XmlElement>;
}

/// A fragment generator backed by a plain function
#[derive(Clone, Copy)]
pub struct FnFragment {
    id: FragmentId,
    build: fn(&TableModel) -> Option<XmlElement>,
}

impl FnFragment {
    pub const fn new(id: FragmentId, build: fn(&TableModel) -> Option<XmlElement>) -> Self {
        Self { id, build }
    }
}

impl FragmentGenerator for FnFragment {
    fn id(&self) -> FragmentId {
        self.id
    }

    fn build(&self, table: &TableModel) -> Option<XmlElement> {
        (self.build)(table)
    }
}

/// The standard generator for a fragment id
pub fn standard_fragment(id: FragmentId) -> FnFragment {
    let build: fn(&TableModel) -> Option<XmlElement> = match id {
        FragmentId::ResultMap => fragments::result_map,
        FragmentId::BaseColumn => fragments::base_column,
        FragmentId::Qc => fragments::query_condition,
        FragmentId::Set => fragments::set,
        FragmentId::BatchSet => fragments::batch_set,
        FragmentId::BatchSetValue => fragments::batch_set_value,
        FragmentId::TableName => fragments::table_name,
        FragmentId::PageLimit => fragments::page_limit,
        FragmentId::List => statements::list,
        FragmentId::GetByQc => statements::get_by_qc,
        FragmentId::Count => statements::count,
        FragmentId::Insert => statements::insert,
        FragmentId::BatchInsert => statements::batch_insert,
        FragmentId::Update => statements::update,
        FragmentId::BatchUpdate => statements::batch_update,
    };
    FnFragment::new(id, build)
}

/// Composes fragment generators into one `<mapper>` document per table
pub struct SqlMapGenerator {
    fragments: Vec<Box<dyn FragmentGenerator>>,
}

impl Default for SqlMapGenerator {
    fn default() -> Self {
        Self {
            fragments: FragmentId::ALL
                .iter()
                .map(|id| Box::new(standard_fragment(*id)) as Box<dyn FragmentGenerator>)
                .collect(),
        }
    }
}

impl SqlMapGenerator {
    /// Replace the generator for one fragment id, keeping document order
    pub fn with_fragment(mut self, fragment: Box<dyn FragmentGenerator>) -> Self {
        match self.fragments.iter().position(|f| f.id() == fragment.id()) {
            Some(index) => self.fragments[index] = fragment,
            None => self.fragments.push(fragment),
        }
        self
    }

    fn warn_skipped(table: &TableModel, ctx: &mut GenerationContext<'_>) {
        let spec = table.spec();
        let rules = table.rules();
        if (spec.enable_update && !rules.update) || (spec.enable_batch_update && !rules.batch_update) {
            ctx.run.warn(format!(
                "Table {} has no primary key; update statements are not generated",
                table.table()
            ));
        }
    }
}

impl ArtifactGenerator for SqlMapGenerator {
    fn name(&self) -> &'static str {
        "sqlmap"
    }

    fn generate(&self, table: &TableModel, ctx: &mut GenerationContext<'_>) -> Vec<GeneratedArtifact> {
        Self::warn_skipped(table, ctx);

        let names = table.names();
        let mut root = XmlElement::new("mapper").attr("namespace", names.namespace.as_str());
        for generator in &self.fragments {
            let fragment = generator.id();
            let Some(mut element) = generator.build(table) else {
                continue;
            };
            let approved = ctx.approve(
                ArtifactEvent::SqlMapElement {
                    fragment,
                    element: &mut element,
                },
                table,
            );
            if approved {
                root.push(element);
            } else {
                debug!("Fragment {} of {} vetoed", fragment.as_str(), table.table());
            }
        }

        let mut document = XmlDocument::new(root);
        document.public_id = Some(MAPPER_PUBLIC_ID.to_string());
        document.system_id = Some(MAPPER_SYSTEM_ID.to_string());

        if !ctx.approve(
            ArtifactEvent::SqlMapDocument {
                document: &mut document,
            },
            table,
        ) {
            return Vec::new();
        }
        vec![GeneratedArtifact::xml(
            &ctx.config.sqlmap_target_project,
            &ctx.config.sqlmap_package,
            &names.sqlmap_file,
            document,
        )]
    }
}
