//! File-driven business glossary source.

use confres::{LoadOptions, load_config_file};
use serde::Serialize;

use crate::{
    ctx::IngestContext,
    error::{IngestError, Result},
    glossary::{
        config::{BusinessGlossaryConfig, BusinessGlossarySourceConfig},
        flatten::{FlattenOptions, flatten},
    },
    model::WorkUnit,
};

/// Counters collected while a source runs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SourceReport {
    pub workunits_produced: usize,
    pub workunit_ids: Vec<String>,
    pub warnings: Vec<String>,
    pub failures: Vec<String>,
}

impl SourceReport {
    pub fn report_workunit(&mut self, unit: &WorkUnit) {
        self.workunits_produced += 1;
        self.workunit_ids.push(unit.id.clone());
    }

    pub fn report_warning(&mut self, warning: impl Into<String>) {
        self.warnings.push(warning.into());
    }

    pub fn report_failure(&mut self, failure: impl Into<String>) {
        self.failures.push(failure.into());
    }
}

/// Loads a glossary file and turns it into work units.
#[derive(Debug, Clone)]
pub struct BusinessGlossarySource {
    config: BusinessGlossarySourceConfig,
    load_options: LoadOptions,
    report: SourceReport,
}

/// Loads, resolves and validates the glossary at `file`.
pub fn load_glossary_config(file: &str, options: &LoadOptions) -> Result<BusinessGlossaryConfig> {
    let value = load_config_file(file, options)?;
    info!("Loaded business glossary from {file}");
    BusinessGlossaryConfig::from_value(value)
}

impl BusinessGlossarySource {
    pub fn new(config: BusinessGlossarySourceConfig) -> Self {
        Self {
            config,
            load_options: LoadOptions::default(),
            report: SourceReport::default(),
        }
    }

    /// Builds a source from a raw recipe section.
    pub fn create(value: &serde_json::Value) -> Result<Self> {
        let config = serde_json::from_value(value.clone()).map_err(|source| IngestError::Schema {
            what: "business glossary source",
            source,
        })?;
        Ok(Self::new(config))
    }

    /// Replaces the options used to load the glossary file, builder style.
    pub fn with_load_options(mut self, load_options: LoadOptions) -> Self {
        self.load_options = load_options;
        self
    }

    pub fn config(&self) -> &BusinessGlossarySourceConfig {
        &self.config
    }

    pub fn report(&self) -> &SourceReport {
        &self.report
    }

    /// Loads the glossary and flattens it.
    ///
    /// # Errors
    ///
    /// Any load, validation or domain resolution failure aborts the run
    /// before a single work unit is returned.
    pub fn workunits(&mut self, ctx: &IngestContext) -> Result<Vec<WorkUnit>> {
        let glossary = match load_glossary_config(&self.config.file, &self.load_options) {
            Ok(glossary) => glossary,
            Err(e) => {
                self.report.report_failure(e.to_string());
                return Err(e);
            }
        };

        if glossary.nodes.is_none() && glossary.terms.is_none() {
            warn!("[{}] {} declares no nodes and no terms", ctx.run_id, self.config.file);
            self.report
                .report_warning(format!("{}: empty glossary", self.config.file));
        }

        let options = FlattenOptions {
            enable_auto_id: self.config.enable_auto_id,
        };
        let units = flatten(&glossary, &options, ctx).inspect_err(|e| {
            self.report.report_failure(e.to_string());
        })?;

        for unit in &units {
            self.report.report_workunit(unit);
        }
        info!(
            "[{}] Produced {} glossary work units from {}",
            ctx.run_id,
            units.len(),
            self.config.file
        );
        Ok(units)
    }
}
