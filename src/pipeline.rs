use std::fmt;

use crate::cache::{store, CacheBackend};
use crate::config::PipelineConfig;
use crate::entrez::RecordSource;
use crate::error::{PipelineError, StageError};
use crate::fetch::fetch;
use crate::record::{IdentifierList, Record};
use crate::render::{render, Report};
use crate::resolve::resolve;

/// The states of a pipeline run. A run only ever moves forward through
/// `Resolving -> Fetching -> Caching -> Rendering -> Done`, or into `Failed`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Stage {
    Pending,
    Resolving,
    Fetching,
    Caching,
    Rendering,
    Done,
    Failed,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Stage::Pending => "pending",
            Stage::Resolving => "resolving identifiers",
            Stage::Fetching => "fetching records",
            Stage::Caching => "caching records",
            Stage::Rendering => "rendering the report",
            Stage::Done => "done",
            Stage::Failed => "failed",
        })
    }
}

/// Drives one resolve, fetch, cache and render run.
pub struct Pipeline<S, C> {
    config: PipelineConfig,
    source: S,
    cache: C,
    stage: Stage,
}

impl<S: RecordSource, C: CacheBackend> Pipeline<S, C> {
    pub fn new(config: PipelineConfig, source: S, cache: C) -> Self {
        Pipeline {
            config,
            source,
            cache,
            stage: Stage::Pending,
        }
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    fn enter(&mut self, next: Stage) {
        debug_assert!(
            matches!(
                (self.stage, next),
                (Stage::Pending, Stage::Resolving)
                    | (Stage::Resolving, Stage::Fetching)
                    | (Stage::Fetching, Stage::Caching)
                    | (Stage::Caching, Stage::Rendering)
                    | (Stage::Rendering, Stage::Done)
            ),
            "invalid transition {:?} -> {:?}",
            self.stage,
            next
        );
        info!("Stage: {next}");
        self.stage = next;
    }

    /// Moves to `Failed`. The returned error carries the stage the failure happened in.
    fn fail(&mut self, source: impl Into<StageError>) -> PipelineError {
        let stage = self.stage;
        self.stage = Stage::Failed;
        PipelineError {
            stage,
            source: source.into(),
        }
    }

    /// Runs the resolve, fetch and cache stages and returns the records that were cached,
    /// leaving the pipeline in `Caching`.
    ///
    /// This is the fetch-only entry point. A pipeline is started once, through either `acquire`
    /// or `run`: any later call to either returns `StageError::AlreadyRan`. Render what was
    /// cached with `render::render`.
    pub fn acquire(&mut self) -> Result<Vec<Record>, PipelineError> {
        if self.stage != Stage::Pending {
            return Err(PipelineError {
                stage: self.stage,
                source: StageError::AlreadyRan,
            });
        }

        self.enter(Stage::Resolving);
        let ids = resolve(&self.source, &self.config.query).map_err(|e| self.fail(e))?;

        self.enter(Stage::Fetching);
        let records = fetch(&self.source, &ids, &self.config.fetch).map_err(|e| self.fail(e))?;

        self.enter(Stage::Caching);
        store(&mut self.cache, &records).map_err(|e| self.fail(e))?;

        Ok(records)
    }

    /// Runs every stage on a fresh pipeline and, when an output path is configured, writes the
    /// report there.
    ///
    /// The report covers the fetched records in fetch order, read back from the cache. On
    /// failure no report file is written, though records cached before the failure remain.
    pub fn run(&mut self) -> Result<Report, PipelineError> {
        let records = self.acquire()?;
        let ids: IdentifierList = records.into_iter().map(|r| r.id).collect();

        self.enter(Stage::Rendering);
        let report = render(&mut self.cache, &ids).map_err(|e| self.fail(e))?;
        if let Some(output) = &self.config.output {
            report.write_to(output).map_err(|e| self.fail(e))?;
        }

        self.enter(Stage::Done);
        Ok(report)
    }
}
