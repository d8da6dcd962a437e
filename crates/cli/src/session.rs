//! Session controller: owns the selection machine and the latest result per
//! analytics kind.
//!
//! A run is split into [`Session::prepare`] and [`Session::accept`]. Between
//! the two the request is in flight; any transition that touches the kind, or
//! a newer run of the same kind, makes the ticket stale and the late reply is
//! dropped.

use crate::client::{AnalyticsReply, AnalyticsService, ClientError};
use gradinsight_catalog::CatalogIndex;
use gradinsight_protocol::{AnalyticsKind, DispersionData, YearsRange};
use gradinsight_selection::{
    AnalyticsRequest, DisplayMode, QueryBuilder, QueryPlan, SelectionMachine, Thresholds, Ticket,
};
use gradinsight_shaper::{
    dispersion_chart, employment_chart, salary_chart, shape_dispersion, shape_employment,
    shape_salary, ChartConfig, ShapingOptions,
};
use std::sync::Arc;

pub const NO_DISPERSION_DATA: &str = "No salary data for this selection.";

/// A request that has been stamped and may be sent.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingRun {
    pub ticket: Ticket,
    pub request: AnalyticsRequest,
    pub note: Option<String>,
    /// Display mode the employment chart will use; `None` for other kinds.
    pub mode: Option<DisplayMode>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Prepared {
    Pending(PendingRun),
    /// Validation or constraint message; nothing is sent.
    Notice(String),
}

#[derive(Debug, Clone, PartialEq)]
pub enum RunOutcome {
    Rendered {
        chart: Option<ChartConfig>,
        mode: Option<DisplayMode>,
        note: Option<String>,
    },
    Failed {
        message: String,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub enum Acceptance {
    Applied(RunOutcome),
    Stale,
}

#[derive(Debug, Clone, PartialEq)]
pub enum RunReport {
    Notice(String),
    Outcome(RunOutcome),
    Stale,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeReport {
    Notice(String),
    Available,
    NoData,
    Stale,
}

#[derive(Debug, Clone)]
struct StoredResult {
    ticket: Ticket,
    outcome: RunOutcome,
}

pub struct Session {
    machine: SelectionMachine,
    options: ShapingOptions,
    results: [Option<StoredResult>; 3],
}

impl Session {
    /// Fetch the catalog and year range concurrently and start with an empty selection.
    pub async fn load(
        service: &dyn AnalyticsService,
        thresholds: Thresholds,
        options: ShapingOptions,
    ) -> Result<Self, ClientError> {
        let (rows, range) = tokio::try_join!(service.metadata_full(), service.metadata_years())?;
        let catalog = CatalogIndex::build(&rows);
        if catalog.is_empty() {
            log::warn!("Analytics service returned an empty catalog");
        }
        log::info!(
            "Loaded catalog: {} universities, years {}-{}",
            catalog.university_count(),
            range.min(),
            range.max()
        );
        Ok(Self::from_parts(catalog, range, thresholds, options))
    }

    pub fn from_parts(
        catalog: CatalogIndex,
        range: YearsRange,
        thresholds: Thresholds,
        options: ShapingOptions,
    ) -> Self {
        Self {
            machine: SelectionMachine::new(Arc::new(catalog), range, thresholds),
            options,
            results: [None, None, None],
        }
    }

    pub fn machine(&self) -> &SelectionMachine {
        &self.machine
    }

    /// Apply one or more transitions, then drop results they invalidated.
    pub fn apply<T>(&mut self, transition: impl FnOnce(&mut SelectionMachine) -> T) -> T {
        let output = transition(&mut self.machine);
        for slot in &mut self.results {
            if slot
                .as_ref()
                .is_some_and(|stored| !self.machine.is_current(&stored.ticket))
            {
                *slot = None;
            }
        }
        output
    }

    /// Latest outcome for `kind`, if no transition has invalidated it since.
    pub fn result(&self, kind: AnalyticsKind) -> Option<&RunOutcome> {
        self.results[kind.index()]
            .as_ref()
            .filter(|stored| self.machine.is_current(&stored.ticket))
            .map(|stored| &stored.outcome)
    }

    pub fn prepare(&mut self, kind: AnalyticsKind) -> Prepared {
        let (request, note) = match self.plan(kind) {
            Ok(ready) => ready,
            Err(notice) => return Prepared::Notice(notice),
        };
        let mode = (kind == AnalyticsKind::Employment).then(|| self.machine.display_mode());
        let ticket = self.machine.issue_ticket(kind);
        log::debug!("Issued {kind} request, generation {}", ticket.generation);
        Prepared::Pending(PendingRun {
            ticket,
            request,
            note,
            mode,
        })
    }

    /// Record the reply to `run`, unless the selection moved on while it was in flight.
    pub fn accept(
        &mut self,
        run: &PendingRun,
        reply: Result<AnalyticsReply, ClientError>,
    ) -> Acceptance {
        if !self.machine.is_current(&run.ticket) {
            log::warn!(
                "Discarding stale {} response (generation {}, current {})",
                run.ticket.kind,
                run.ticket.generation,
                self.machine.generation(run.ticket.kind)
            );
            return Acceptance::Stale;
        }

        let outcome = match reply {
            Ok(reply) => self.shape(run, reply),
            Err(err) => {
                log::warn!("{} request failed: {err}", run.ticket.kind);
                RunOutcome::Failed {
                    message: err.to_string(),
                }
            }
        };
        self.results[run.ticket.kind.index()] = Some(StoredResult {
            ticket: run.ticket,
            outcome: outcome.clone(),
        });
        Acceptance::Applied(outcome)
    }

    pub async fn run(&mut self, service: &dyn AnalyticsService, kind: AnalyticsKind) -> RunReport {
        let run = match self.prepare(kind) {
            Prepared::Pending(run) => run,
            Prepared::Notice(message) => return RunReport::Notice(message),
        };
        log::info!("Running {kind} analysis");
        let reply = service.execute(&run.request).await;
        match self.accept(&run, reply) {
            Acceptance::Applied(outcome) => RunReport::Outcome(outcome),
            Acceptance::Stale => RunReport::Stale,
        }
    }

    /// Local constraint check for the dispersion view, stamped with the current generation.
    ///
    /// Unlike [`Session::prepare`] this does not supersede an outstanding run.
    pub fn prepare_probe(&self) -> Prepared {
        let kind = AnalyticsKind::SalaryDispersion;
        match self.plan(kind) {
            Ok((request, note)) => Prepared::Pending(PendingRun {
                ticket: self.machine.snapshot(kind),
                request,
                note,
                mode: None,
            }),
            Err(notice) => Prepared::Notice(notice),
        }
    }

    pub fn accept_probe(&self, run: &PendingRun, reply: &DispersionData) -> ProbeReport {
        if !self.machine.is_current(&run.ticket) {
            log::warn!("Discarding stale dispersion probe");
            ProbeReport::Stale
        } else if reply.series.is_empty() {
            ProbeReport::NoData
        } else {
            ProbeReport::Available
        }
    }

    pub async fn probe_dispersion(
        &self,
        service: &dyn AnalyticsService,
    ) -> Result<ProbeReport, ClientError> {
        let run = match self.prepare_probe() {
            Prepared::Pending(run) => run,
            Prepared::Notice(message) => return Ok(ProbeReport::Notice(message)),
        };
        let AnalyticsRequest::SalaryDispersion(request) = &run.request else {
            return Ok(ProbeReport::NoData);
        };
        let reply = service.salary_dispersion(request).await?;
        Ok(self.accept_probe(&run, &reply))
    }

    fn plan(&self, kind: AnalyticsKind) -> Result<(AnalyticsRequest, Option<String>), String> {
        let builder = QueryBuilder::new(self.machine.thresholds());
        match builder.build(self.machine.state(), kind) {
            Ok(QueryPlan::Ready { request, note }) => Ok((request, note)),
            Ok(QueryPlan::Blocked(notice)) => Err(notice.message),
            Err(err) => Err(err.to_string()),
        }
    }

    fn shape(&self, run: &PendingRun, reply: AnalyticsReply) -> RunOutcome {
        let note = run.note.clone();
        match reply {
            AnalyticsReply::Employment(data) => {
                let mode = run.mode.unwrap_or_else(|| self.machine.display_mode());
                let shaped = shape_employment(&data.series, mode, &self.options);
                RunOutcome::Rendered {
                    chart: employment_chart(&shaped),
                    mode: Some(mode),
                    note,
                }
            }
            AnalyticsReply::SalaryComparison(data) => RunOutcome::Rendered {
                chart: salary_chart(&shape_salary(&data)),
                mode: None,
                note,
            },
            AnalyticsReply::SalaryDispersion(data) => {
                let chart = dispersion_chart(&shape_dispersion(&data, self.options.label_wrap));
                let note = if chart.is_none() {
                    Some(NO_DISPERSION_DATA.to_string())
                } else {
                    note
                };
                RunOutcome::Rendered {
                    chart,
                    mode: None,
                    note,
                }
            }
        }
    }
}
