use crate::session::{ProbeReport, RunOutcome, RunReport};
use gradinsight_protocol::AnalyticsKind;
use gradinsight_selection::{DisplayMode, SelectionState};
use gradinsight_shaper::{ChartBackend, ChartConfig, ChartHost};
use serde::Serialize;
use serde_json::Value;

/// Chart backend that keeps the live chart as JSON for printing.
#[derive(Debug, Default)]
pub struct JsonBackend {
    next: usize,
    current: Option<(usize, Value)>,
}

impl JsonBackend {
    pub fn current(&self) -> Option<&Value> {
        self.current.as_ref().map(|(_, value)| value)
    }
}

impl ChartBackend for JsonBackend {
    type Handle = usize;

    fn create(&mut self, config: &ChartConfig) -> usize {
        self.next += 1;
        match serde_json::to_value(config) {
            Ok(value) => self.current = Some((self.next, value)),
            Err(err) => log::error!("Failed to serialize chart config: {err}"),
        }
        self.next
    }

    fn destroy(&mut self, handle: usize) {
        if self.current.as_ref().is_some_and(|(id, _)| *id == handle) {
            self.current = None;
        }
    }
}

#[derive(Debug, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ReportStatus {
    Ok,
    Notice,
    Error,
}

/// The JSON document printed on stdout for every subcommand.
#[derive(Debug, Serialize, Clone)]
pub struct Report {
    pub status: ReportStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<AnalyticsKind>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mode: Option<DisplayMode>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chart: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub selection: Option<SelectionState>,
    #[serde(skip_serializing_if = "Value::is_null")]
    pub data: Value,
}

impl Report {
    fn new(status: ReportStatus) -> Self {
        Self {
            status,
            kind: None,
            message: None,
            mode: None,
            chart: None,
            selection: None,
            data: Value::Null,
        }
    }

    pub fn ok() -> Self {
        Self::new(ReportStatus::Ok)
    }

    pub fn notice(message: impl Into<String>) -> Self {
        Self::new(ReportStatus::Notice).with_message(message)
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::new(ReportStatus::Error).with_message(message)
    }

    pub fn with_kind(mut self, kind: AnalyticsKind) -> Self {
        self.kind = Some(kind);
        self
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn with_selection(mut self, selection: &SelectionState) -> Self {
        self.selection = Some(selection.clone());
        self
    }

    pub fn with_data(mut self, data: Value) -> Self {
        self.data = data;
        self
    }

    pub fn is_error(&self) -> bool {
        matches!(self.status, ReportStatus::Error)
    }

    /// Draw `report` on `host` and describe the result.
    ///
    /// A failed run tears down whatever chart was live.
    pub fn from_run(
        kind: AnalyticsKind,
        report: RunReport,
        host: &mut ChartHost<JsonBackend>,
    ) -> Self {
        match report {
            RunReport::Notice(message) => Self::notice(message).with_kind(kind),
            RunReport::Stale => {
                Self::notice("Selection changed before the response arrived.").with_kind(kind)
            }
            RunReport::Outcome(RunOutcome::Failed { message }) => {
                host.teardown();
                Self::error(message).with_kind(kind)
            }
            RunReport::Outcome(RunOutcome::Rendered { chart, mode, note }) => {
                host.render(chart.as_ref());
                let mut out = Self::ok().with_kind(kind);
                out.message = note;
                out.mode = mode;
                out.chart = host.backend().current().cloned();
                out
            }
        }
    }

    pub fn from_probe(report: ProbeReport) -> Self {
        let kind = AnalyticsKind::SalaryDispersion;
        let (status, available) = match report {
            ProbeReport::Notice(message) => return Self::notice(message).with_kind(kind),
            ProbeReport::Stale => {
                return Self::notice("Selection changed during the check.").with_kind(kind)
            }
            ProbeReport::Available => (ReportStatus::Ok, true),
            ProbeReport::NoData => (ReportStatus::Notice, false),
        };
        let mut out = Self::new(status)
            .with_kind(kind)
            .with_data(serde_json::json!({ "available": available }));
        if !available {
            out.message = Some(crate::session::NO_DISPERSION_DATA.to_string());
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gradinsight_shaper::{AxisOptions, ChartKind};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn config() -> ChartConfig {
        ChartConfig {
            kind: ChartKind::Bar,
            labels: Vec::new(),
            datasets: Vec::new(),
            y_axis: AxisOptions {
                begin_at_zero: true,
                max: None,
                title: None,
            },
        }
    }

    #[test]
    fn failed_run_tears_down_previous_chart() {
        let mut host = ChartHost::new(JsonBackend::default());
        let rendered = Report::from_run(
            AnalyticsKind::SalaryDispersion,
            RunReport::Outcome(RunOutcome::Rendered {
                chart: Some(config()),
                mode: None,
                note: None,
            }),
            &mut host,
        );
        assert_eq!(rendered.status, ReportStatus::Ok);
        assert_eq!(rendered.chart.as_ref().map(|c| &c["kind"]), Some(&json!("bar")));

        let failed = Report::from_run(
            AnalyticsKind::SalaryDispersion,
            RunReport::Outcome(RunOutcome::Failed {
                message: "boom".into(),
            }),
            &mut host,
        );
        assert!(failed.is_error());
        assert!(!host.is_live());
        assert!(host.backend().current().is_none());
    }

    #[test]
    fn notice_serializes_without_empty_fields() {
        let report = Report::notice("Pick a course").with_kind(AnalyticsKind::Employment);
        assert_eq!(
            serde_json::to_value(&report).unwrap(),
            json!({"status": "notice", "kind": "employment", "message": "Pick a course"})
        );
    }

    #[test]
    fn probe_without_data_is_a_notice() {
        let report = Report::from_probe(ProbeReport::NoData);
        assert_eq!(report.status, ReportStatus::Notice);
        assert_eq!(report.data, json!({"available": false}));
    }
}
