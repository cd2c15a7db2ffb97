use tracing::{info, warn};

use crate::config::BillingTarget;
use crate::error::ReportError;
use crate::gate;
use crate::period::Period;
use crate::report::Report;
use crate::reports::{ReportContext, ReportKind};
use crate::storage::DestinationStore;
use crate::types::TableId;

/// What happened to one report during a run.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// Rows appended to the destination table.
    Stored { rows: usize },
    /// Generated but not written (preview).
    Previewed(Report),
    /// The table already holds this period's rows.
    Skipped,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReportOutcome {
    pub kind: ReportKind,
    pub table: TableId,
    pub outcome: Outcome,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Commit,
    Preview,
}

/// Gate, generate and store each report of one period in turn.
///
/// The first generation or store error aborts the run; reports already
/// stored stay stored.
pub struct Pipeline<'a> {
    ctx: ReportContext<'a>,
    store: &'a mut dyn DestinationStore,
    billing: &'a BillingTarget,
}

impl<'a> Pipeline<'a> {
    pub fn new(
        ctx: ReportContext<'a>,
        store: &'a mut dyn DestinationStore,
        billing: &'a BillingTarget,
    ) -> Self {
        Self {
            ctx,
            store,
            billing,
        }
    }

    /// Gate decisions for every report, without generating anything.
    pub fn check(&self, period: &Period) -> Result<Vec<(ReportKind, TableId, bool)>, ReportError> {
        ReportKind::ALL
            .iter()
            .map(|&kind| {
                let table = self.billing.table(kind.table_name());
                let allowed = gate::can_insert(&*self.store, &table, period)?;
                Ok((kind, table, allowed))
            })
            .collect()
    }

    /// Run every report.
    pub fn run(&mut self, period: &Period, mode: Mode) -> Result<Vec<ReportOutcome>, ReportError> {
        self.run_only(&ReportKind::ALL, period, mode)
    }

    /// Run the given reports, in the given order.
    pub fn run_only(
        &mut self,
        kinds: &[ReportKind],
        period: &Period,
        mode: Mode,
    ) -> Result<Vec<ReportOutcome>, ReportError> {
        info!(month = %period.key, from = %period.first_day, to = %period.last_day, "Starting run");
        let mut outcomes = Vec::with_capacity(kinds.len());

        for &kind in kinds {
            let table = self.billing.table(kind.table_name());

            if !gate::can_insert(&*self.store, &table, period)? {
                warn!("Attempt to insert duplicated data in {table}");
                outcomes.push(ReportOutcome {
                    kind,
                    table,
                    outcome: Outcome::Skipped,
                });
                continue;
            }

            let report = kind.generate(period, &self.ctx)?;
            let outcome = match mode {
                Mode::Commit => {
                    info!("Storing report into {table}...");
                    let rows = self.store.append(&table, &report)?;
                    Outcome::Stored { rows }
                }
                Mode::Preview => Outcome::Previewed(report),
            };
            outcomes.push(ReportOutcome {
                kind,
                table,
                outcome,
            });
        }

        Ok(outcomes)
    }
}
