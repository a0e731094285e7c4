//! Executes cascade plans inside a transaction.

use std::fmt;

use sea_orm::sea_query::{
    Alias, Condition, ConditionalStatement, DeleteStatement, Expr, Query, SelectStatement,
};
use sea_orm::{ConnectionTrait, DatabaseTransaction};

use common::{AppError, AppResult};

use super::graph::{CascadePlan, DeletionStep, Dependency, EntityKind, PRIMARY_KEY};

/// How a cascade treats a root row that does not exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CascadeMode {
    /// Missing root is `NotFound`, which rolls the transaction back
    Strict,
    /// Zero rows deleted is success
    Tolerant,
}

/// Rows removed per table by one cascade.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CascadeReport {
    pub root: EntityKind,
    pub root_id: i32,
    deleted: Vec<(EntityKind, u64)>,
}

impl CascadeReport {
    pub(crate) fn new(root: EntityKind, root_id: i32) -> Self {
        Self {
            root,
            root_id,
            deleted: Vec::new(),
        }
    }

    fn record(&mut self, kind: EntityKind, rows: u64) {
        match self.deleted.iter_mut().find(|(k, _)| *k == kind) {
            Some((_, total)) => *total += rows,
            None => self.deleted.push((kind, rows)),
        }
    }

    /// Rows of `kind` removed by the cascade
    pub fn deleted(&self, kind: EntityKind) -> u64 {
        self.deleted
            .iter()
            .find(|(k, _)| *k == kind)
            .map(|(_, rows)| *rows)
            .unwrap_or(0)
    }

    pub fn total(&self) -> u64 {
        self.deleted.iter().map(|(_, rows)| rows).sum()
    }
}

impl fmt::Display for CascadeReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}:", self.root, self.root_id)?;
        for (kind, rows) in &self.deleted {
            write!(f, " {}={}", kind, rows)?;
        }
        Ok(())
    }
}

/// Cascade deletion over the ownership graph.
///
/// Only a [`TransactionContext`](crate::infra::TransactionContext) hands
/// out an engine, so every cascade is all-or-nothing.
pub struct CascadeEngine<'a> {
    txn: &'a DatabaseTransaction,
}

impl<'a> CascadeEngine<'a> {
    pub(crate) fn new(txn: &'a DatabaseTransaction) -> Self {
        Self { txn }
    }

    /// Delete the root row and everything depending on it.
    ///
    /// # Errors
    /// `NotFound` if the root row does not exist.
    pub async fn delete(&self, root: EntityKind, id: i32) -> AppResult<CascadeReport> {
        self.run(CascadePlan::for_root(root), id, CascadeMode::Strict)
            .await
    }

    /// Like [`Self::delete`] but succeeds when there is nothing to delete.
    pub async fn purge(&self, root: EntityKind, id: i32) -> AppResult<CascadeReport> {
        self.run(CascadePlan::for_root(root), id, CascadeMode::Tolerant)
            .await
    }

    async fn run(&self, plan: &CascadePlan, id: i32, mode: CascadeMode) -> AppResult<CascadeReport> {
        let backend = self.txn.get_database_backend();
        let mut report = CascadeReport::new(plan.root(), id);

        for step in plan.steps() {
            let statement = backend.build(&delete_statement(step, id));
            let rows = self.txn.execute(statement).await?.rows_affected();
            tracing::debug!(table = step.kind.table(), hops = step.path.len(), rows, "cascade step");
            report.record(step.kind, rows);
        }

        if mode == CascadeMode::Strict && report.deleted(plan.root()) == 0 {
            return Err(AppError::NotFound);
        }

        Ok(report)
    }
}

pub(crate) fn delete_statement(step: &DeletionStep, root_id: i32) -> DeleteStatement {
    Query::delete()
        .from_table(Alias::new(step.kind.table()))
        .cond_where(reaches_root(step.kind, &step.path, root_id))
        .to_owned()
}

/// Rows of `kind` connected to the root row through `path`.
fn reaches_root(kind: EntityKind, path: &[Dependency], root_id: i32) -> Condition {
    let Some((hop, rest)) = path.split_first() else {
        return Condition::all().add(Expr::col((Alias::new(kind.table()), Alias::new(PRIMARY_KEY))).eq(root_id));
    };

    // Any referencing column is enough (creator OR responsible)
    let mut any = Condition::any();
    for column in hop.columns {
        let referencing = Expr::col((Alias::new(hop.child.table()), Alias::new(*column)));
        let expr = if rest.is_empty() {
            referencing.eq(root_id)
        } else {
            referencing.in_subquery(parent_ids(hop.parent, rest, root_id))
        };
        any = any.add(expr);
    }
    any
}

fn parent_ids(parent: EntityKind, rest: &[Dependency], root_id: i32) -> SelectStatement {
    Query::select()
        .column((Alias::new(parent.table()), Alias::new(PRIMARY_KEY)))
        .from(Alias::new(parent.table()))
        .cond_where(reaches_root(parent, rest, root_id))
        .to_owned()
}
