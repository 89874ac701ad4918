//! `PostgreSQL` phase repository.

use super::models::{NewPhaseRow, PhaseChangeset, PhaseRow, TaskRow};
use super::schema::{phases, tasks};
use super::{PgPool, run_blocking, to_i64, to_usize, unclassified};
use crate::domain::{
    ApiError, ApiResult, DataWithPages, PageRequest, Phase, PhaseId, PhasePatch, PhaseProjection,
    PhaseView, PhaseWithTasks, SortDir, SortField, TaskSummary,
};
use crate::ports::{PhaseFilters, PhaseRepository};
use async_trait::async_trait;
use diesel::expression::expression_types::NotSelectable;
use diesel::pg::{Pg, PgConnection};
use diesel::prelude::*;
use diesel::result::{DatabaseErrorKind, Error as DieselError};
use std::collections::HashMap;
use uuid::Uuid;

/// `PostgreSQL`-backed phase repository.
#[derive(Debug, Clone)]
pub struct PostgresPhaseRepository {
    pool: PgPool,
}

impl PostgresPhaseRepository {
    /// Creates a new repository from a connection pool.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

type PhaseOrderExpr = Box<dyn BoxableExpression<phases::table, Pg, SqlType = NotSelectable>>;

fn order_expr(field: SortField, descending: bool) -> PhaseOrderExpr {
    match (field, descending) {
        (SortField::Name, false) => Box::new(phases::name.asc()),
        (SortField::Name, true) => Box::new(phases::name.desc()),
        (SortField::Done, false) => Box::new(phases::done.asc()),
        (SortField::Done, true) => Box::new(phases::done.desc()),
        (SortField::CreatedOn, false) => Box::new(phases::created_on.asc()),
        (SortField::CreatedOn, true) => Box::new(phases::created_on.desc()),
        (SortField::UpdatedOn, false) => Box::new(phases::updated_on.asc()),
        (SortField::UpdatedOn, true) => Box::new(phases::updated_on.desc()),
    }
}

fn filtered(filters: &PhaseFilters) -> phases::BoxedQuery<'static, Pg> {
    let mut query = phases::table.into_boxed();
    if let Some(name) = &filters.name {
        query = query.filter(phases::name.eq(name.clone()));
    }
    if let Some(done) = filters.done {
        query = query.filter(phases::done.eq(done));
    }
    if let Some(before) = filters.created_before {
        query = query.filter(phases::created_on.lt(before));
    }
    if let Some(after) = filters.created_after {
        query = query.filter(phases::created_on.gt(after));
    }
    query
}

/// Filtered query with the requested ordering applied.
///
/// The id column is always appended as a final tiebreaker so pagination
/// stays deterministic across phases sharing a timestamp.
fn ordered(filters: &PhaseFilters, page: &PageRequest) -> ApiResult<phases::BoxedQuery<'static, Pg>> {
    let fields = page.sort_fields()?;
    let mut query = filtered(filters);
    if fields.is_empty() {
        return Ok(query
            .order(phases::created_on.asc())
            .then_order_by(phases::id.asc()));
    }
    let descending = matches!(page.sort_direction(), SortDir::Desc);
    let mut remaining = fields.into_iter();
    if let Some(first) = remaining.next() {
        query = query.order(order_expr(first, descending));
    }
    for field in remaining {
        query = query.then_order_by(order_expr(field, descending));
    }
    Ok(query.then_order_by(phases::id.asc()))
}

fn load_summaries(
    connection: &mut PgConnection,
    phase_ids: Vec<Uuid>,
) -> ApiResult<HashMap<Uuid, Vec<TaskSummary>>> {
    let task_rows = tasks::table
        .filter(tasks::phase_id.eq_any(phase_ids))
        .order(tasks::created_on.asc())
        .then_order_by(tasks::id.asc())
        .select(TaskRow::as_select())
        .load::<TaskRow>(connection)
        .map_err(|err| unclassified(&err))?;
    let mut grouped: HashMap<Uuid, Vec<TaskSummary>> = HashMap::new();
    for row in task_rows {
        grouped
            .entry(row.phase_id)
            .or_default()
            .push(TaskSummary::from(row));
    }
    Ok(grouped)
}

fn project_row(
    connection: &mut PgConnection,
    row: PhaseRow,
    projection: PhaseProjection,
) -> ApiResult<PhaseView> {
    match projection {
        PhaseProjection::Raw => Ok(PhaseView::Raw(row.into())),
        PhaseProjection::WithTasks => {
            let mut grouped = load_summaries(connection, vec![row.id])?;
            let summaries = grouped.remove(&row.id).unwrap_or_default();
            Ok(PhaseView::WithTasks(PhaseWithTasks::new(
                row.into(),
                summaries,
            )))
        }
    }
}

fn project_rows(
    connection: &mut PgConnection,
    rows: Vec<PhaseRow>,
    projection: PhaseProjection,
) -> ApiResult<Vec<PhaseView>> {
    match projection {
        PhaseProjection::Raw => Ok(rows
            .into_iter()
            .map(|row| PhaseView::Raw(row.into()))
            .collect()),
        PhaseProjection::WithTasks => {
            let ids = rows.iter().map(|row| row.id).collect();
            let mut grouped = load_summaries(connection, ids)?;
            Ok(rows
                .into_iter()
                .map(|row| {
                    let summaries = grouped.remove(&row.id).unwrap_or_default();
                    PhaseView::WithTasks(PhaseWithTasks::new(row.into(), summaries))
                })
                .collect())
        }
    }
}

fn map_write_error(err: &DieselError) -> ApiError {
    match err {
        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, info) => {
            ApiError::conflict(info.message().to_owned())
        }
        other => unclassified(other),
    }
}

#[async_trait]
impl PhaseRepository for PostgresPhaseRepository {
    async fn insert(&self, phase: &Phase) -> ApiResult<()> {
        let row = NewPhaseRow::from(phase);
        run_blocking(&self.pool, move |connection| {
            diesel::insert_into(phases::table)
                .values(&row)
                .execute(connection)
                .map_err(|err| match err {
                    DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
                        ApiError::conflict(format!("phase {} already exists", row.name))
                    }
                    other => unclassified(&other),
                })?;
            Ok(())
        })
        .await
    }

    async fn update(&self, id: PhaseId, patch: &PhasePatch) -> ApiResult<Option<Phase>> {
        let changeset = PhaseChangeset::from(patch);
        run_blocking(&self.pool, move |connection| {
            diesel::update(phases::table.find(id.into_inner()))
                .set(&changeset)
                .returning(PhaseRow::as_returning())
                .get_result::<PhaseRow>(connection)
                .optional()
                .map_err(|err| map_write_error(&err))
                .map(|updated| updated.map(Phase::from))
        })
        .await
    }

    async fn find_by_id(
        &self,
        id: PhaseId,
        projection: PhaseProjection,
    ) -> ApiResult<Option<PhaseView>> {
        run_blocking(&self.pool, move |connection| {
            let row = phases::table
                .find(id.into_inner())
                .select(PhaseRow::as_select())
                .first::<PhaseRow>(connection)
                .optional()
                .map_err(|err| unclassified(&err))?;
            row.map(|found| project_row(connection, found, projection))
                .transpose()
        })
        .await
    }

    async fn find_many(
        &self,
        projection: PhaseProjection,
        filters: &PhaseFilters,
        page: &PageRequest,
    ) -> ApiResult<DataWithPages<PhaseView>> {
        let list_filters = filters.clone();
        let list_page = page.clone();
        run_blocking(&self.pool, move |connection| {
            let total = filtered(&list_filters)
                .count()
                .get_result::<i64>(connection)
                .map_err(|err| unclassified(&err))?;
            let rows = ordered(&list_filters, &list_page)?
                .offset(to_i64(list_page.offset()))
                .limit(to_i64(list_page.page_size))
                .select(PhaseRow::as_select())
                .load::<PhaseRow>(connection)
                .map_err(|err| unclassified(&err))?;
            let data = project_rows(connection, rows, projection)?;
            let pages = list_page.total_pages(to_usize(total));
            Ok(DataWithPages { data, pages })
        })
        .await
    }

    async fn delete_by_id(&self, id: PhaseId) -> ApiResult<usize> {
        run_blocking(&self.pool, move |connection| {
            diesel::delete(phases::table.find(id.into_inner()))
                .execute(connection)
                .map_err(|err| match err {
                    DieselError::DatabaseError(DatabaseErrorKind::ForeignKeyViolation, _) => {
                        ApiError::Forbidden
                    }
                    other => unclassified(&other),
                })
        })
        .await
    }
}
