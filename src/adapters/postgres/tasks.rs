//! `PostgreSQL` task repository.

use super::models::{NewTaskRow, TaskChangeset, TaskRow};
use super::schema::tasks;
use super::{PgPool, run_blocking, to_i64, to_usize, unclassified};
use crate::domain::{
    ApiError, ApiResult, DataWithPages, PageRequest, SortDir, SortField, Task, TaskId, TaskPatch,
};
use crate::ports::{TaskFilters, TaskRepository};
use async_trait::async_trait;
use diesel::expression::expression_types::NotSelectable;
use diesel::pg::Pg;
use diesel::prelude::*;
use diesel::result::{DatabaseErrorKind, Error as DieselError};

/// `PostgreSQL`-backed task repository.
#[derive(Debug, Clone)]
pub struct PostgresTaskRepository {
    pool: PgPool,
}

impl PostgresTaskRepository {
    /// Creates a new repository from a connection pool.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

type TaskOrderExpr = Box<dyn BoxableExpression<tasks::table, Pg, SqlType = NotSelectable>>;

fn order_expr(field: SortField, descending: bool) -> TaskOrderExpr {
    match (field, descending) {
        (SortField::Name, false) => Box::new(tasks::name.asc()),
        (SortField::Name, true) => Box::new(tasks::name.desc()),
        (SortField::Done, false) => Box::new(tasks::done.asc()),
        (SortField::Done, true) => Box::new(tasks::done.desc()),
        (SortField::CreatedOn, false) => Box::new(tasks::created_on.asc()),
        (SortField::CreatedOn, true) => Box::new(tasks::created_on.desc()),
        (SortField::UpdatedOn, false) => Box::new(tasks::updated_on.asc()),
        (SortField::UpdatedOn, true) => Box::new(tasks::updated_on.desc()),
    }
}

fn filtered(filters: &TaskFilters) -> tasks::BoxedQuery<'static, Pg> {
    let mut query = tasks::table.into_boxed();
    if let Some(name) = &filters.name {
        query = query.filter(tasks::name.eq(name.clone()));
    }
    if let Some(done) = filters.done {
        query = query.filter(tasks::done.eq(done));
    }
    if let Some(phase_id) = filters.phase_id {
        query = query.filter(tasks::phase_id.eq(phase_id.into_inner()));
    }
    query
}

/// Filtered query with the requested ordering applied.
///
/// The id column is always appended as a final tiebreaker so pagination
/// stays deterministic across tasks sharing a timestamp.
fn ordered(filters: &TaskFilters, page: &PageRequest) -> ApiResult<tasks::BoxedQuery<'static, Pg>> {
    let fields = page.sort_fields()?;
    let mut query = filtered(filters);
    if fields.is_empty() {
        return Ok(query
            .order(tasks::created_on.asc())
            .then_order_by(tasks::id.asc()));
    }
    let descending = matches!(page.sort_direction(), SortDir::Desc);
    let mut remaining = fields.into_iter();
    if let Some(first) = remaining.next() {
        query = query.order(order_expr(first, descending));
    }
    for field in remaining {
        query = query.then_order_by(order_expr(field, descending));
    }
    Ok(query.then_order_by(tasks::id.asc()))
}

#[async_trait]
impl TaskRepository for PostgresTaskRepository {
    async fn insert(&self, task: &Task) -> ApiResult<()> {
        let row = NewTaskRow::from(task);
        run_blocking(&self.pool, move |connection| {
            diesel::insert_into(tasks::table)
                .values(&row)
                .execute(connection)
                .map_err(|err| match err {
                    DieselError::DatabaseError(DatabaseErrorKind::ForeignKeyViolation, _) => {
                        ApiError::bad_request("related phase does not exist")
                    }
                    DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, info) => {
                        ApiError::conflict(info.message().to_owned())
                    }
                    other => unclassified(&other),
                })?;
            Ok(())
        })
        .await
    }

    async fn update(&self, id: TaskId, patch: &TaskPatch) -> ApiResult<Option<Task>> {
        let changeset = TaskChangeset::from(patch);
        run_blocking(&self.pool, move |connection| {
            diesel::update(tasks::table.find(id.into_inner()))
                .set(&changeset)
                .returning(TaskRow::as_returning())
                .get_result::<TaskRow>(connection)
                .optional()
                .map_err(|err| unclassified(&err))
                .map(|updated| updated.map(Task::from))
        })
        .await
    }

    async fn find_by_id(&self, id: TaskId) -> ApiResult<Option<Task>> {
        run_blocking(&self.pool, move |connection| {
            tasks::table
                .find(id.into_inner())
                .select(TaskRow::as_select())
                .first::<TaskRow>(connection)
                .optional()
                .map_err(|err| unclassified(&err))
                .map(|row| row.map(Task::from))
        })
        .await
    }

    async fn find_many(
        &self,
        filters: &TaskFilters,
        page: &PageRequest,
    ) -> ApiResult<DataWithPages<Task>> {
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
                .select(TaskRow::as_select())
                .load::<TaskRow>(connection)
                .map_err(|err| unclassified(&err))?;
            let data = rows.into_iter().map(Task::from).collect();
            let pages = list_page.total_pages(to_usize(total));
            Ok(DataWithPages { data, pages })
        })
        .await
    }

    async fn delete_by_id(&self, id: TaskId) -> ApiResult<usize> {
        run_blocking(&self.pool, move |connection| {
            diesel::delete(tasks::table.find(id.into_inner()))
                .execute(connection)
                .map_err(|err| unclassified(&err))
        })
        .await
    }
}
