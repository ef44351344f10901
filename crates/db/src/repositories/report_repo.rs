//! Repository for the `reportes` table: CRUD, paginated listing with
//! equality filters, and the aggregate queries behind the statistics pages.

use chrono::{Duration, Utc};
use ecocusco_core::types::DbId;
use sqlx::QueryBuilder;

use crate::models::report::{
    CommunityTotals, CreateReport, LocationAggregate, MaterialAggregate, MonthlyAggregate, Report,
    ReportFilter, UpdateReport, UserTotals,
};
use crate::repositories::Page;
use crate::DbPool;

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, user_id, tipo_material, cantidad, ubicacion, descripcion, foto, \
                        urgencia, estado, fecha_reporte, created_at, updated_at";

/// Listing order: newest report first, id as tiebreaker so pages are stable.
const LIST_ORDER: &str = "ORDER BY fecha_reporte DESC, id DESC";

/// Provides CRUD and aggregate operations for reports.
pub struct ReportRepo;

impl ReportRepo {
    /// Insert a new report, returning the created row.
    pub async fn create(pool: &DbPool, input: &CreateReport) -> Result<Report, sqlx::Error> {
        let now = Utc::now();
        let query = format!(
            "INSERT INTO reportes
                (user_id, tipo_material, cantidad, ubicacion, descripcion, foto,
                 urgencia, estado, fecha_reporte, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, 'pendiente', ?, ?, ?)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Report>(&query)
            .bind(input.user_id)
            .bind(&input.tipo_material)
            .bind(input.cantidad)
            .bind(&input.ubicacion)
            .bind(&input.descripcion)
            .bind(&input.foto)
            .bind(input.urgencia)
            .bind(now)
            .bind(now)
            .bind(now)
            .fetch_one(pool)
            .await
    }

    /// Find a report by ID.
    pub async fn find_by_id(pool: &DbPool, id: DbId) -> Result<Option<Report>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM reportes WHERE id = ?");
        sqlx::query_as::<_, Report>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// One page of reports matching `filter`, newest first.
    ///
    /// Two round trips: a `COUNT(*)` for the metadata and a `LIMIT/OFFSET`
    /// fetch for the rows. There is deliberately no unpaginated listing.
    pub async fn paginate(
        pool: &DbPool,
        filter: &ReportFilter,
        page: i64,
        per_page: i64,
    ) -> Result<Page<Report>, sqlx::Error> {
        let mut count = QueryBuilder::new("SELECT COUNT(*) FROM reportes WHERE 1 = 1");
        push_filter(&mut count, filter);
        let total: i64 = count.build_query_scalar().fetch_one(pool).await?;

        let mut select =
            QueryBuilder::new(format!("SELECT {COLUMNS} FROM reportes WHERE 1 = 1"));
        push_filter(&mut select, filter);
        select.push(format!(" {LIST_ORDER} LIMIT "));
        select.push_bind(per_page);
        select.push(" OFFSET ");
        select.push_bind((page - 1) * per_page);

        let data = select.build_query_as::<Report>().fetch_all(pool).await?;
        Ok(Page::new(data, page, per_page, total))
    }

    /// Most recent reports for one user, for the dashboard sidebar.
    pub async fn recent_for_user(
        pool: &DbPool,
        user_id: DbId,
        limit: i64,
    ) -> Result<Vec<Report>, sqlx::Error> {
        let query =
            format!("SELECT {COLUMNS} FROM reportes WHERE user_id = ? {LIST_ORDER} LIMIT ?");
        sqlx::query_as::<_, Report>(&query)
            .bind(user_id)
            .bind(limit)
            .fetch_all(pool)
            .await
    }

    /// Update a report. Only non-`None` fields in `input` are applied.
    ///
    /// Returns `None` if no row with the given `id` exists.
    pub async fn update(
        pool: &DbPool,
        id: DbId,
        input: &UpdateReport,
    ) -> Result<Option<Report>, sqlx::Error> {
        let query = format!(
            "UPDATE reportes SET
                tipo_material = COALESCE(?, tipo_material),
                cantidad = COALESCE(?, cantidad),
                ubicacion = COALESCE(?, ubicacion),
                descripcion = COALESCE(?, descripcion),
                foto = COALESCE(?, foto),
                urgencia = COALESCE(?, urgencia),
                estado = COALESCE(?, estado),
                updated_at = ?
             WHERE id = ?
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Report>(&query)
            .bind(&input.tipo_material)
            .bind(input.cantidad)
            .bind(&input.ubicacion)
            .bind(&input.descripcion)
            .bind(&input.foto)
            .bind(input.urgencia)
            .bind(&input.estado)
            .bind(Utc::now())
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Delete a report. Returns `true` if a row was removed.
    pub async fn delete(pool: &DbPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM reportes WHERE id = ?")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    // -----------------------------------------------------------------------
    // Aggregates
    // -----------------------------------------------------------------------

    /// Community-wide headline numbers.
    pub async fn community_totals(pool: &DbPool) -> Result<CommunityTotals, sqlx::Error> {
        sqlx::query_as::<_, CommunityTotals>(
            "SELECT
                (SELECT COUNT(*) FROM reportes) AS total_reportes,
                (SELECT CAST(COALESCE(SUM(cantidad), 0) AS REAL) FROM reportes) AS total_kilos,
                (SELECT COUNT(*) FROM usuarios) AS total_usuarios,
                (SELECT COUNT(*) FROM reportes WHERE estado = 'resuelto') AS reportes_resueltos",
        )
        .fetch_one(pool)
        .await
    }

    /// Headline numbers for one user's dashboard.
    pub async fn totals_for_user(pool: &DbPool, user_id: DbId) -> Result<UserTotals, sqlx::Error> {
        sqlx::query_as::<_, UserTotals>(
            "SELECT
                COUNT(*) AS total_reportes,
                CAST(COALESCE(SUM(cantidad), 0) AS REAL) AS total_kilos,
                COUNT(*) FILTER (WHERE estado = 'pendiente') AS reportes_pendientes,
                COUNT(*) FILTER (WHERE estado = 'resuelto') AS reportes_resueltos
             FROM reportes WHERE user_id = ?",
        )
        .bind(user_id)
        .fetch_one(pool)
        .await
    }

    /// Report count and kilograms per material, heaviest first. Scoped to
    /// one user when `user_id` is given.
    pub async fn by_material(
        pool: &DbPool,
        user_id: Option<DbId>,
    ) -> Result<Vec<MaterialAggregate>, sqlx::Error> {
        let mut qb = QueryBuilder::new(
            "SELECT tipo_material, COUNT(*) AS reportes,
                    CAST(COALESCE(SUM(cantidad), 0) AS REAL) AS kilos
             FROM reportes WHERE 1 = 1",
        );
        if let Some(user_id) = user_id {
            qb.push(" AND user_id = ").push_bind(user_id);
        }
        qb.push(" GROUP BY tipo_material ORDER BY kilos DESC");
        qb.build_query_as::<MaterialAggregate>().fetch_all(pool).await
    }

    /// Monthly series over the trailing year, oldest bucket first.
    pub async fn monthly_series(pool: &DbPool) -> Result<Vec<MonthlyAggregate>, sqlx::Error> {
        let cutoff = Utc::now() - Duration::days(365);
        sqlx::query_as::<_, MonthlyAggregate>(
            "SELECT strftime('%Y-%m', fecha_reporte) AS mes,
                    COUNT(*) AS reportes,
                    CAST(COALESCE(SUM(cantidad), 0) AS REAL) AS kilos
             FROM reportes
             WHERE fecha_reporte >= ?
             GROUP BY mes
             ORDER BY mes ASC",
        )
        .bind(cutoff)
        .fetch_all(pool)
        .await
    }

    /// Locations with the most reports.
    pub async fn top_locations(
        pool: &DbPool,
        limit: i64,
    ) -> Result<Vec<LocationAggregate>, sqlx::Error> {
        sqlx::query_as::<_, LocationAggregate>(
            "SELECT ubicacion, COUNT(*) AS reportes
             FROM reportes
             GROUP BY ubicacion
             ORDER BY reportes DESC, ubicacion ASC
             LIMIT ?",
        )
        .bind(limit)
        .fetch_all(pool)
        .await
    }
}

/// Append the `AND`-joined equality conditions from `filter`.
///
/// Equality is all this supports; anything richer belongs in a dedicated
/// repository method, not a caller-assembled clause.
fn push_filter(qb: &mut QueryBuilder<'_, sqlx::Sqlite>, filter: &ReportFilter) {
    if let Some(user_id) = filter.user_id {
        qb.push(" AND user_id = ").push_bind(user_id);
    }
    if let Some(tipo) = filter.tipo_material.clone() {
        qb.push(" AND tipo_material = ").push_bind(tipo);
    }
    if let Some(estado) = filter.estado.clone() {
        qb.push(" AND estado = ").push_bind(estado);
    }
}
