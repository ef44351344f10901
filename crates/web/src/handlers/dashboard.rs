//! Handler for the authenticated personal dashboard.

use axum::extract::State;
use axum::response::Response;
use ecocusco_db::repositories::ReportRepo;

use crate::error::AppResult;
use crate::handlers::page;
use crate::middleware::auth::AuthUser;
use crate::session::Session;
use crate::state::AppState;
use crate::views::page_context;

/// Reports shown in the "recent activity" list.
const RECENT_LIMIT: i64 = 5;

/// GET /dashboard
pub async fn dashboard(
    State(state): State<AppState>,
    session: Session,
    auth: AuthUser,
) -> AppResult<Response> {
    let totales = ReportRepo::totals_for_user(&state.pool, auth.user.id).await?;
    let materiales = ReportRepo::by_material(&state.pool, Some(auth.user.id)).await?;
    let recientes = ReportRepo::recent_for_user(&state.pool, auth.user.id, RECENT_LIMIT).await?;

    let mut ctx = page_context(&session, Some(&auth.user));
    ctx.insert("totales", &totales);
    ctx.insert("materiales", &materiales);
    ctx.insert("recientes", &recientes);
    page(&state, &mut ctx, "dashboard", "Mi panel")
}
