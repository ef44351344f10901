//! Handler for the public home page.

use axum::extract::State;
use axum::response::Response;
use ecocusco_db::repositories::ReportRepo;

use crate::error::AppResult;
use crate::handlers::page;
use crate::middleware::auth::OptionalUser;
use crate::session::Session;
use crate::state::AppState;
use crate::views::page_context;

/// GET / -- community headline numbers for visitors and members alike.
pub async fn home(
    State(state): State<AppState>,
    session: Session,
    OptionalUser(user): OptionalUser,
) -> AppResult<Response> {
    let totales = ReportRepo::community_totals(&state.pool).await?;
    let materiales = ReportRepo::by_material(&state.pool, None).await?;

    let mut ctx = page_context(&session, user.as_ref());
    ctx.insert("totales", &totales);
    ctx.insert("materiales", &materiales);
    page(&state, &mut ctx, "home", "EcoCusco")
}
