use axum::{Json, extract::State};
use serde::Serialize;

use crate::error::CampusError;
use crate::middleware::auth::AuthUser;
use crate::router::CampusState;
use crate::service::pricing;

#[derive(Debug, Serialize)]
pub struct PackageOption {
    pub months: u32,
    pub price_id: String,
    pub total_cents: i64,
}

#[derive(Debug, Serialize)]
pub struct PackageView {
    pub id: String,
    pub name: String,
    pub sessions_per_month: i64,
    pub monthly_price_cents: i64,
    pub options: Vec<PackageOption>,
}

/// GET /api/packages -> catalog with per-commitment totals.
pub async fn list_packages(
    State(state): State<CampusState>,
    _auth: AuthUser,
) -> Result<Json<Vec<PackageView>>, CampusError> {
    let packages = state.storage.list_active_packages().await?;
    let views = packages
        .into_iter()
        .map(|p| {
            let options = pricing::DURATIONS_MONTHS
                .iter()
                .filter_map(|&months| {
                    let price_id = match months {
                        1 => p.price_id_1m.clone(),
                        3 => p.price_id_3m.clone(),
                        6 => p.price_id_6m.clone(),
                        _ => return None,
                    };
                    pricing::duration_total_cents(p.monthly_price_cents, months).map(
                        |total_cents| PackageOption {
                            months,
                            price_id,
                            total_cents,
                        },
                    )
                })
                .collect();
            PackageView {
                id: p.id,
                name: p.name,
                sessions_per_month: p.sessions_per_month,
                monthly_price_cents: p.monthly_price_cents,
                options,
            }
        })
        .collect();
    Ok(Json(views))
}
