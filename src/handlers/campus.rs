use axum::{
    Json,
    extract::{Path, State},
    response::{Html, IntoResponse, Redirect, Response},
};
use chrono::{Duration, NaiveTime, Utc};
use serde_json::{Value, json};

use crate::db::models::{Profile, Role};
use crate::error::CampusError;
use crate::middleware::auth::MaybeAuthUser;
use crate::middleware::locale::Locale;
use crate::router::CampusState;
use crate::service::calendar;

const LOGIN_HTML: &str = r#"<!doctype html>
<html>
  <head><meta charset="utf-8"><title>Campus login</title></head>
  <body>
    <main>
      <h1>Campus</h1>
      <form method="post" action="/api/auth/login">
        <input name="email" type="email" autocomplete="email" required>
        <input name="password" type="password" autocomplete="current-password" required>
        <button type="submit">Entrar</button>
      </form>
    </main>
  </body>
</html>
"#;

/// GET /login (default locale).
pub async fn login_page() -> Html<&'static str> {
    Html(LOGIN_HTML)
}

/// GET /{locale}/login; unknown prefixes are not locales.
pub async fn login_page_localized(
    Path(locale): Path<String>,
) -> Result<Html<&'static str>, CampusError> {
    let _: Locale = locale.parse().map_err(|_| CampusError::NotFound("page"))?;
    Ok(Html(LOGIN_HTML))
}

/// GET /campus/{area} (default locale).
pub async fn campus_page(
    State(state): State<CampusState>,
    MaybeAuthUser(user): MaybeAuthUser,
    Path(area): Path<String>,
) -> Result<Response, CampusError> {
    render_campus(&state, Locale::default(), &area, user).await
}

/// GET /{locale}/campus/{area}.
pub async fn campus_page_localized(
    State(state): State<CampusState>,
    MaybeAuthUser(user): MaybeAuthUser,
    Path((locale, area)): Path<(String, String)>,
) -> Result<Response, CampusError> {
    let locale: Locale = locale.parse().map_err(|_| CampusError::NotFound("page"))?;
    render_campus(&state, locale, &area, user).await
}

/// Role gate for the campus area: anonymous visitors go to the login page,
/// a wrong-role visitor goes to their own home, never to an error page.
async fn render_campus(
    state: &CampusState,
    locale: Locale,
    area: &str,
    user: Option<Profile>,
) -> Result<Response, CampusError> {
    let Some(area_role) = parse_area(area) else {
        return Err(CampusError::NotFound("page"));
    };
    let Some(profile) = user else {
        return Ok(Redirect::to(&format!("/{locale}/login")).into_response());
    };
    if profile.role != area_role {
        let home = format!("/{locale}/campus/{}", profile.role);
        return Ok(Redirect::to(&home).into_response());
    }

    let dashboard = match profile.role {
        Role::Student => student_dashboard(state, &profile).await?,
        Role::Teacher => teacher_dashboard(state, &profile).await?,
        Role::Admin => admin_dashboard(state).await?,
    };
    Ok(Json(dashboard).into_response())
}

fn parse_area(area: &str) -> Option<Role> {
    match area {
        "student" => Some(Role::Student),
        "teacher" => Some(Role::Teacher),
        "admin" => Some(Role::Admin),
        _ => None,
    }
}

async fn student_dashboard(state: &CampusState, profile: &Profile) -> Result<Value, CampusError> {
    let now = Utc::now();
    let upcoming: Vec<_> = state
        .storage
        .sessions_in_range(now, now + Duration::days(30), None, Some(profile.id.as_str()))
        .await?
        .into_iter()
        .filter(|s| s.status.blocks_calendar())
        .take(5)
        .collect();
    let subscription = state
        .storage
        .active_subscription_covering(&profile.id, now.date_naive())
        .await?;
    let standing = subscription.map(|sub| {
        json!({
            "package_id": sub.package_id,
            "status": sub.status,
            "ends_at": sub.ends_at,
            "sessions_total": sub.sessions_total,
            "sessions_used": sub.sessions_used,
            "sessions_remaining": sub.sessions_remaining(),
        })
    });
    Ok(json!({
        "role": "student",
        "full_name": profile.full_name,
        "upcoming_sessions": upcoming,
        "subscription": standing,
    }))
}

async fn teacher_dashboard(state: &CampusState, profile: &Profile) -> Result<Value, CampusError> {
    let today = Utc::now().date_naive();
    let day_start = today.and_time(NaiveTime::MIN).and_utc();
    let todays = state
        .storage
        .sessions_in_range(
            day_start,
            day_start + Duration::days(1),
            Some(profile.id.as_str()),
            None,
        )
        .await?;
    let roster = state.storage.students_of_teacher(&profile.id).await?;
    Ok(json!({
        "role": "teacher",
        "full_name": profile.full_name,
        "todays_sessions": todays,
        "students": roster,
    }))
}

async fn admin_dashboard(state: &CampusState) -> Result<Value, CampusError> {
    let today = Utc::now().date_naive();
    let week_start = calendar::week_start(today)
        .and_time(NaiveTime::MIN)
        .and_utc();
    Ok(json!({
        "role": "admin",
        "students": state.storage.count_profiles_with_role(Role::Student).await?,
        "teachers": state.storage.count_profiles_with_role(Role::Teacher).await?,
        "sessions_this_week": state
            .storage
            .count_sessions_between(week_start, week_start + Duration::days(7))
            .await?,
        "leads": state.storage.count_leads().await?,
    }))
}
