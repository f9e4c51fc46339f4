use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use chrono::{DateTime, Duration, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::collections::{BTreeMap, HashSet};
use tracing::info;

use crate::db::models::{Profile, Role, Session, SessionStatus};
use crate::db::store::NewSession;
use crate::error::CampusError;
use crate::middleware::auth::{AuthUser, RequireStaff};
use crate::router::CampusState;
use crate::service::calendar;
use crate::service::scheduling::{self, BusyInterval, Slot};

#[derive(Debug, Deserialize)]
pub struct SlotsQuery {
    pub teacher_id: String,
    pub date: NaiveDate,
    pub duration: i64,
}

#[derive(Debug, Serialize)]
pub struct SlotsResponse {
    pub slots: Vec<Slot>,
}

/// GET /api/calendar/available-slots -> candidate windows for the wizard.
/// An unknown teacher yields an empty list, matching the form's empty-state.
pub async fn available_slots(
    State(state): State<CampusState>,
    _auth: AuthUser,
    Query(q): Query<SlotsQuery>,
) -> Result<Json<SlotsResponse>, CampusError> {
    if !scheduling::is_allowed_duration(q.duration) {
        return Err(CampusError::Validation(format!(
            "unsupported duration: {} minutes",
            q.duration
        )));
    }

    let teacher = state
        .storage
        .profile_by_id(&q.teacher_id)
        .await?
        .filter(|p| p.role == Role::Teacher);
    let Some(teacher) = teacher else {
        return Ok(Json(SlotsResponse { slots: Vec::new() }));
    };

    let slots = compute_slots(&state, &teacher.id, q.date, q.duration).await?;
    Ok(Json(SlotsResponse { slots }))
}

#[derive(Debug, Deserialize)]
pub struct CreateSessionRequest {
    /// Defaults to the caller for student accounts.
    pub student_id: Option<String>,
    pub teacher_id: String,
    pub scheduled_at: DateTime<Utc>,
    pub duration_minutes: i64,
    /// Bypass the offered-slot check (wizard "custom time" override).
    #[serde(default)]
    pub custom_time: bool,
    #[serde(default)]
    pub create_meet_link: bool,
}

/// POST /api/calendar/sessions -> book one session.
pub async fn create_session(
    State(state): State<CampusState>,
    AuthUser(caller): AuthUser,
    Json(req): Json<CreateSessionRequest>,
) -> Result<(StatusCode, Json<Session>), CampusError> {
    if !scheduling::is_allowed_duration(req.duration_minutes) {
        return Err(CampusError::Validation(format!(
            "unsupported duration: {} minutes",
            req.duration_minutes
        )));
    }

    // the custom-time override belongs to the staff wizard
    if req.custom_time && caller.role == Role::Student {
        return Err(CampusError::Forbidden);
    }

    let student_id = resolve_student_id(&caller, req.student_id.as_deref())?;
    let student = require_profile(&state, &student_id, Role::Student, "student").await?;
    let teacher = require_profile(&state, &req.teacher_id, Role::Teacher, "teacher").await?;
    if caller.role == Role::Teacher && teacher.id != caller.id {
        return Err(CampusError::Forbidden);
    }

    if req.scheduled_at <= Utc::now() && caller.role != Role::Admin {
        return Err(CampusError::Validation(
            "cannot schedule a session in the past".to_string(),
        ));
    }

    let day = req.scheduled_at.date_naive();
    if !req.custom_time {
        let slots = compute_slots(&state, &teacher.id, day, req.duration_minutes).await?;
        if !slots.iter().any(|s| s.start == req.scheduled_at) {
            return Err(CampusError::Validation(
                "requested time is not an offered slot".to_string(),
            ));
        }
    }

    let session = book_on_subscription(&state, &student, &teacher, BookingDetails {
        scheduled_at: req.scheduled_at,
        duration_minutes: req.duration_minutes,
        create_meet_link: req.create_meet_link,
    })
    .await?;
    info!(
        session_id = %session.id,
        student_id = %student.id,
        teacher_id = %teacher.id,
        scheduled_at = %session.scheduled_at.to_rfc3339(),
        "session booked"
    );
    Ok((StatusCode::CREATED, Json(session)))
}

#[derive(Debug, Deserialize)]
pub struct BulkSessionsRequest {
    pub student_id: String,
    pub teacher_id: String,
    /// First occurrence; later ones repeat weekly at the same time of day.
    pub start_at: DateTime<Utc>,
    pub duration_minutes: i64,
    pub count: u32,
    #[serde(default)]
    pub create_meet_link: bool,
}

#[derive(Debug, Serialize)]
pub struct SkippedDate {
    pub date: NaiveDate,
    pub reason: String,
}

#[derive(Debug, Serialize)]
pub struct BulkSessionsResponse {
    pub created: Vec<Session>,
    pub skipped: Vec<SkippedDate>,
}

const BULK_MAX_OCCURRENCES: u32 = 26;

/// POST /api/calendar/sessions/bulk -> weekly recurrence with holidays
/// dropped. Staff only; per-date failures are reported, not fatal.
pub async fn create_sessions_bulk(
    State(state): State<CampusState>,
    RequireStaff(caller): RequireStaff,
    Json(req): Json<BulkSessionsRequest>,
) -> Result<Json<BulkSessionsResponse>, CampusError> {
    if !scheduling::is_allowed_duration(req.duration_minutes) {
        return Err(CampusError::Validation(format!(
            "unsupported duration: {} minutes",
            req.duration_minutes
        )));
    }
    if req.count == 0 || req.count > BULK_MAX_OCCURRENCES {
        return Err(CampusError::Validation(format!(
            "count must be between 1 and {BULK_MAX_OCCURRENCES}"
        )));
    }

    let student = require_profile(&state, &req.student_id, Role::Student, "student").await?;
    let teacher = require_profile(&state, &req.teacher_id, Role::Teacher, "teacher").await?;
    if caller.role == Role::Teacher && teacher.id != caller.id {
        return Err(CampusError::Forbidden);
    }

    let start_date = req.start_at.date_naive();
    let time_of_day = req.start_at.time();
    let range_end = start_date + Duration::weeks(req.count as i64);
    let holidays: HashSet<NaiveDate> = state
        .storage
        .holidays_between(start_date, range_end)
        .await?
        .into_iter()
        .collect();

    let (kept, holiday_dates) = scheduling::weekly_dates(start_date, req.count, &holidays);

    let mut created = Vec::new();
    let mut skipped: Vec<SkippedDate> = holiday_dates
        .into_iter()
        .map(|date| SkippedDate {
            date,
            reason: "holiday".to_string(),
        })
        .collect();

    for day in kept {
        let scheduled_at = day.and_time(time_of_day).and_utc();
        let booked = book_on_subscription(&state, &student, &teacher, BookingDetails {
            scheduled_at,
            duration_minutes: req.duration_minutes,
            create_meet_link: req.create_meet_link,
        })
        .await;
        match booked {
            Ok(session) => created.push(session),
            Err(CampusError::Conflict(reason)) => skipped.push(SkippedDate {
                date: day,
                reason: reason.to_string(),
            }),
            Err(other) => return Err(other),
        }
    }

    skipped.sort_by_key(|s| s.date);
    info!(
        teacher_id = %teacher.id,
        student_id = %student.id,
        created = created.len(),
        skipped = skipped.len(),
        "bulk scheduling finished"
    );
    Ok(Json(BulkSessionsResponse { created, skipped }))
}

/// POST /api/calendar/sessions/{id}/cancel
pub async fn cancel_session(
    State(state): State<CampusState>,
    AuthUser(caller): AuthUser,
    Path(id): Path<String>,
) -> Result<Json<Session>, CampusError> {
    let session = state
        .storage
        .session_by_id(&id)
        .await?
        .ok_or(CampusError::NotFound("session"))?;
    let involved = caller.id == session.student_id || caller.id == session.teacher_id;
    if caller.role != Role::Admin && !involved {
        return Err(CampusError::Forbidden);
    }
    if session.status.is_terminal() {
        return Err(CampusError::Conflict("session is already finalized"));
    }

    // A timely cancellation hands the slot back to the subscription.
    let refund = session.scheduled_at - Utc::now() >= Duration::hours(24);
    state
        .storage
        .update_session_status(&id, SessionStatus::Cancelled, None)
        .await?;
    if refund {
        state
            .storage
            .release_session_slot(&session.subscription_id)
            .await?;
    }

    let updated = state
        .storage
        .session_by_id(&id)
        .await?
        .ok_or(CampusError::NotFound("session"))?;
    info!(session_id = %id, refunded = refund, "session cancelled");
    Ok(Json(updated))
}

#[derive(Debug, Deserialize)]
pub struct CompleteSessionRequest {
    #[serde(default)]
    pub teacher_notes: Option<String>,
    #[serde(default)]
    pub no_show: bool,
}

/// POST /api/calendar/sessions/{id}/complete -> completed or no_show, with
/// the teacher's report attached.
pub async fn complete_session(
    State(state): State<CampusState>,
    AuthUser(caller): AuthUser,
    Path(id): Path<String>,
    Json(req): Json<CompleteSessionRequest>,
) -> Result<Json<Session>, CampusError> {
    let session = state
        .storage
        .session_by_id(&id)
        .await?
        .ok_or(CampusError::NotFound("session"))?;
    if caller.role != Role::Admin && caller.id != session.teacher_id {
        return Err(CampusError::Forbidden);
    }
    if session.status.is_terminal() {
        return Err(CampusError::Conflict("session is already finalized"));
    }

    let status = if req.no_show {
        SessionStatus::NoShow
    } else {
        SessionStatus::Completed
    };
    state
        .storage
        .update_session_status(&id, status, req.teacher_notes.as_deref())
        .await?;

    let updated = state
        .storage
        .session_by_id(&id)
        .await?
        .ok_or(CampusError::NotFound("session"))?;
    info!(session_id = %id, status = %status.as_str(), "session closed out");
    Ok(Json(updated))
}

#[derive(Debug, Deserialize)]
pub struct RangeQuery {
    pub from: NaiveDate,
    pub to: NaiveDate,
    /// Admins may narrow to one teacher's calendar.
    pub teacher_id: Option<String>,
}

/// GET /api/calendar/sessions -> sessions in [from, to], grouped by day,
/// scoped to what the caller is allowed to see.
pub async fn list_sessions(
    State(state): State<CampusState>,
    AuthUser(caller): AuthUser,
    Query(q): Query<RangeQuery>,
) -> Result<Json<Value>, CampusError> {
    if q.to < q.from {
        return Err(CampusError::Validation(
            "`to` must not precede `from`".to_string(),
        ));
    }
    let from_dt = q.from.and_time(NaiveTime::MIN).and_utc();
    let to_dt = (q.to + Duration::days(1)).and_time(NaiveTime::MIN).and_utc();

    let (teacher_filter, student_filter) = match caller.role {
        Role::Student => (None, Some(caller.id.as_str())),
        Role::Teacher => (Some(caller.id.as_str()), None),
        Role::Admin => (q.teacher_id.as_deref(), None),
    };
    let sessions = state
        .storage
        .sessions_in_range(from_dt, to_dt, teacher_filter, student_filter)
        .await?;

    let days: BTreeMap<String, Vec<Session>> = calendar::group_by_day(sessions)
        .into_iter()
        .map(|(day, list)| (day.to_string(), list))
        .collect();
    Ok(Json(json!({ "days": days })))
}

#[derive(Debug, Deserialize)]
pub struct MonthQuery {
    pub year: i32,
    pub month: u32,
    pub teacher_id: Option<String>,
}

/// GET /api/calendar/month -> the padded month grid plus the caller's
/// sessions grouped onto it.
pub async fn month_view(
    State(state): State<CampusState>,
    AuthUser(caller): AuthUser,
    Query(q): Query<MonthQuery>,
) -> Result<Json<Value>, CampusError> {
    let grid = calendar::month_grid(q.year, q.month);
    let (Some(first), Some(last)) = (grid.first(), grid.last()) else {
        return Err(CampusError::Validation("invalid year/month".to_string()));
    };
    let from_dt = first.and_time(NaiveTime::MIN).and_utc();
    let to_dt = (*last + Duration::days(1)).and_time(NaiveTime::MIN).and_utc();

    let student_filter = (caller.role == Role::Student).then_some(caller.id.as_str());
    let mut sessions = state
        .storage
        .sessions_in_range(from_dt, to_dt, None, student_filter)
        .await?;
    match caller.role {
        Role::Teacher => sessions = calendar::filter_by_teacher(sessions, &caller.id),
        Role::Admin => {
            if let Some(teacher_id) = &q.teacher_id {
                sessions = calendar::filter_by_teacher(sessions, teacher_id);
            }
        }
        Role::Student => {}
    }

    let days: Vec<String> = grid.iter().map(|d| d.to_string()).collect();
    let by_day: BTreeMap<String, Vec<Session>> = calendar::group_by_day(sessions)
        .into_iter()
        .map(|(day, list)| (day.to_string(), list))
        .collect();
    Ok(Json(json!({ "days": days, "sessions": by_day })))
}

struct BookingDetails {
    scheduled_at: DateTime<Utc>,
    duration_minutes: i64,
    create_meet_link: bool,
}

/// Resolve the subscription covering the date and run the transactional
/// booking against it.
async fn book_on_subscription(
    state: &CampusState,
    student: &Profile,
    teacher: &Profile,
    details: BookingDetails,
) -> Result<Session, CampusError> {
    let day = details.scheduled_at.date_naive();
    let subscription = state
        .storage
        .active_subscription_covering(&student.id, day)
        .await?
        .ok_or(CampusError::Conflict(
            "no active subscription covers that date",
        ))?;
    if subscription.sessions_remaining() == 0 {
        return Err(CampusError::Conflict("no sessions left on the subscription"));
    }

    let meet_link = details.create_meet_link.then(new_meet_link);
    state
        .storage
        .book_session(NewSession {
            subscription_id: subscription.id,
            student_id: student.id.clone(),
            teacher_id: teacher.id.clone(),
            scheduled_at: details.scheduled_at,
            duration_minutes: details.duration_minutes,
            meet_link,
        })
        .await
}

async fn compute_slots(
    state: &CampusState,
    teacher_id: &str,
    date: NaiveDate,
    duration_minutes: i64,
) -> Result<Vec<Slot>, CampusError> {
    let blocks = state.storage.availability_for_teacher(teacher_id).await?;
    let day_start = date.and_time(NaiveTime::MIN).and_utc();
    let busy: Vec<BusyInterval> = state
        .storage
        .blocking_sessions_for_teacher(
            teacher_id,
            day_start - Duration::hours(24),
            day_start + Duration::hours(48),
        )
        .await?
        .iter()
        .map(|s| BusyInterval {
            start: s.scheduled_at,
            end: s.ends_at(),
        })
        .collect();
    Ok(scheduling::available_slots(
        date,
        duration_minutes,
        &blocks,
        &busy,
        Utc::now(),
    ))
}

fn resolve_student_id(caller: &Profile, requested: Option<&str>) -> Result<String, CampusError> {
    match caller.role {
        Role::Student => {
            if let Some(requested) = requested
                && requested != caller.id
            {
                return Err(CampusError::Forbidden);
            }
            Ok(caller.id.clone())
        }
        _ => requested
            .map(|s| s.to_string())
            .ok_or_else(|| CampusError::Validation("student_id is required".to_string())),
    }
}

fn new_meet_link() -> String {
    let tag = uuid::Uuid::new_v4().simple().to_string();
    format!("https://meet.jit.si/lingua-{}", &tag[..12])
}

async fn require_profile(
    state: &CampusState,
    id: &str,
    role: Role,
    what: &'static str,
) -> Result<Profile, CampusError> {
    let profile = state
        .storage
        .profile_by_id(id)
        .await?
        .ok_or(CampusError::NotFound(what))?;
    if profile.role != role {
        return Err(CampusError::Validation(format!(
            "{} is not a {}",
            id,
            role.as_str()
        )));
    }
    Ok(profile)
}
