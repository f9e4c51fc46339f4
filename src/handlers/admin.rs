use axum::{Json, extract::State};
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::info;

use crate::db::models::{Profile, Role};
use crate::error::CampusError;
use crate::middleware::auth::RequireAdmin;
use crate::router::CampusState;

#[derive(Debug, Deserialize)]
pub struct AssignTeacherRequest {
    pub student_id: String,
    pub teacher_id: String,
    #[serde(default)]
    pub is_primary: bool,
}

#[derive(Debug, Deserialize)]
pub struct RemoveTeacherRequest {
    pub student_id: String,
    pub teacher_id: String,
}

/// POST /api/admin/assign-teacher -> upserts the pairing; a new primary
/// demotes the previous one.
pub async fn assign_teacher(
    State(state): State<CampusState>,
    RequireAdmin(admin): RequireAdmin,
    Json(req): Json<AssignTeacherRequest>,
) -> Result<Json<Value>, CampusError> {
    let student = require_role(&state, &req.student_id, Role::Student, "student").await?;
    let teacher = require_role(&state, &req.teacher_id, Role::Teacher, "teacher").await?;

    state
        .storage
        .assign_teacher(&student.id, &teacher.id, req.is_primary)
        .await?;
    info!(
        admin_id = %admin.id,
        student_id = %student.id,
        teacher_id = %teacher.id,
        is_primary = req.is_primary,
        "teacher assigned"
    );
    Ok(Json(json!({ "ok": true })))
}

/// POST /api/admin/remove-teacher -> deletes the pairing.
pub async fn remove_teacher(
    State(state): State<CampusState>,
    RequireAdmin(admin): RequireAdmin,
    Json(req): Json<RemoveTeacherRequest>,
) -> Result<Json<Value>, CampusError> {
    let removed = state
        .storage
        .remove_teacher(&req.student_id, &req.teacher_id)
        .await?;
    if !removed {
        return Err(CampusError::NotFound("pairing"));
    }
    info!(
        admin_id = %admin.id,
        student_id = %req.student_id,
        teacher_id = %req.teacher_id,
        "teacher unassigned"
    );
    Ok(Json(json!({ "ok": true })))
}

async fn require_role(
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
