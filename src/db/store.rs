use crate::db::models::{
    AvailabilityBlock, DueReminder, Lead, Package, Profile, Role, Session, SessionStatus,
    StudentTeacher, Subscription, SubscriptionStatus,
};
use crate::db::schema::SQLITE_INIT;
use crate::error::CampusError;
use chrono::{DateTime, Duration, NaiveDate, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions, SqliteRow};
use sqlx::{Pool, Row, Sqlite};
use std::str::FromStr;

pub type SqlitePool = Pool<Sqlite>;

/// New session shape handed to `book_session`; id and status are assigned
/// inside the booking transaction.
#[derive(Debug, Clone)]
pub struct NewSession {
    pub subscription_id: String,
    pub student_id: String,
    pub teacher_id: String,
    pub scheduled_at: DateTime<Utc>,
    pub duration_minutes: i64,
    pub meet_link: Option<String>,
}

#[derive(Clone)]
pub struct CampusStorage {
    pool: SqlitePool,
}

impl CampusStorage {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Open (creating if missing) the SQLite database behind `database_url`.
    pub async fn connect(database_url: &str) -> Result<Self, CampusError> {
        let connect_opts = SqliteConnectOptions::from_str(database_url)
            .map_err(CampusError::Database)?
            .create_if_missing(true);
        let pool = SqlitePoolOptions::new().connect_with(connect_opts).await?;
        let storage = Self::new(pool);
        storage.init_schema().await?;
        Ok(storage)
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Initialize the schema by executing the bundled DDL.
    pub async fn init_schema(&self) -> Result<(), CampusError> {
        // execute multiple statements safely (SQLite supports multi-commands but sqlx::query doesn't)
        for stmt in SQLITE_INIT.split(';') {
            let s = stmt.trim();
            if s.is_empty() {
                continue;
            }
            sqlx::query(s).execute(&self.pool).await?;
        }
        Ok(())
    }

    // ---- profiles ----

    pub async fn create_profile(
        &self,
        role: Role,
        full_name: &str,
        email: &str,
        password_hash: &str,
    ) -> Result<Profile, CampusError> {
        let profile = Profile {
            id: uuid::Uuid::new_v4().to_string(),
            role,
            full_name: full_name.to_string(),
            email: email.to_string(),
            password_hash: password_hash.to_string(),
            created_at: Utc::now(),
        };
        sqlx::query(
            r#"INSERT INTO profiles (id, role, full_name, email, password_hash, created_at)
               VALUES (?, ?, ?, ?, ?, ?)"#,
        )
        .bind(&profile.id)
        .bind(profile.role.as_str())
        .bind(&profile.full_name)
        .bind(&profile.email)
        .bind(&profile.password_hash)
        .bind(profile.created_at.to_rfc3339())
        .execute(&self.pool)
        .await?;
        Ok(profile)
    }

    pub async fn profile_by_email(&self, email: &str) -> Result<Option<Profile>, CampusError> {
        let row = sqlx::query(
            r#"SELECT id, role, full_name, email, password_hash, created_at
               FROM profiles WHERE email = ?"#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;
        row.map(row_to_profile).transpose()
    }

    pub async fn profile_by_id(&self, id: &str) -> Result<Option<Profile>, CampusError> {
        let row = sqlx::query(
            r#"SELECT id, role, full_name, email, password_hash, created_at
               FROM profiles WHERE id = ?"#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        row.map(row_to_profile).transpose()
    }

    pub async fn update_full_name(&self, id: &str, full_name: &str) -> Result<(), CampusError> {
        let res = sqlx::query("UPDATE profiles SET full_name = ? WHERE id = ?")
            .bind(full_name)
            .bind(id)
            .execute(&self.pool)
            .await?;
        if res.rows_affected() == 0 {
            return Err(CampusError::NotFound("profile"));
        }
        Ok(())
    }

    pub async fn count_profiles_with_role(&self, role: Role) -> Result<i64, CampusError> {
        let rec: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM profiles WHERE role = ?")
            .bind(role.as_str())
            .fetch_one(&self.pool)
            .await?;
        Ok(rec.0)
    }

    /// Seed an admin account unless the email is already taken.
    pub async fn ensure_admin(
        &self,
        email: &str,
        password_hash: &str,
    ) -> Result<Option<Profile>, CampusError> {
        if self.profile_by_email(email).await?.is_some() {
            return Ok(None);
        }
        let profile = self
            .create_profile(Role::Admin, "Campus Admin", email, password_hash)
            .await?;
        Ok(Some(profile))
    }

    // ---- auth tokens ----

    pub async fn insert_token(
        &self,
        token: &str,
        profile_id: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<(), CampusError> {
        sqlx::query("INSERT INTO auth_tokens (token, profile_id, expires_at) VALUES (?, ?, ?)")
            .bind(token)
            .bind(profile_id)
            .bind(expires_at.to_rfc3339())
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// Resolve a bearer token to its profile. Expired tokens are purged lazily.
    pub async fn profile_by_token(&self, token: &str) -> Result<Option<Profile>, CampusError> {
        let row = sqlx::query(
            r#"SELECT p.id, p.role, p.full_name, p.email, p.password_hash, p.created_at,
                      t.expires_at
               FROM auth_tokens t JOIN profiles p ON p.id = t.profile_id
               WHERE t.token = ?"#,
        )
        .bind(token)
        .fetch_optional(&self.pool)
        .await?;
        let Some(row) = row else {
            return Ok(None);
        };
        let expires_at = parse_dt(&row.try_get::<String, _>("expires_at")?)?;
        if expires_at <= Utc::now() {
            self.delete_token(token).await?;
            return Ok(None);
        }
        Ok(Some(row_to_profile(row)?))
    }

    pub async fn delete_token(&self, token: &str) -> Result<(), CampusError> {
        sqlx::query("DELETE FROM auth_tokens WHERE token = ?")
            .bind(token)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    // ---- student/teacher pairings ----

    /// Upsert a pairing. When `is_primary` is set, any previous primary
    /// teacher of the student is demoted in the same transaction.
    pub async fn assign_teacher(
        &self,
        student_id: &str,
        teacher_id: &str,
        is_primary: bool,
    ) -> Result<(), CampusError> {
        let mut tx = self.pool.begin().await?;
        if is_primary {
            sqlx::query("UPDATE student_teachers SET is_primary = 0 WHERE student_id = ?")
                .bind(student_id)
                .execute(&mut *tx)
                .await?;
        }
        sqlx::query(
            r#"INSERT INTO student_teachers (student_id, teacher_id, is_primary)
               VALUES (?, ?, ?)
               ON CONFLICT(student_id, teacher_id) DO UPDATE SET
                   is_primary=excluded.is_primary"#,
        )
        .bind(student_id)
        .bind(teacher_id)
        .bind(if is_primary { 1 } else { 0 })
        .execute(&mut *tx)
        .await?;
        tx.commit().await?;
        Ok(())
    }

    pub async fn remove_teacher(
        &self,
        student_id: &str,
        teacher_id: &str,
    ) -> Result<bool, CampusError> {
        let res = sqlx::query(
            "DELETE FROM student_teachers WHERE student_id = ? AND teacher_id = ?",
        )
        .bind(student_id)
        .bind(teacher_id)
        .execute(&self.pool)
        .await?;
        Ok(res.rows_affected() > 0)
    }

    pub async fn pairings_for_student(
        &self,
        student_id: &str,
    ) -> Result<Vec<StudentTeacher>, CampusError> {
        let rows = sqlx::query(
            r#"SELECT student_id, teacher_id, is_primary
               FROM student_teachers WHERE student_id = ? ORDER BY is_primary DESC"#,
        )
        .bind(student_id)
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter()
            .map(|row| {
                Ok(StudentTeacher {
                    student_id: row.try_get("student_id")?,
                    teacher_id: row.try_get("teacher_id")?,
                    is_primary: row.try_get::<i64, _>("is_primary")? != 0,
                })
            })
            .collect()
    }

    pub async fn students_of_teacher(&self, teacher_id: &str) -> Result<Vec<Profile>, CampusError> {
        let rows = sqlx::query(
            r#"SELECT p.id, p.role, p.full_name, p.email, p.password_hash, p.created_at
               FROM student_teachers st JOIN profiles p ON p.id = st.student_id
               WHERE st.teacher_id = ? ORDER BY p.full_name"#,
        )
        .bind(teacher_id)
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter().map(row_to_profile).collect()
    }

    // ---- packages ----

    pub async fn insert_package(&self, package: &Package) -> Result<(), CampusError> {
        sqlx::query(
            r#"INSERT INTO packages (
                   id, name, sessions_per_month, monthly_price_cents,
                   price_id_1m, price_id_3m, price_id_6m, active
               ) VALUES (?, ?, ?, ?, ?, ?, ?, ?)"#,
        )
        .bind(&package.id)
        .bind(&package.name)
        .bind(package.sessions_per_month)
        .bind(package.monthly_price_cents)
        .bind(&package.price_id_1m)
        .bind(&package.price_id_3m)
        .bind(&package.price_id_6m)
        .bind(if package.active { 1 } else { 0 })
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    pub async fn list_active_packages(&self) -> Result<Vec<Package>, CampusError> {
        let rows = sqlx::query(
            r#"SELECT id, name, sessions_per_month, monthly_price_cents,
                      price_id_1m, price_id_3m, price_id_6m, active
               FROM packages WHERE active = 1 ORDER BY monthly_price_cents"#,
        )
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter().map(row_to_package).collect()
    }

    pub async fn package_by_price_id(
        &self,
        price_id: &str,
    ) -> Result<Option<Package>, CampusError> {
        let row = sqlx::query(
            r#"SELECT id, name, sessions_per_month, monthly_price_cents,
                      price_id_1m, price_id_3m, price_id_6m, active
               FROM packages
               WHERE active = 1 AND (price_id_1m = ? OR price_id_3m = ? OR price_id_6m = ?)"#,
        )
        .bind(price_id)
        .bind(price_id)
        .bind(price_id)
        .fetch_optional(&self.pool)
        .await?;
        row.map(row_to_package).transpose()
    }

    // ---- subscriptions ----

    pub async fn insert_subscription(&self, sub: &Subscription) -> Result<(), CampusError> {
        sqlx::query(
            r#"INSERT INTO subscriptions (
                   id, student_id, package_id, status, duration_months,
                   starts_at, ends_at, sessions_total, sessions_used
               ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)"#,
        )
        .bind(&sub.id)
        .bind(&sub.student_id)
        .bind(&sub.package_id)
        .bind(sub.status.as_str())
        .bind(sub.duration_months)
        .bind(sub.starts_at.to_string())
        .bind(sub.ends_at.to_string())
        .bind(sub.sessions_total)
        .bind(sub.sessions_used)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// The student's active subscription whose window contains `day`.
    pub async fn active_subscription_covering(
        &self,
        student_id: &str,
        day: NaiveDate,
    ) -> Result<Option<Subscription>, CampusError> {
        let day_s = day.to_string();
        let row = sqlx::query(
            r#"SELECT id, student_id, package_id, status, duration_months,
                      starts_at, ends_at, sessions_total, sessions_used
               FROM subscriptions
               WHERE student_id = ? AND status = 'active' AND starts_at <= ? AND ends_at >= ?
               ORDER BY starts_at DESC"#,
        )
        .bind(student_id)
        .bind(&day_s)
        .bind(&day_s)
        .fetch_optional(&self.pool)
        .await?;
        row.map(row_to_subscription).transpose()
    }

    pub async fn subscription_by_id(&self, id: &str) -> Result<Option<Subscription>, CampusError> {
        let row = sqlx::query(
            r#"SELECT id, student_id, package_id, status, duration_months,
                      starts_at, ends_at, sessions_total, sessions_used
               FROM subscriptions WHERE id = ?"#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        row.map(row_to_subscription).transpose()
    }

    /// Hand a consumed session back to the subscription allotment.
    pub async fn release_session_slot(&self, subscription_id: &str) -> Result<(), CampusError> {
        sqlx::query(
            "UPDATE subscriptions SET sessions_used = sessions_used - 1
             WHERE id = ? AND sessions_used > 0",
        )
        .bind(subscription_id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    // ---- sessions ----

    /// Book a session transactionally: the teacher's calendar is re-checked
    /// for overlap and one session is consumed from the subscription
    /// allotment, or the whole booking fails.
    pub async fn book_session(&self, new: NewSession) -> Result<Session, CampusError> {
        let new_end = new.scheduled_at + Duration::minutes(new.duration_minutes);
        let window_from = (new.scheduled_at - Duration::hours(24)).to_rfc3339();
        let window_to = (new_end + Duration::hours(24)).to_rfc3339();

        let mut tx = self.pool.begin().await?;

        let rows = sqlx::query(
            r#"SELECT scheduled_at, duration_minutes FROM sessions
               WHERE teacher_id = ? AND status != 'cancelled'
                 AND scheduled_at >= ? AND scheduled_at <= ?"#,
        )
        .bind(&new.teacher_id)
        .bind(&window_from)
        .bind(&window_to)
        .fetch_all(&mut *tx)
        .await?;
        for row in rows {
            let start = parse_dt(&row.try_get::<String, _>("scheduled_at")?)?;
            let end = start + Duration::minutes(row.try_get::<i64, _>("duration_minutes")?);
            if start < new_end && end > new.scheduled_at {
                return Err(CampusError::Conflict(
                    "the teacher already has a session in that window",
                ));
            }
        }

        let consumed = sqlx::query(
            "UPDATE subscriptions SET sessions_used = sessions_used + 1
             WHERE id = ? AND status = 'active' AND sessions_used < sessions_total",
        )
        .bind(&new.subscription_id)
        .execute(&mut *tx)
        .await?;
        if consumed.rows_affected() == 0 {
            return Err(CampusError::Conflict(
                "no sessions left on the subscription",
            ));
        }

        let session = Session {
            id: uuid::Uuid::new_v4().to_string(),
            subscription_id: new.subscription_id,
            student_id: new.student_id,
            teacher_id: new.teacher_id,
            scheduled_at: new.scheduled_at,
            duration_minutes: new.duration_minutes,
            status: SessionStatus::Scheduled,
            meet_link: new.meet_link,
            teacher_notes: None,
            reminder_sent_at: None,
        };
        sqlx::query(
            r#"INSERT INTO sessions (
                   id, subscription_id, student_id, teacher_id, scheduled_at,
                   duration_minutes, status, meet_link
               ) VALUES (?, ?, ?, ?, ?, ?, ?, ?)"#,
        )
        .bind(&session.id)
        .bind(&session.subscription_id)
        .bind(&session.student_id)
        .bind(&session.teacher_id)
        .bind(session.scheduled_at.to_rfc3339())
        .bind(session.duration_minutes)
        .bind(session.status.as_str())
        .bind(&session.meet_link)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(session)
    }

    pub async fn session_by_id(&self, id: &str) -> Result<Option<Session>, CampusError> {
        let row = sqlx::query(&format!("{SESSION_SELECT} WHERE id = ?"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.map(row_to_session).transpose()
    }

    /// Calendar-blocking sessions for a teacher inside [from, to).
    pub async fn blocking_sessions_for_teacher(
        &self,
        teacher_id: &str,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<Session>, CampusError> {
        let rows = sqlx::query(&format!(
            "{SESSION_SELECT}
             WHERE teacher_id = ? AND status != 'cancelled'
               AND scheduled_at >= ? AND scheduled_at < ?
             ORDER BY scheduled_at"
        ))
        .bind(teacher_id)
        .bind(from.to_rfc3339())
        .bind(to.to_rfc3339())
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter().map(row_to_session).collect()
    }

    pub async fn sessions_in_range(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
        teacher_id: Option<&str>,
        student_id: Option<&str>,
    ) -> Result<Vec<Session>, CampusError> {
        let mut sql = format!(
            "{SESSION_SELECT} WHERE scheduled_at >= ? AND scheduled_at < ?"
        );
        if teacher_id.is_some() {
            sql.push_str(" AND teacher_id = ?");
        }
        if student_id.is_some() {
            sql.push_str(" AND student_id = ?");
        }
        sql.push_str(" ORDER BY scheduled_at");

        let mut query = sqlx::query(&sql)
            .bind(from.to_rfc3339())
            .bind(to.to_rfc3339());
        if let Some(t) = teacher_id {
            query = query.bind(t);
        }
        if let Some(s) = student_id {
            query = query.bind(s);
        }
        let rows = query.fetch_all(&self.pool).await?;
        rows.into_iter().map(row_to_session).collect()
    }

    pub async fn update_session_status(
        &self,
        id: &str,
        status: SessionStatus,
        teacher_notes: Option<&str>,
    ) -> Result<(), CampusError> {
        let res = match teacher_notes {
            Some(notes) => {
                sqlx::query("UPDATE sessions SET status = ?, teacher_notes = ? WHERE id = ?")
                    .bind(status.as_str())
                    .bind(notes)
                    .bind(id)
                    .execute(&self.pool)
                    .await?
            }
            None => {
                sqlx::query("UPDATE sessions SET status = ? WHERE id = ?")
                    .bind(status.as_str())
                    .bind(id)
                    .execute(&self.pool)
                    .await?
            }
        };
        if res.rows_affected() == 0 {
            return Err(CampusError::NotFound("session"));
        }
        Ok(())
    }

    /// Scheduled sessions starting inside [now, until] that have not been
    /// reminded yet, joined with student/teacher details.
    pub async fn due_reminders(
        &self,
        now: DateTime<Utc>,
        until: DateTime<Utc>,
    ) -> Result<Vec<DueReminder>, CampusError> {
        let rows = sqlx::query(
            r#"SELECT s.id AS session_id, s.scheduled_at, s.meet_link,
                      sp.email AS student_email, sp.full_name AS student_name,
                      tp.full_name AS teacher_name
               FROM sessions s
               JOIN profiles sp ON sp.id = s.student_id
               JOIN profiles tp ON tp.id = s.teacher_id
               WHERE s.status = 'scheduled' AND s.reminder_sent_at IS NULL
                 AND s.scheduled_at >= ? AND s.scheduled_at <= ?
               ORDER BY s.scheduled_at"#,
        )
        .bind(now.to_rfc3339())
        .bind(until.to_rfc3339())
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter()
            .map(|row| {
                Ok(DueReminder {
                    session_id: row.try_get("session_id")?,
                    student_email: row.try_get("student_email")?,
                    student_name: row.try_get("student_name")?,
                    teacher_name: row.try_get("teacher_name")?,
                    scheduled_at: parse_dt(&row.try_get::<String, _>("scheduled_at")?)?,
                    meet_link: row.try_get("meet_link")?,
                })
            })
            .collect()
    }

    pub async fn mark_reminders_sent(
        &self,
        session_ids: &[String],
        at: DateTime<Utc>,
    ) -> Result<(), CampusError> {
        let at_s = at.to_rfc3339();
        let mut tx = self.pool.begin().await?;
        for id in session_ids {
            sqlx::query("UPDATE sessions SET reminder_sent_at = ? WHERE id = ?")
                .bind(&at_s)
                .bind(id)
                .execute(&mut *tx)
                .await?;
        }
        tx.commit().await?;
        Ok(())
    }

    pub async fn count_sessions_between(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<i64, CampusError> {
        let rec: (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM sessions
             WHERE status = 'scheduled' AND scheduled_at >= ? AND scheduled_at < ?",
        )
        .bind(from.to_rfc3339())
        .bind(to.to_rfc3339())
        .fetch_one(&self.pool)
        .await?;
        Ok(rec.0)
    }

    // ---- teacher availability ----

    pub async fn set_availability(&self, block: &AvailabilityBlock) -> Result<(), CampusError> {
        sqlx::query(
            r#"INSERT INTO teacher_availability (teacher_id, weekday, start_minute, end_minute)
               VALUES (?, ?, ?, ?)
               ON CONFLICT(teacher_id, weekday, start_minute) DO UPDATE SET
                   end_minute=excluded.end_minute"#,
        )
        .bind(&block.teacher_id)
        .bind(block.weekday as i64)
        .bind(block.start_minute as i64)
        .bind(block.end_minute as i64)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    pub async fn availability_for_teacher(
        &self,
        teacher_id: &str,
    ) -> Result<Vec<AvailabilityBlock>, CampusError> {
        let rows = sqlx::query(
            r#"SELECT teacher_id, weekday, start_minute, end_minute
               FROM teacher_availability WHERE teacher_id = ?
               ORDER BY weekday, start_minute"#,
        )
        .bind(teacher_id)
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter()
            .map(|row| {
                Ok(AvailabilityBlock {
                    teacher_id: row.try_get("teacher_id")?,
                    weekday: row.try_get::<i64, _>("weekday")? as u8,
                    start_minute: row.try_get::<i64, _>("start_minute")? as u16,
                    end_minute: row.try_get::<i64, _>("end_minute")? as u16,
                })
            })
            .collect()
    }

    // ---- holidays ----

    pub async fn add_holiday(&self, day: NaiveDate, name: &str) -> Result<(), CampusError> {
        sqlx::query(
            r#"INSERT INTO holidays (day, name) VALUES (?, ?)
               ON CONFLICT(day) DO UPDATE SET name=excluded.name"#,
        )
        .bind(day.to_string())
        .bind(name)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    pub async fn holidays_between(
        &self,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<NaiveDate>, CampusError> {
        let rows = sqlx::query("SELECT day FROM holidays WHERE day >= ? AND day <= ? ORDER BY day")
            .bind(from.to_string())
            .bind(to.to_string())
            .fetch_all(&self.pool)
            .await?;
        rows.into_iter()
            .map(|row| parse_date(&row.try_get::<String, _>("day")?).map_err(CampusError::from))
            .collect()
    }

    // ---- leads ----

    pub async fn insert_lead(&self, lead: &Lead) -> Result<(), CampusError> {
        sqlx::query(
            r#"INSERT INTO leads (id, name, email, locale, message, consent, created_at)
               VALUES (?, ?, ?, ?, ?, ?, ?)"#,
        )
        .bind(&lead.id)
        .bind(&lead.name)
        .bind(&lead.email)
        .bind(&lead.locale)
        .bind(&lead.message)
        .bind(if lead.consent { 1 } else { 0 })
        .bind(lead.created_at.to_rfc3339())
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    pub async fn leads_by_email(&self, email: &str) -> Result<Vec<Lead>, CampusError> {
        let rows = sqlx::query(
            r#"SELECT id, name, email, locale, message, consent, created_at
               FROM leads WHERE email = ? ORDER BY created_at"#,
        )
        .bind(email)
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter()
            .map(|row| {
                Ok(Lead {
                    id: row.try_get("id")?,
                    name: row.try_get("name")?,
                    email: row.try_get("email")?,
                    locale: row.try_get("locale")?,
                    message: row.try_get("message")?,
                    consent: row.try_get::<i64, _>("consent")? != 0,
                    created_at: parse_dt(&row.try_get::<String, _>("created_at")?)?,
                })
            })
            .collect()
    }

    pub async fn count_leads(&self) -> Result<i64, CampusError> {
        let rec: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM leads")
            .fetch_one(&self.pool)
            .await?;
        Ok(rec.0)
    }
}

const SESSION_SELECT: &str = r#"SELECT id, subscription_id, student_id, teacher_id, scheduled_at,
       duration_minutes, status, meet_link, teacher_notes, reminder_sent_at
FROM sessions"#;

fn parse_dt(s: &str) -> Result<DateTime<Utc>, sqlx::Error> {
    chrono::DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| sqlx::Error::Decode(Box::new(e)))
}

fn parse_date(s: &str) -> Result<NaiveDate, sqlx::Error> {
    NaiveDate::from_str(s).map_err(|e| sqlx::Error::Decode(Box::new(e)))
}

fn row_to_profile(row: SqliteRow) -> Result<Profile, CampusError> {
    let role_s: String = row.try_get("role")?;
    let role = Role::from_str(&role_s).map_err(|e| sqlx::Error::Decode(e.into()))?;
    Ok(Profile {
        id: row.try_get("id")?,
        role,
        full_name: row.try_get("full_name")?,
        email: row.try_get("email")?,
        password_hash: row.try_get("password_hash")?,
        created_at: parse_dt(&row.try_get::<String, _>("created_at")?)?,
    })
}

fn row_to_package(row: SqliteRow) -> Result<Package, CampusError> {
    Ok(Package {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        sessions_per_month: row.try_get("sessions_per_month")?,
        monthly_price_cents: row.try_get("monthly_price_cents")?,
        price_id_1m: row.try_get("price_id_1m")?,
        price_id_3m: row.try_get("price_id_3m")?,
        price_id_6m: row.try_get("price_id_6m")?,
        active: row.try_get::<i64, _>("active")? != 0,
    })
}

fn row_to_subscription(row: SqliteRow) -> Result<Subscription, CampusError> {
    let status_s: String = row.try_get("status")?;
    let status =
        SubscriptionStatus::from_str(&status_s).map_err(|e| sqlx::Error::Decode(e.into()))?;
    Ok(Subscription {
        id: row.try_get("id")?,
        student_id: row.try_get("student_id")?,
        package_id: row.try_get("package_id")?,
        status,
        duration_months: row.try_get("duration_months")?,
        starts_at: parse_date(&row.try_get::<String, _>("starts_at")?)?,
        ends_at: parse_date(&row.try_get::<String, _>("ends_at")?)?,
        sessions_total: row.try_get("sessions_total")?,
        sessions_used: row.try_get("sessions_used")?,
    })
}

fn row_to_session(row: SqliteRow) -> Result<Session, CampusError> {
    let status_s: String = row.try_get("status")?;
    let status = SessionStatus::from_str(&status_s).map_err(|e| sqlx::Error::Decode(e.into()))?;
    let reminder_sent_at = match row.try_get::<Option<String>, _>("reminder_sent_at")? {
        Some(s) => Some(parse_dt(&s)?),
        None => None,
    };
    Ok(Session {
        id: row.try_get("id")?,
        subscription_id: row.try_get("subscription_id")?,
        student_id: row.try_get("student_id")?,
        teacher_id: row.try_get("teacher_id")?,
        scheduled_at: parse_dt(&row.try_get::<String, _>("scheduled_at")?)?,
        duration_minutes: row.try_get("duration_minutes")?,
        status,
        meet_link: row.try_get("meet_link")?,
        teacher_notes: row.try_get("teacher_notes")?,
        reminder_sent_at,
    })
}
