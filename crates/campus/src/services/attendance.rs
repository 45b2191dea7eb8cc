//! Attendance clock-in and record management.

use std::sync::Arc;

use uuid::Uuid;

use campus_core::clock::Clock;
use campus_core::school::{
    day_window, validate_attendance, AttendanceRecord, CreateAttendanceRequest, Geofence,
    ServiceError, ServiceResult, UpdateAttendanceRequest,
};
use campus_core::storage::{
    AttendanceRepository, ListQuery, Page, RepositoryError, UserRepository,
};

use super::require_user;

pub const ALREADY_CLOCKED_IN: &str = "already clocked in today";

#[derive(Clone)]
pub struct AttendanceService {
    users: Arc<dyn UserRepository>,
    attendance: Arc<dyn AttendanceRepository>,
    clock: Arc<dyn Clock>,
    geofence: Geofence,
}

impl AttendanceService {
    pub fn new(
        users: Arc<dyn UserRepository>,
        attendance: Arc<dyn AttendanceRepository>,
        clock: Arc<dyn Clock>,
        geofence: Geofence,
    ) -> Self {
        Self {
            users,
            attendance,
            clock,
            geofence,
        }
    }

    /// Records today's attendance for `user_id`.
    ///
    /// `recorder_id` is the staff member recording on the user's behalf, if
    /// any. A user gets at most one record per local calendar day, and
    /// on-site roles must be inside the geofence.
    pub async fn create(
        &self,
        user_id: Uuid,
        recorder_id: Option<Uuid>,
        request: CreateAttendanceRequest,
    ) -> ServiceResult<AttendanceRecord> {
        let now = self.clock.now_local();
        let record = request.into_record(user_id, recorder_id, now);
        validate_attendance(&record)?;

        if let Some(recorder_id) = recorder_id {
            require_user(self.users.as_ref(), recorder_id).await?;
        }
        let user = require_user(self.users.as_ref(), user_id).await?;

        let (start, end) = day_window(now);
        if self
            .attendance
            .find_attendance_in_window(user_id, start, end)
            .await?
            .is_some()
        {
            tracing::warn!(user_id = %user_id, "Attendance already recorded today");
            return Err(ServiceError::Conflict(ALREADY_CLOCKED_IN.to_string()));
        }

        if user.role.requires_on_site() {
            self.geofence.check(record.latitude, record.longitude)?;
        }

        // A concurrent clock-in can still slip past the window check; the
        // storage uniqueness constraint settles it.
        match self.attendance.create_attendance(&record).await {
            Ok(()) => {}
            Err(RepositoryError::AlreadyExists { .. }) => {
                return Err(ServiceError::Conflict(ALREADY_CLOCKED_IN.to_string()));
            }
            Err(err) => return Err(err.into()),
        }

        tracing::info!(
            attendance_id = %record.id,
            user_id = %user_id,
            status = %record.status,
            "Attendance recorded"
        );
        Ok(record)
    }

    pub async fn get(&self, id: Uuid) -> ServiceResult<AttendanceRecord> {
        self.attendance
            .get_attendance(id)
            .await?
            .ok_or_else(|| ServiceError::not_found("AttendanceRecord", id))
    }

    pub async fn list(
        &self,
        user_id: Uuid,
        query: &ListQuery,
    ) -> ServiceResult<Page<AttendanceRecord>> {
        query.validate()?;
        require_user(self.users.as_ref(), user_id).await?;
        Ok(self.attendance.list_attendance(user_id, query).await?)
    }

    pub async fn update(
        &self,
        id: Uuid,
        request: UpdateAttendanceRequest,
    ) -> ServiceResult<AttendanceRecord> {
        let mut record = self.get(id).await?;
        request.apply_to(&mut record);
        validate_attendance(&record)?;

        self.attendance.update_attendance(&record).await?;
        Ok(record)
    }

    pub async fn delete(&self, id: Uuid) -> ServiceResult<AttendanceRecord> {
        let record = self.get(id).await?;
        self.attendance.delete_attendance(&record).await?;
        Ok(record)
    }
}
