use crate::{
    repositories::shifts::ShiftApi,
    services::{
        form::{FieldError, FormSubmission, ShiftForm, ShiftFormValues},
        sessions::SessionHandle,
    },
    structs::{
        shifts::{Shift, ShiftFields, ShiftId},
        ui::{Severity, Snackbar},
    },
};

/// 樂觀刪除時留下的資料，失敗時放回原位
#[derive(Debug, Clone)]
pub struct PendingDelete {
    pub id: ShiftId,
    pub index: usize,
    pub shift: Shift,
}

/// 畫面狀態：shift 清單、表單、刪除確認框與 snackbar
#[derive(Debug, Default)]
pub struct ShiftDesk {
    shifts: Vec<Shift>,
    current_shift: Option<Shift>,
    is_editing: bool,
    delete_id: Option<ShiftId>,
    is_dialog_open: bool,
    is_form_visible: bool,
    snackbar: Snackbar,
    form: ShiftForm,
}

impl ShiftDesk {
    pub fn shifts(&self) -> &[Shift] {
        &self.shifts
    }

    pub fn current_shift(&self) -> Option<&Shift> {
        self.current_shift.as_ref()
    }

    pub fn is_editing(&self) -> bool {
        self.is_editing
    }

    pub fn delete_id(&self) -> Option<&ShiftId> {
        self.delete_id.as_ref()
    }

    pub fn is_dialog_open(&self) -> bool {
        self.is_dialog_open
    }

    pub fn is_form_visible(&self) -> bool {
        self.is_form_visible
    }

    pub fn snackbar(&self) -> &Snackbar {
        &self.snackbar
    }

    pub fn form(&self) -> &ShiftForm {
        &self.form
    }

    pub fn form_mut(&mut self) -> &mut ShiftForm {
        &mut self.form
    }

    fn position(&self, id: &ShiftId) -> Option<usize> {
        self.shifts.iter().position(|shift| &shift.id == id)
    }

    pub fn show_snackbar(&mut self, message: &str, severity: Severity) {
        self.snackbar = Snackbar {
            open: true,
            message: message.to_string(),
            severity,
        };
    }

    pub fn close_snackbar(&mut self) {
        self.snackbar.open = false;
    }

    /// 只顯示一次的訊息，取出後即關閉
    pub fn take_snackbar(&mut self) -> Option<Snackbar> {
        if !self.snackbar.open {
            return None;
        }
        let snackbar = self.snackbar.clone();
        self.close_snackbar();
        Some(snackbar)
    }

    /// 載入成功，重複的 `_id` 只留第一筆
    pub fn replace_all(&mut self, shifts: Vec<Shift>) {
        let mut unique: Vec<Shift> = Vec::with_capacity(shifts.len());
        for shift in shifts {
            if !unique.iter().any(|kept| kept.id == shift.id) {
                unique.push(shift);
            }
        }
        self.shifts = unique;
        self.show_snackbar("Shifts fetched successfully", Severity::Success);
    }

    pub fn load_failed(&mut self) {
        self.show_snackbar("Failed to fetch shifts", Severity::Error);
    }

    /// 先放一筆暫用 id 的資料進清單
    pub fn begin_create(&mut self, fields: ShiftFields) -> ShiftId {
        let temp_id = ShiftId::temporary();
        self.shifts.push(Shift::new(temp_id.clone(), fields));
        temp_id
    }

    pub fn commit_create(&mut self, temp_id: &ShiftId, saved: Shift) {
        let temp_index = self.position(temp_id);

        if self.position(&saved.id).is_some() {
            // 清單已經有這筆（例如期間重新載入過），丟掉暫用列
            if let Some(index) = temp_index {
                self.shifts.remove(index);
            }
        } else if let Some(index) = temp_index {
            self.shifts[index] = saved;
        } else {
            self.shifts.push(saved);
        }

        self.show_snackbar("Shift added successfully", Severity::Success);
        self.reset_form();
        self.is_form_visible = false;
    }

    pub fn rollback_create(&mut self, temp_id: &ShiftId) {
        self.shifts.retain(|shift| &shift.id != temp_id);
        self.show_snackbar("Failed to add shift", Severity::Error);
    }

    /// 進入編輯模式；找不到或仍在新增中的列不處理
    pub fn edit(&mut self, id: &ShiftId) -> bool {
        if id.is_temporary() {
            return false;
        }
        let Some(shift) = self.shifts.iter().find(|shift| &shift.id == id).cloned() else {
            return false;
        };

        self.form.sync(true, Some(&shift));
        self.current_shift = Some(shift);
        self.is_editing = true;
        self.is_form_visible = true;
        true
    }

    /// 先替換本地資料，回傳原本的版本
    pub fn begin_update(&mut self, shift: Shift) -> Option<Shift> {
        let index = self.position(&shift.id)?;
        Some(std::mem::replace(&mut self.shifts[index], shift))
    }

    pub fn commit_update(&mut self, id: &ShiftId, saved: Shift) {
        match self.position(id) {
            Some(index) => self.shifts[index] = saved,
            None => {
                if self.position(&saved.id).is_none() {
                    self.shifts.push(saved);
                }
            }
        }

        self.reset_form();
        self.show_snackbar("Shift updated successfully", Severity::Success);
        self.is_form_visible = false;
    }

    pub fn rollback_update(&mut self, previous: Shift) {
        if let Some(index) = self.position(&previous.id) {
            self.shifts[index] = previous;
        }
        // 仍在編輯模式，把輸入值還給表單
        if self.is_editing {
            self.form.sync(true, self.current_shift.as_ref());
        }
        self.show_snackbar("Failed to update shift", Severity::Error);
    }

    pub fn update_failed(&mut self) {
        self.show_snackbar("Failed to update shift", Severity::Error);
    }

    /// 打開刪除確認框
    pub fn request_delete(&mut self, id: &ShiftId) -> bool {
        if id.is_temporary() || self.position(id).is_none() {
            return false;
        }
        self.delete_id = Some(id.clone());
        self.is_dialog_open = true;
        true
    }

    pub fn cancel_delete(&mut self) {
        self.is_dialog_open = false;
        self.delete_id = None;
    }

    /// 先從清單拿掉並關閉確認框
    pub fn begin_delete(&mut self) -> Option<PendingDelete> {
        let id = self.delete_id.take()?;
        self.is_dialog_open = false;

        let index = self.position(&id)?;
        let shift = self.shifts.remove(index);
        Some(PendingDelete { id, index, shift })
    }

    pub fn commit_delete(&mut self, pending: &PendingDelete) {
        if self.current_shift.as_ref().map(|shift| &shift.id) == Some(&pending.id) {
            self.reset_form();
            self.is_form_visible = false;
        }
        self.show_snackbar("Shift deleted successfully", Severity::Success);
    }

    pub fn rollback_delete(&mut self, pending: PendingDelete) {
        if self.position(&pending.id).is_none() {
            let index = pending.index.min(self.shifts.len());
            self.shifts.insert(index, pending.shift);
        }
        self.show_snackbar("Failed to delete shift", Severity::Error);
    }

    pub fn reset_form(&mut self) {
        self.is_editing = false;
        self.current_shift = None;
        self.form.sync(false, None);
    }

    pub fn toggle_form(&mut self) {
        self.is_form_visible = !self.is_form_visible;
        if self.is_editing {
            self.reset_form();
        }
    }
}

/// 向後端取清單
pub async fn load_shifts(session: &SessionHandle, api: &dyn ShiftApi) {
    let token = session.lock().await.api_token();

    let result = api.read_shifts(token.as_deref()).await;

    let mut session = session.lock().await;
    session.loaded = true;
    match result {
        Ok(shifts) => {
            tracing::debug!("loaded {} shifts", shifts.len());
            session.desk.replace_all(shifts);
        }
        Err(_) => session.desk.load_failed(),
    }
}

pub async fn add_shift(session: &SessionHandle, api: &dyn ShiftApi, fields: ShiftFields) {
    let (temp_id, token) = {
        let mut session = session.lock().await;
        (session.desk.begin_create(fields.clone()), session.api_token())
    };

    let result = api.create_shift(token.as_deref(), &fields).await;

    let mut session = session.lock().await;
    match result {
        Ok(saved) => {
            tracing::info!("shift {} created", saved.id);
            session.desk.commit_create(&temp_id, saved);
        }
        Err(_) => session.desk.rollback_create(&temp_id),
    }
}

pub async fn update_shift(session: &SessionHandle, api: &dyn ShiftApi, shift: Shift) {
    let id = shift.id.clone();
    let (previous, token) = {
        let mut session = session.lock().await;
        (session.desk.begin_update(shift.clone()), session.api_token())
    };

    let Some(previous) = previous else {
        tracing::debug!("shift {} is no longer listed", id);
        session.lock().await.desk.update_failed();
        return;
    };

    let result = api.update_shift(token.as_deref(), &id, &shift).await;

    let mut session = session.lock().await;
    match result {
        Ok(saved) => {
            tracing::info!("shift {} updated", id);
            session.desk.commit_update(&id, saved);
        }
        Err(_) => session.desk.rollback_update(previous),
    }
}

pub async fn confirm_delete(session: &SessionHandle, api: &dyn ShiftApi) {
    let (pending, token) = {
        let mut session = session.lock().await;
        (session.desk.begin_delete(), session.api_token())
    };

    let Some(pending) = pending else {
        return;
    };

    let result = api.delete_shift(token.as_deref(), &pending.id).await;

    let mut session = session.lock().await;
    match result {
        Ok(()) => {
            tracing::info!("shift {} deleted", pending.id);
            session.desk.commit_delete(&pending);
        }
        Err(_) => session.desk.rollback_delete(pending),
    }
}

/// 表單送出：依模式新增或更新
pub async fn submit_form(
    session: &SessionHandle,
    api: &dyn ShiftApi,
    values: ShiftFormValues,
) -> Result<(), Vec<FieldError>> {
    let submission = {
        let mut session = session.lock().await;
        let form = session.desk.form_mut();
        form.apply(values);
        form.submit()?
    };

    match submission {
        FormSubmission::Add(fields) => add_shift(session, api, fields).await,
        FormSubmission::Update(shift) => update_shift(session, api, shift).await,
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        errors::AppError,
        services::sessions::Session,
        structs::shifts::Status,
    };
    use async_trait::async_trait;
    use axum::http::StatusCode;
    use std::sync::{
        atomic::{AtomicBool, AtomicUsize, Ordering},
        Arc,
    };
    use tokio::sync::{Mutex, Semaphore};

    fn fields(location: &str) -> ShiftFields {
        ShiftFields {
            location: location.to_string(),
            date: "2024-07-01".to_string(),
            start_time: "08:00".to_string(),
            end_time: "12:00".to_string(),
            status: Status::InProgress,
            ..ShiftFields::default()
        }
    }

    fn listed(id: &str, location: &str) -> Shift {
        Shift::new(ShiftId::new(id), fields(location))
    }

    fn desk_with(shifts: Vec<Shift>) -> ShiftDesk {
        let mut desk = ShiftDesk::default();
        desk.replace_all(shifts);
        desk.close_snackbar();
        desk
    }

    #[derive(Default)]
    struct FakeApi {
        fail: AtomicBool,
        created: AtomicUsize,
        tokens: std::sync::Mutex<Vec<Option<String>>>,
        gate: Option<Semaphore>,
    }

    impl FakeApi {
        fn failing() -> Self {
            FakeApi {
                fail: AtomicBool::new(true),
                ..FakeApi::default()
            }
        }

        fn gated() -> Self {
            FakeApi {
                gate: Some(Semaphore::new(0)),
                ..FakeApi::default()
            }
        }

        async fn outcome(&self, token: Option<&str>) -> Result<(), AppError> {
            self.tokens.lock().unwrap().push(token.map(str::to_string));
            if let Some(gate) = &self.gate {
                gate.acquire().await.unwrap().forget();
            }
            if self.fail.load(Ordering::SeqCst) {
                return Err(AppError::UpstreamStatus(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "boom".to_string(),
                ));
            }
            Ok(())
        }
    }

    #[async_trait]
    impl ShiftApi for FakeApi {
        async fn create_shift(&self, token: Option<&str>, fields: &ShiftFields) -> Result<Shift, AppError> {
            self.outcome(token).await?;
            let n = self.created.fetch_add(1, Ordering::SeqCst);
            Ok(Shift::new(ShiftId::new(format!("srv-{}", n)), fields.clone()))
        }

        async fn read_shifts(&self, token: Option<&str>) -> Result<Vec<Shift>, AppError> {
            self.outcome(token).await?;
            Ok(vec![listed("a", "North"), listed("b", "South")])
        }

        async fn update_shift(
            &self,
            token: Option<&str>,
            _id: &ShiftId,
            shift: &Shift,
        ) -> Result<Shift, AppError> {
            self.outcome(token).await?;
            Ok(shift.clone())
        }

        async fn delete_shift(&self, token: Option<&str>, _id: &ShiftId) -> Result<(), AppError> {
            self.outcome(token).await
        }
    }

    fn session_with(shifts: Vec<Shift>) -> SessionHandle {
        let mut session = Session::default();
        session.desk = desk_with(shifts);
        Arc::new(Mutex::new(session))
    }

    #[test]
    fn create_commit_replaces_temporary_row() {
        let mut desk = desk_with(vec![listed("a", "North")]);
        desk.toggle_form();

        let temp = desk.begin_create(fields("East"));
        assert_eq!(desk.shifts().len(), 2);
        assert!(desk.shifts()[1].id.is_temporary());

        desk.commit_create(&temp, listed("c", "East"));

        let ids: Vec<_> = desk.shifts().iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "c"]);
        assert!(!desk.is_form_visible());
        assert_eq!(desk.snackbar().message, "Shift added successfully");
    }

    #[test]
    fn create_commit_never_duplicates_ids() {
        let mut desk = desk_with(vec![]);
        let temp = desk.begin_create(fields("East"));
        desk.replace_all(vec![listed("c", "East")]);

        desk.commit_create(&temp, listed("c", "East"));

        assert_eq!(desk.shifts().len(), 1);
        assert_eq!(desk.shifts()[0].id.as_str(), "c");
    }

    #[test]
    fn create_rollback_removes_row() {
        let mut desk = desk_with(vec![listed("a", "North")]);
        let temp = desk.begin_create(fields("East"));

        desk.rollback_create(&temp);

        assert_eq!(desk.shifts().len(), 1);
        assert_eq!(desk.snackbar().severity, Severity::Error);
        assert_eq!(desk.snackbar().message, "Failed to add shift");
    }

    #[test]
    fn load_drops_duplicate_ids() {
        let mut desk = ShiftDesk::default();
        desk.replace_all(vec![listed("a", "North"), listed("a", "Copy"), listed("b", "South")]);

        assert_eq!(desk.shifts().len(), 2);
        assert_eq!(desk.shifts()[0].fields.location, "North");
        assert_eq!(desk.take_snackbar().unwrap().message, "Shifts fetched successfully");
        assert!(desk.take_snackbar().is_none());
    }

    #[test]
    fn edit_and_toggle() {
        let mut desk = desk_with(vec![listed("a", "North")]);

        assert!(!desk.edit(&ShiftId::new("missing")));
        assert!(desk.edit(&ShiftId::new("a")));
        assert!(desk.is_editing());
        assert!(desk.is_form_visible());
        assert_eq!(desk.form().values().location, "North");

        desk.toggle_form();
        assert!(!desk.is_form_visible());
        assert!(!desk.is_editing());
        assert!(desk.current_shift().is_none());
        assert_eq!(desk.form().title(), "Add Shift");
    }

    #[test]
    fn temporary_rows_cannot_be_edited_or_deleted() {
        let mut desk = desk_with(vec![]);
        let temp = desk.begin_create(fields("East"));

        assert!(!desk.edit(&temp));
        assert!(!desk.request_delete(&temp));
        assert!(!desk.is_dialog_open());
    }

    #[test]
    fn update_rollback_restores_previous_version() {
        let mut desk = desk_with(vec![listed("a", "North")]);
        desk.edit(&ShiftId::new("a"));

        let previous = desk.begin_update(listed("a", "Moved")).unwrap();
        assert_eq!(desk.shifts()[0].fields.location, "Moved");

        desk.rollback_update(previous);
        assert_eq!(desk.shifts()[0].fields.location, "North");
        assert!(desk.is_editing());
        assert_eq!(desk.form().values().location, "North");
        assert_eq!(desk.snackbar().message, "Failed to update shift");
    }

    #[test]
    fn delete_dialog_flow() {
        let mut desk = desk_with(vec![listed("a", "North"), listed("b", "South"), listed("c", "West")]);

        assert!(desk.request_delete(&ShiftId::new("b")));
        assert!(desk.is_dialog_open());
        desk.cancel_delete();
        assert!(!desk.is_dialog_open());
        assert!(desk.delete_id().is_none());
        assert!(desk.begin_delete().is_none());

        desk.request_delete(&ShiftId::new("b"));
        let pending = desk.begin_delete().unwrap();
        assert!(!desk.is_dialog_open());
        assert_eq!(desk.shifts().len(), 2);

        desk.rollback_delete(pending);
        let ids: Vec<_> = desk.shifts().iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b", "c"]);
        assert_eq!(desk.snackbar().message, "Failed to delete shift");
    }

    #[test]
    fn deleting_the_edited_shift_leaves_edit_mode() {
        let mut desk = desk_with(vec![listed("a", "North")]);
        desk.edit(&ShiftId::new("a"));
        desk.request_delete(&ShiftId::new("a"));

        let pending = desk.begin_delete().unwrap();
        desk.commit_delete(&pending);

        assert!(desk.shifts().is_empty());
        assert!(!desk.is_editing());
        assert_eq!(desk.snackbar().message, "Shift deleted successfully");
    }

    #[tokio::test]
    async fn load_marks_session_loaded() {
        let session = session_with(vec![]);
        load_shifts(&session, &FakeApi::default()).await;

        let session = session.lock().await;
        assert!(session.loaded);
        assert_eq!(session.desk.shifts().len(), 2);

        let failing = session_with(vec![]);
        load_shifts(&failing, &FakeApi::failing()).await;
        let failing = failing.lock().await;
        assert!(failing.loaded);
        assert_eq!(failing.desk.snackbar().message, "Failed to fetch shifts");
    }

    #[tokio::test]
    async fn optimistic_row_is_visible_while_request_is_in_flight() {
        let session = session_with(vec![listed("a", "North")]);
        let api = Arc::new(FakeApi::gated());

        let task = {
            let session = session.clone();
            let api = api.clone();
            tokio::spawn(async move { add_shift(&session, api.as_ref(), fields("East")).await })
        };

        let mut seen_pending = false;
        for _ in 0..100 {
            {
                let session = session.lock().await;
                if session.desk.shifts().len() == 2 {
                    seen_pending = session.desk.shifts()[1].id.is_temporary();
                    break;
                }
            }
            tokio::task::yield_now().await;
        }
        assert!(seen_pending);

        api.gate.as_ref().unwrap().add_permits(1);
        task.await.unwrap();

        let session = session.lock().await;
        assert_eq!(session.desk.shifts()[1].id.as_str(), "srv-0");
    }

    #[tokio::test]
    async fn failed_requests_roll_back() {
        let session = session_with(vec![listed("a", "North"), listed("b", "South")]);
        let api = FakeApi::failing();

        add_shift(&session, &api, fields("East")).await;
        update_shift(&session, &api, listed("a", "Moved")).await;
        session.lock().await.desk.request_delete(&ShiftId::new("b"));
        confirm_delete(&session, &api).await;

        let session = session.lock().await;
        let locations: Vec<_> = session
            .desk
            .shifts()
            .iter()
            .map(|s| s.fields.location.as_str())
            .collect();
        assert_eq!(locations, vec!["North", "South"]);
        assert_eq!(session.desk.snackbar().message, "Failed to delete shift");
    }

    #[tokio::test]
    async fn submit_form_updates_in_edit_mode_with_session_token() {
        let session = session_with(vec![listed("a", "North")]);
        session.lock().await.desk.edit(&ShiftId::new("a"));
        let api = FakeApi::default();

        let mut values = session.lock().await.desk.form().values().clone();
        values.location = "Relocated".to_string();
        submit_form(&session, &api, values).await.unwrap();

        let guard = session.lock().await;
        assert_eq!(guard.desk.shifts()[0].fields.location, "Relocated");
        assert!(!guard.desk.is_editing());
        assert!(!guard.desk.is_form_visible());
        assert_eq!(guard.desk.snackbar().message, "Shift updated successfully");
        assert_eq!(api.tokens.lock().unwrap().as_slice(), &[None]);
    }

    #[tokio::test]
    async fn invalid_submission_does_not_call_the_api() {
        let session = session_with(vec![]);
        let api = FakeApi::default();

        let errors = submit_form(&session, &api, ShiftFormValues::default())
            .await
            .unwrap_err();

        assert!(!errors.is_empty());
        assert!(api.tokens.lock().unwrap().is_empty());
        assert!(session.lock().await.desk.shifts().is_empty());
    }
}
