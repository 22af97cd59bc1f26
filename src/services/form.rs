use chrono::{NaiveDate, NaiveTime};
use serde::Deserialize;

use crate::structs::shifts::{Gender, MapStaff, Shift, ShiftFields, Status};

/// 表單輸入框的原始值
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ShiftFormValues {
    pub location: String,
    pub date: String,
    pub start_time: String,
    pub end_time: String,
    pub map_staff: String,
    pub gender: String,
    pub message: String,
    pub coordinator: String,
    pub assigned: String,
    pub status: String,
}

impl Default for ShiftFormValues {
    fn default() -> Self {
        ShiftFormValues {
            location: String::new(),
            date: String::new(),
            start_time: String::new(),
            end_time: String::new(),
            map_staff: MapStaff::No.as_str().to_string(),
            gender: Gender::NotApplicable.as_str().to_string(),
            message: String::new(),
            coordinator: String::new(),
            assigned: String::new(),
            status: String::new(),
        }
    }
}

impl From<&ShiftFields> for ShiftFormValues {
    fn from(fields: &ShiftFields) -> Self {
        ShiftFormValues {
            location: fields.location.clone(),
            // 後端可能給完整時間戳，日期欄只要前 10 碼
            date: date_part(&fields.date).to_string(),
            start_time: fields.start_time.clone(),
            end_time: fields.end_time.clone(),
            map_staff: fields.map_staff.as_str().to_string(),
            gender: fields.gender.as_str().to_string(),
            message: fields.message.clone(),
            coordinator: fields.coordinator.clone(),
            assigned: fields.assigned.clone(),
            status: fields.status.as_str().to_string(),
        }
    }
}

fn date_part(date: &str) -> &str {
    match date.get(..10) {
        Some(prefix) if NaiveDate::parse_from_str(prefix, "%Y-%m-%d").is_ok() => prefix,
        _ => date,
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum FormMode {
    Create,
    Edit(Shift),
}

#[derive(Debug, Clone, PartialEq)]
pub enum FormSubmission {
    Add(ShiftFields),
    Update(Shift),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

impl FieldError {
    fn new(field: &'static str, message: &str) -> Self {
        FieldError {
            field,
            message: message.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ShiftForm {
    values: ShiftFormValues,
    mode: FormMode,
    errors: Vec<FieldError>,
}

impl Default for ShiftForm {
    fn default() -> Self {
        ShiftForm {
            values: ShiftFormValues::default(),
            mode: FormMode::Create,
            errors: Vec::new(),
        }
    }
}

impl ShiftForm {
    pub fn values(&self) -> &ShiftFormValues {
        &self.values
    }

    pub fn errors(&self) -> &[FieldError] {
        &self.errors
    }

    pub fn error_for(&self, field: &str) -> Option<&str> {
        self.errors
            .iter()
            .find(|err| err.field == field)
            .map(|err| err.message.as_str())
    }

    pub fn is_editing(&self) -> bool {
        matches!(self.mode, FormMode::Edit(_))
    }

    pub fn title(&self) -> &'static str {
        if self.is_editing() {
            "Edit Shift"
        } else {
            "Add Shift"
        }
    }

    pub fn submit_label(&self) -> &'static str {
        if self.is_editing() {
            "Update Shift"
        } else {
            "Add Shift"
        }
    }

    /// 依外部的編輯狀態重設表單
    pub fn sync(&mut self, is_editing: bool, current: Option<&Shift>) {
        self.errors.clear();
        match (is_editing, current) {
            (true, Some(shift)) => {
                self.values = ShiftFormValues::from(&shift.fields);
                self.mode = FormMode::Edit(shift.clone());
            }
            _ => {
                self.values = ShiftFormValues::default();
                self.mode = FormMode::Create;
            }
        }
    }

    /// 依欄位名稱改單一欄位
    pub fn handle_change(&mut self, name: &str, value: impl Into<String>) -> bool {
        let slot = match name {
            "location" => &mut self.values.location,
            "date" => &mut self.values.date,
            "start_time" => &mut self.values.start_time,
            "end_time" => &mut self.values.end_time,
            "map_staff" => &mut self.values.map_staff,
            "gender" => &mut self.values.gender,
            "message" => &mut self.values.message,
            "coordinator" => &mut self.values.coordinator,
            "assigned" => &mut self.values.assigned,
            "status" => &mut self.values.status,
            _ => return false,
        };
        *slot = value.into();
        true
    }

    pub fn apply(&mut self, values: ShiftFormValues) {
        self.values = values;
    }

    pub fn reset(&mut self) {
        self.values = ShiftFormValues::default();
        self.errors.clear();
    }

    /// 驗證後產生送出內容並清空欄位；驗證失敗時保留輸入
    pub fn submit(&mut self) -> Result<FormSubmission, Vec<FieldError>> {
        // 編輯時，原資料上的非正式狀態可以原樣保留
        let kept_status = match &self.mode {
            FormMode::Edit(current) => Some(&current.fields.status),
            FormMode::Create => None,
        };

        let fields = match validate(&self.values, kept_status) {
            Ok(fields) => fields,
            Err(errors) => {
                self.errors = errors.clone();
                return Err(errors);
            }
        };

        let submission = match &self.mode {
            FormMode::Create => FormSubmission::Add(fields),
            FormMode::Edit(current) => FormSubmission::Update(Shift {
                fields,
                ..current.clone()
            }),
        };

        self.reset();
        Ok(submission)
    }
}

fn validate(values: &ShiftFormValues, kept_status: Option<&Status>) -> Result<ShiftFields, Vec<FieldError>> {
    let mut errors = Vec::new();

    if values.location.trim().is_empty() {
        errors.push(FieldError::new("location", "Location is required"));
    }

    if values.date.trim().is_empty() {
        errors.push(FieldError::new("date", "Date is required"));
    } else if NaiveDate::parse_from_str(values.date.trim(), "%Y-%m-%d").is_err() {
        errors.push(FieldError::new("date", "Date must be YYYY-MM-DD"));
    }

    for (field, value, label) in [
        ("start_time", &values.start_time, "Start Time"),
        ("end_time", &values.end_time, "End Time"),
    ] {
        if value.trim().is_empty() {
            errors.push(FieldError {
                field,
                message: format!("{} is required", label),
            });
        } else if NaiveTime::parse_from_str(value.trim(), "%H:%M").is_err() {
            errors.push(FieldError {
                field,
                message: format!("{} must be HH:MM", label),
            });
        }
    }

    let status = Status::from(values.status.clone());
    if !status.is_known() && (status == Status::Unset || kept_status != Some(&status)) {
        errors.push(FieldError::new("status", "Choose a status"));
    }

    if !errors.is_empty() {
        return Err(errors);
    }

    Ok(ShiftFields {
        location: values.location.trim().to_string(),
        date: values.date.trim().to_string(),
        start_time: values.start_time.trim().to_string(),
        end_time: values.end_time.trim().to_string(),
        map_staff: MapStaff::from(values.map_staff.clone()),
        gender: Gender::from(values.gender.clone()),
        message: values.message.clone(),
        coordinator: values.coordinator.trim().to_string(),
        assigned: values.assigned.trim().to_string(),
        status,
    })
}
