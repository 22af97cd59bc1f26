use chrono::{DateTime, NaiveDate, Utc};

use crate::structs::shifts::{Shift, ShiftId};

pub const COLUMNS: [&str; 14] = [
    "Shift ID",
    "Location",
    "Date",
    "Start Time",
    "End Time",
    "Map Staff",
    "Gender",
    "Original Message",
    "Date Received",
    "Time Received",
    "Coordinator",
    "Assigned To",
    "Status",
    "Actions",
];

/// 表格中的一列，欄位都已格式化
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShiftRow {
    pub number: usize,
    pub id: ShiftId,
    pub location: String,
    pub date: String,
    pub start_time: String,
    pub end_time: String,
    pub map_staff: String,
    pub gender: String,
    pub message: String,
    pub date_received: String,
    pub time_received: String,
    pub coordinator: String,
    pub assigned: String,
    pub status: String,
    /// 還在等後端回應的樂觀新增列
    pub pending: bool,
}

pub struct ShiftTable;

impl ShiftTable {
    pub fn rows(shifts: &[Shift]) -> Vec<ShiftRow> {
        shifts
            .iter()
            .enumerate()
            .map(|(index, shift)| ShiftRow {
                number: index + 1,
                id: shift.id.clone(),
                location: shift.fields.location.clone(),
                date: format_date(&shift.fields.date),
                start_time: shift.fields.start_time.clone(),
                end_time: shift.fields.end_time.clone(),
                map_staff: shift.fields.map_staff.as_str().to_string(),
                gender: shift.fields.gender.as_str().to_string(),
                message: shift.fields.message.clone(),
                date_received: shift
                    .created_at
                    .map(|at| at.format("%m/%d/%Y").to_string())
                    .unwrap_or_default(),
                time_received: shift
                    .created_at
                    .map(|at| at.format("%-I:%M %p").to_string())
                    .unwrap_or_default(),
                coordinator: shift.fields.coordinator.clone(),
                assigned: shift.fields.assigned.clone(),
                status: shift.fields.status.as_str().to_string(),
                pending: shift.id.is_temporary(),
            })
            .collect()
    }
}

/// 日期統一顯示成 YYYY-MM-DD，無法解析就原樣顯示
fn format_date(raw: &str) -> String {
    let raw = raw.trim();
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return date.format("%Y-%m-%d").to_string();
    }
    if let Ok(at) = DateTime::parse_from_rfc3339(raw) {
        return at.with_timezone(&Utc).format("%Y-%m-%d").to_string();
    }
    raw.to_string()
}
