use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use uuid::Uuid;

const TEMP_PREFIX: &str = "tmp-";

/// 後端給的 `_id`，可能是字串或數字
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "RawShiftId", into = "String")]
pub struct ShiftId(String);

#[derive(Deserialize)]
#[serde(untagged)]
enum RawShiftId {
    Text(String),
    Number(i64),
}

impl From<RawShiftId> for ShiftId {
    fn from(raw: RawShiftId) -> Self {
        match raw {
            RawShiftId::Text(text) => ShiftId(text),
            RawShiftId::Number(number) => ShiftId(number.to_string()),
        }
    }
}

impl From<ShiftId> for String {
    fn from(id: ShiftId) -> Self {
        id.0
    }
}

impl ShiftId {
    pub fn new(id: impl Into<String>) -> Self {
        ShiftId(id.into())
    }

    /// 樂觀新增時暫用的 id，等後端回應後替換
    pub fn temporary() -> Self {
        ShiftId(format!("{}{}", TEMP_PREFIX, Uuid::new_v4()))
    }

    pub fn is_temporary(&self) -> bool {
        self.0.starts_with(TEMP_PREFIX)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ShiftId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum MapStaff {
    Yes,
    #[default]
    No,
}

impl MapStaff {
    pub const ALL: [MapStaff; 2] = [MapStaff::Yes, MapStaff::No];

    pub fn as_str(&self) -> &'static str {
        match self {
            MapStaff::Yes => "Yes",
            MapStaff::No => "No",
        }
    }
}

impl From<String> for MapStaff {
    fn from(value: String) -> Self {
        match value.trim().to_lowercase().as_str() {
            "yes" | "true" => MapStaff::Yes,
            _ => MapStaff::No,
        }
    }
}

impl From<MapStaff> for String {
    fn from(value: MapStaff) -> Self {
        value.as_str().to_string()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Gender {
    Male,
    Female,
    Other,
    #[default]
    NotApplicable,
    Unrecognized(String),
}

impl Gender {
    pub const OPTIONS: [Gender; 4] = [
        Gender::Male,
        Gender::Female,
        Gender::Other,
        Gender::NotApplicable,
    ];

    pub fn as_str(&self) -> &str {
        match self {
            Gender::Male => "Male",
            Gender::Female => "Female",
            Gender::Other => "Other",
            Gender::NotApplicable => "N/A",
            Gender::Unrecognized(value) => value,
        }
    }

    /// 下拉選單顯示文字
    pub fn label(&self) -> &str {
        match self {
            Gender::NotApplicable => "Not Applicable",
            other => other.as_str(),
        }
    }
}

impl From<String> for Gender {
    fn from(value: String) -> Self {
        match value.as_str() {
            "Male" => Gender::Male,
            "Female" => Gender::Female,
            "Other" => Gender::Other,
            // 舊資料預設值是 "N/a"
            "N/A" | "N/a" | "" => Gender::NotApplicable,
            _ => Gender::Unrecognized(value),
        }
    }
}

impl From<Gender> for String {
    fn from(value: Gender) -> Self {
        match value {
            Gender::Unrecognized(value) => value,
            other => other.as_str().to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Status {
    #[default]
    Unset,
    AssignedToCoordinator,
    AddedToConnecteam,
    InProgress,
    ShiftCompleted,
    Other(String),
}

impl Status {
    pub const OPTIONS: [Status; 4] = [
        Status::AssignedToCoordinator,
        Status::AddedToConnecteam,
        Status::InProgress,
        Status::ShiftCompleted,
    ];

    pub fn as_str(&self) -> &str {
        match self {
            Status::Unset => "",
            Status::AssignedToCoordinator => "Assigned To Coordinator",
            Status::AddedToConnecteam => "Added to Connecteam",
            Status::InProgress => "In Progress",
            Status::ShiftCompleted => "Shift Completed",
            Status::Other(value) => value,
        }
    }

    /// 是否為四種正式狀態之一
    pub fn is_known(&self) -> bool {
        !matches!(self, Status::Unset | Status::Other(_))
    }
}

impl From<String> for Status {
    fn from(value: String) -> Self {
        match value.as_str() {
            "" => Status::Unset,
            "Assigned To Coordinator" => Status::AssignedToCoordinator,
            "Added to Connecteam" => Status::AddedToConnecteam,
            "In Progress" => Status::InProgress,
            "Shift Completed" => Status::ShiftCompleted,
            _ => Status::Other(value),
        }
    }
}

impl From<Status> for String {
    fn from(value: Status) -> Self {
        match value {
            Status::Other(value) => value,
            other => other.as_str().to_string(),
        }
    }
}

/// 可編輯的欄位，也是新增時送給後端的 payload
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ShiftFields {
    #[serde(deserialize_with = "lenient_text")]
    pub location: String,
    #[serde(deserialize_with = "lenient_text")]
    pub date: String,
    #[serde(deserialize_with = "lenient_text")]
    pub start_time: String,
    #[serde(deserialize_with = "lenient_text")]
    pub end_time: String,
    #[serde(deserialize_with = "lenient_text")]
    pub map_staff: MapStaff,
    #[serde(deserialize_with = "lenient_text")]
    pub gender: Gender,
    #[serde(deserialize_with = "lenient_text")]
    pub message: String,
    #[serde(deserialize_with = "lenient_text")]
    pub coordinator: String,
    #[serde(deserialize_with = "lenient_text")]
    pub assigned: String,
    #[serde(deserialize_with = "lenient_text")]
    pub status: Status,
}

/// 舊資料可能是 null、數字或布林，一律先轉成字串
fn lenient_text<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: From<String>,
{
    let text = match Value::deserialize(deserializer)? {
        Value::Null => String::new(),
        Value::String(text) => text,
        other => other.to_string(),
    };
    Ok(T::from(text))
}

/// RFC 3339 字串或 epoch 毫秒；其他格式當作沒有
fn lenient_timestamp<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let at = match Value::deserialize(deserializer)? {
        Value::String(text) => DateTime::parse_from_rfc3339(text.trim())
            .ok()
            .map(|at| at.with_timezone(&Utc)),
        Value::Number(number) => number.as_i64().and_then(DateTime::<Utc>::from_timestamp_millis),
        _ => None,
    };
    Ok(at)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Shift {
    #[serde(rename = "_id")]
    pub id: ShiftId,
    #[serde(flatten)]
    pub fields: ShiftFields,
    #[serde(
        rename = "createdAt",
        default,
        deserialize_with = "lenient_timestamp",
        skip_serializing_if = "Option::is_none"
    )]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(
        rename = "updatedAt",
        default,
        deserialize_with = "lenient_timestamp",
        skip_serializing_if = "Option::is_none"
    )]
    pub updated_at: Option<DateTime<Utc>>,
    /// 後端多給的欄位（例如 `__v`），更新時原樣送回
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl Shift {
    pub fn new(id: ShiftId, fields: ShiftFields) -> Self {
        Shift {
            id,
            fields,
            created_at: None,
            updated_at: None,
            extra: serde_json::Map::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn reads_server_document_with_extras() {
        let shift: Shift = serde_json::from_value(json!({
            "_id": "65a1f0c2e4b0a1b2c3d4e5f6",
            "location": "Central Station",
            "date": "2024-03-01",
            "start_time": "08:00",
            "end_time": "16:00",
            "map_staff": "Yes",
            "gender": "N/a",
            "message": "need two people",
            "coordinator": "Sam",
            "assigned": "Alex",
            "status": "In Progress",
            "createdAt": "2024-02-28T09:15:00.000Z",
            "__v": 0
        }))
        .unwrap();

        assert_eq!(shift.id.as_str(), "65a1f0c2e4b0a1b2c3d4e5f6");
        assert_eq!(shift.fields.map_staff, MapStaff::Yes);
        assert_eq!(shift.fields.gender, Gender::NotApplicable);
        assert_eq!(shift.fields.status, Status::InProgress);
        assert!(shift.created_at.is_some());
        assert_eq!(shift.extra.get("__v"), Some(&json!(0)));

        let back = serde_json::to_value(&shift).unwrap();
        assert_eq!(back["_id"], "65a1f0c2e4b0a1b2c3d4e5f6");
        assert_eq!(back["gender"], "N/A");
        assert_eq!(back["__v"], 0);
    }

    #[test]
    fn tolerates_numeric_ids_and_missing_fields() {
        let shift: Shift = serde_json::from_value(json!({ "_id": 42, "location": "Depot" })).unwrap();

        assert_eq!(shift.id, ShiftId::new("42"));
        assert_eq!(shift.fields.location, "Depot");
        assert_eq!(shift.fields.status, Status::Unset);
        assert_eq!(shift.fields.map_staff, MapStaff::No);
    }

    #[test]
    fn odd_records_do_not_break_the_list() {
        let shifts: Vec<Shift> = serde_json::from_value(json!([
            { "_id": "a", "location": "Dock", "map_staff": true, "createdAt": 1709301900000i64 },
            { "_id": "b", "location": "Yard", "message": null, "gender": null, "status": null },
            { "_id": "c", "location": "Gate", "map_staff": false, "createdAt": "last tuesday" },
            { "_id": "d", "location": "Hall", "map_staff": "YES", "assigned": 12 }
        ]))
        .unwrap();

        assert_eq!(shifts.len(), 4);

        assert_eq!(shifts[0].fields.map_staff, MapStaff::Yes);
        assert_eq!(
            shifts[0].created_at,
            DateTime::<Utc>::from_timestamp_millis(1709301900000)
        );

        assert_eq!(shifts[1].fields.message, "");
        assert_eq!(shifts[1].fields.gender, Gender::NotApplicable);
        assert_eq!(shifts[1].fields.status, Status::Unset);

        assert_eq!(shifts[2].fields.map_staff, MapStaff::No);
        assert_eq!(shifts[2].created_at, None);

        assert_eq!(shifts[3].fields.map_staff, MapStaff::Yes);
        assert_eq!(shifts[3].fields.assigned, "12");
    }

    #[test]
    fn keeps_unknown_labels() {
        let status = Status::from("Cancelled".to_string());
        assert_eq!(status, Status::Other("Cancelled".to_string()));
        assert!(!status.is_known());
        assert_eq!(String::from(status), "Cancelled");

        let gender = Gender::from("Any".to_string());
        assert_eq!(gender.as_str(), "Any");
    }

    #[test]
    fn temporary_ids_are_unique() {
        let a = ShiftId::temporary();
        let b = ShiftId::temporary();
        assert!(a.is_temporary());
        assert_ne!(a, b);
        assert!(!ShiftId::new("65a1f0c2e4b0a1b2c3d4e5f6").is_temporary());
    }
}
