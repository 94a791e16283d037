use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// 試算表的一列：欄位名稱對應儲存格內容，保留原始欄位順序
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub data: Map<String, Value>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, column: &str) -> Option<&Value> {
        self.data.get(column)
    }

    pub fn insert(&mut self, column: impl Into<String>, value: Value) {
        self.data.insert(column.into(), value);
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn customer_id(&self) -> Option<&Value> {
        self.get("CustomerId")
    }

    /// 日誌中顯示用的客戶編號
    pub fn customer_id_label(&self) -> String {
        match self.customer_id() {
            Some(Value::String(s)) => s.clone(),
            Some(other) => other.to_string(),
            None => "undefined".to_string(),
        }
    }
}

impl<K: Into<String>> FromIterator<(K, Value)> for Record {
    fn from_iter<I: IntoIterator<Item = (K, Value)>>(iter: I) -> Self {
        Self {
            data: iter.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }
}

/// Body of the contact-creation request.
///
/// Pass-through fields are `None` when the source cell was absent and are then
/// left out of the JSON body entirely. Numeric fields always serialize, as
/// `null` when the source could not be read as an integer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContactPayload {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<Value>,
    pub mobile: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<Value>,
    pub custom_fields: CustomFields,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CustomFields {
    pub customer_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub village: Option<Value>,
    pub pincode: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub district: Option<Value>,
    pub client_age: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kyc_1: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id_1: Option<Value>,
    // CRM 端的欄位名稱就是 kcy_2
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kcy_2: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id_2: Option<Value>,
    pub gender: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dob: Option<Value>,
    pub marital_status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub father_spouse_name: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nominee_name: Option<Value>,
    pub nominee_age: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nominee_kyc_id: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub center_name: Option<Value>,
    pub center_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group_name: Option<Value>,
    pub group_id: Option<i64>,
    pub staff_id: Option<i64>,
    pub house_hold_exp: Option<i64>,
    pub household_income: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bank_account_number: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bank_name: Option<Value>,
}

/// 遠端建立聯絡人的結果，只依 HTTP 狀態碼判斷
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncOutcome {
    Created { status: u16 },
    Rejected { status: u16 },
}

impl SyncOutcome {
    pub fn from_status(status: u16) -> Self {
        if (200..300).contains(&status) {
            SyncOutcome::Created { status }
        } else {
            SyncOutcome::Rejected { status }
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, SyncOutcome::Created { .. })
    }

    pub fn status(&self) -> u16 {
        match self {
            SyncOutcome::Created { status } | SyncOutcome::Rejected { status } => *status,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimeEntry {
    pub file_name: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl fmt::Display for TimeEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "File: {}, Start Time: {}, End Time: {}",
            self.file_name,
            self.start.to_rfc3339_opts(SecondsFormat::Millis, true),
            self.end.to_rfc3339_opts(SecondsFormat::Millis, true)
        )
    }
}

/// Summary of one batch run.
///
/// `failed_at_file` is set when a file-level error stopped the run; that file
/// stays in the upload folder together with every file listed after it.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BatchReport {
    pub processed_files: Vec<String>,
    pub skipped_files: Vec<String>,
    pub rows_succeeded: usize,
    pub rows_failed: usize,
    pub rows_errored: usize,
    pub failed_at_file: Option<String>,
    pub error: Option<String>,
}

impl BatchReport {
    pub fn is_complete(&self) -> bool {
        self.error.is_none()
    }

    pub fn rows_processed(&self) -> usize {
        self.rows_succeeded + self.rows_failed + self.rows_errored
    }
}
