use crate::core::Record;
use crate::domain::model::{ContactPayload, CustomFields};
use serde_json::Value;

/// Maps one spreadsheet row onto the CRM contact body.
pub fn transform_record(row: &Record) -> ContactPayload {
    let text = |column: &str| row.get(column).cloned();
    let int = |column: &str| row.get(column).and_then(parse_integer);

    ContactPayload {
        address: text("address"),
        mobile: int("MobileNo"),
        name: text("CustomerName"),
        custom_fields: CustomFields {
            customer_id: int("CustomerId"),
            village: text("village"),
            pincode: int("PinCode"),
            state: text("State"),
            district: text("District"),
            client_age: int("ClientAge"),
            kyc_1: text("kyc_1"),
            id_1: text("Id_1"),
            kcy_2: text("Kyc_2"),
            id_2: text("Id_2"),
            gender: gender_label(row.get("Gender")).to_string(),
            dob: text("DateOfBirth"),
            marital_status: marital_status_label(row.get("MaritalStatus")).to_string(),
            father_spouse_name: text("FatherSpouseName"),
            nominee_name: text("NomineeName"),
            nominee_age: int("NomineeAge"),
            nominee_kyc_id: text("NomineeKycId"),
            center_name: text("CenterName"),
            center_id: int("CenterId"),
            group_name: text("GroupName"),
            group_id: int("GroupId"),
            staff_id: int("StaffId"),
            house_hold_exp: int("HouseholdExp"),
            household_income: int("HouseholdIncome"),
            bank_account_number: text("BankAccountNumber"),
            bank_name: text("BankName"),
        },
    }
}

pub fn gender_label(code: Option<&Value>) -> &'static str {
    match code.and_then(Value::as_str) {
        Some("M") => "Male",
        Some("F") => "Female",
        _ => "",
    }
}

pub fn marital_status_label(code: Option<&Value>) -> &'static str {
    match code.and_then(Value::as_str) {
        Some("M") => "Married",
        Some("W") => "Widow",
        Some("S") => "Single",
        _ => "",
    }
}

/// Reads a cell as an integer.
///
/// Numbers are truncated toward zero. Text is read the lenient way the
/// upstream exports need: leading whitespace and an optional sign, then the
/// leading run of digits ("12abc" is 12, "3.7" is 3). Anything without a
/// leading digit, or out of `i64` range, is `None`.
///
/// Zero counts as missing, so `"0"`, `0` and `"-0"` are all `None`.
pub fn parse_integer(value: &Value) -> Option<i64> {
    let parsed = match value {
        Value::Number(n) => n.as_i64().or_else(|| {
            n.as_f64()
                .filter(|f| f.is_finite() && f.abs() < i64::MAX as f64)
                .map(|f| f.trunc() as i64)
        }),
        Value::String(s) => parse_integer_prefix(s),
        _ => None,
    };
    parsed.filter(|n| *n != 0)
}

fn parse_integer_prefix(text: &str) -> Option<i64> {
    let trimmed = text.trim_start();
    let (negative, rest) = match trimmed.as_bytes().first() {
        Some(b'-') => (true, &trimmed[1..]),
        Some(b'+') => (false, &trimmed[1..]),
        _ => (false, trimmed),
    };

    let digits_len = rest.bytes().take_while(u8::is_ascii_digit).count();
    if digits_len == 0 {
        return None;
    }

    let magnitude: i64 = rest[..digits_len].parse().ok()?;
    Some(if negative { -magnitude } else { magnitude })
}
