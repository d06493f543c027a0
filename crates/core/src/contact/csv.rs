//! CSV import/export for contacts.
//!
//! Format: `phone,name,message,enabled` with `enabled` as `1`/`0`. Lines
//! starting with `#` are treated as comments and skipped on import.

use super::{Contact, ContactError, NewContact};

/// Parse contacts from CSV data.
///
/// Rows without a phone number are skipped, matching the import behavior of
/// the dashboard: a half-filled row is ignored rather than rejected.
pub fn parse_contacts(data: &str) -> Result<Vec<NewContact>, ContactError> {
    let filtered: String = data
        .lines()
        .filter(|line| {
            let trimmed = line.trim_start();
            !trimmed.is_empty() && !trimmed.starts_with('#')
        })
        .collect::<Vec<_>>()
        .join("\n");

    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(filtered.as_bytes());

    let headers = reader
        .headers()
        .map_err(|e| ContactError::InvalidCsv(e.to_string()))?
        .clone();
    let column = |name: &str| headers.iter().position(|h| h.eq_ignore_ascii_case(name));

    let phone_idx = column("phone")
        .ok_or_else(|| ContactError::InvalidCsv("missing 'phone' column".to_string()))?;
    let name_idx = column("name");
    let message_idx = column("message");
    let enabled_idx = column("enabled");

    let mut contacts = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|e| ContactError::InvalidCsv(e.to_string()))?;
        let phone = record.get(phone_idx).unwrap_or("").trim();
        if phone.is_empty() {
            continue;
        }
        let field = |idx: Option<usize>| {
            idx.and_then(|i| record.get(i))
                .unwrap_or("")
                .trim()
                .to_string()
        };
        let enabled = match enabled_idx.and_then(|i| record.get(i)) {
            Some(value) => value.trim() == "1",
            None => true,
        };
        contacts.push(NewContact {
            phone: phone.to_string(),
            name: field(name_idx),
            message: field(message_idx),
            enabled,
        });
    }

    Ok(contacts)
}

/// Render contacts as CSV with the import-compatible column set.
pub fn render_contacts(contacts: &[Contact]) -> Result<String, ContactError> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer
        .write_record(["phone", "name", "message", "enabled"])
        .map_err(|e| ContactError::InvalidCsv(e.to_string()))?;
    for contact in contacts {
        writer
            .write_record([
                contact.phone.as_str(),
                contact.name.as_str(),
                contact.message.as_str(),
                if contact.enabled { "1" } else { "0" },
            ])
            .map_err(|e| ContactError::InvalidCsv(e.to_string()))?;
    }
    let bytes = writer
        .into_inner()
        .map_err(|e| ContactError::InvalidCsv(e.to_string()))?;
    String::from_utf8(bytes).map_err(|e| ContactError::InvalidCsv(e.to_string()))
}
