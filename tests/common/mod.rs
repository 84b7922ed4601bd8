#![allow(dead_code)]

use serde_json::{json, Value};

pub fn email(subject: &str, correct: &str) -> Value {
    json!({
        "subject": subject,
        "from": "it-support@company.com",
        "to": ["employee@company.com"],
        "desc": "Hi Team,\n\nPlease review the attached notice.\n\nBest regards,\nIT Support",
        "correct": correct,
        "explain": format!("{subject}: check the sender domain and the link targets.")
    })
}

/// A data file with `n` valid pairs plus one broken group.
pub fn data_file(n: usize) -> Value {
    let mut doc = serde_json::Map::new();
    for i in 1..=n {
        doc.insert(
            format!("email_group_{i}"),
            json!([email(&format!("Safe {i}"), "safe"), email(&format!("Phish {i}"), "phish")]),
        );
    }
    doc.insert(
        format!("email_group_{}", n + 1),
        json!([email("Broken", "safe"), email("Broken", "safe")]),
    );
    doc.insert("last_updated_emails".into(), json!("2025-01-01T00:00:00.000Z"));
    Value::Object(doc)
}
