//! Fixture builders for tests.

use crate::contact::NewContact;

/// An enabled contact with no message override.
pub fn contact(phone: &str, name: &str) -> NewContact {
    NewContact {
        phone: phone.to_string(),
        name: name.to_string(),
        message: String::new(),
        enabled: true,
    }
}

/// A contact with a per-contact message override.
pub fn contact_with_message(phone: &str, name: &str, message: &str) -> NewContact {
    NewContact {
        message: message.to_string(),
        ..contact(phone, name)
    }
}

/// A disabled contact.
pub fn disabled_contact(phone: &str, name: &str) -> NewContact {
    NewContact {
        enabled: false,
        ..contact(phone, name)
    }
}

/// `count` enabled contacts with sequential phone numbers.
pub fn contacts(count: usize) -> Vec<NewContact> {
    (0..count)
        .map(|i| contact(&format!("+8150111100{i:02}"), &format!("Contact {i}")))
        .collect()
}
