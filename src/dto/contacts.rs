use chrono::NaiveDate;
use serde::Serialize;

use crate::domain::contact::Contact;

/// Public view of a contact.
#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct ContactResponse {
    pub id: i32,
    pub name: String,
    pub surname: String,
    pub email: String,
    pub phone_number: String,
    pub birthday: Option<NaiveDate>,
    pub additional_info: Option<String>,
}

impl From<Contact> for ContactResponse {
    fn from(contact: Contact) -> Self {
        Self {
            id: contact.id.get(),
            name: contact.name.into_inner(),
            surname: contact.surname.into_inner(),
            email: contact.email.into_inner(),
            phone_number: contact.phone_number.into_inner(),
            birthday: contact.birthday,
            additional_info: contact.additional_info.map(String::from),
        }
    }
}

/// Body of `GET /contacts/upcoming_birthdays/`.
#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct BirthdaysResponse {
    pub message: &'static str,
    pub contacts: Vec<ContactResponse>,
}

impl BirthdaysResponse {
    pub fn new(contacts: Vec<ContactResponse>) -> Self {
        let message = if contacts.is_empty() {
            "No birthdays this week"
        } else {
            "Birthdays this week"
        };
        Self { message, contacts }
    }
}
