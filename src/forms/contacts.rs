//! Forms for creating, updating and querying contacts.

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer};
use validator::Validate;

use crate::domain::contact::{NewContact, UpdateContact};
use crate::domain::types::{ContactNote, EmailAddress, PersonName, PhoneNumber, UserId};
use crate::forms::{FormError, trimmed, trimmed_opt};
use crate::repository::DEFAULT_CONTACTS_LIMIT;

/// Largest look-ahead accepted by the upcoming birthdays query.
pub const MAX_BIRTHDAY_WINDOW_DAYS: u32 = 366;

/// Distinguishes an absent field (`None`) from an explicit `null` (`Some(None)`).
fn nullable<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// Empty or whitespace-only notes are stored as `NULL`.
fn parse_note(value: Option<String>) -> Result<Option<ContactNote>, FormError> {
    match value {
        Some(text) if !text.trim().is_empty() => ContactNote::new(text)
            .map(Some)
            .map_err(|_| FormError::InvalidAdditionalInfo),
        _ => Ok(None),
    }
}

#[derive(Debug, Deserialize, Validate)]
/// JSON body of `POST /contacts/`.
pub struct ContactForm {
    #[validate(length(min = 1, max = 50))]
    pub name: String,
    #[validate(length(min = 1, max = 50))]
    pub surname: String,
    #[serde(deserialize_with = "trimmed")]
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 1, max = 25))]
    pub phone_number: String,
    #[serde(default)]
    pub birthday: Option<NaiveDate>,
    #[serde(default)]
    pub additional_info: Option<String>,
}

/// Validated contact data awaiting an owner.
#[derive(Debug)]
pub struct ContactPayload {
    pub name: PersonName,
    pub surname: PersonName,
    pub email: EmailAddress,
    pub phone_number: PhoneNumber,
    pub birthday: Option<NaiveDate>,
    pub additional_info: Option<ContactNote>,
}

impl TryFrom<ContactForm> for ContactPayload {
    type Error = FormError;

    fn try_from(form: ContactForm) -> Result<Self, Self::Error> {
        form.validate()?;

        Ok(Self {
            name: PersonName::new(form.name).map_err(|_| FormError::InvalidName)?,
            surname: PersonName::new(form.surname).map_err(|_| FormError::InvalidSurname)?,
            email: EmailAddress::new(form.email).map_err(|_| FormError::InvalidEmail)?,
            phone_number: PhoneNumber::new(form.phone_number)
                .map_err(|_| FormError::InvalidPhoneNumber)?,
            birthday: form.birthday,
            additional_info: parse_note(form.additional_info)?,
        })
    }
}

impl ContactPayload {
    pub fn into_domain(self, user_id: UserId) -> NewContact {
        NewContact {
            name: self.name,
            surname: self.surname,
            email: self.email,
            phone_number: self.phone_number,
            birthday: self.birthday,
            additional_info: self.additional_info,
            user_id,
        }
    }
}

#[derive(Debug, Default, Deserialize, Validate)]
/// JSON body of `PATCH /contacts/{id}`. Only present fields are changed.
pub struct ContactPatchForm {
    #[validate(length(min = 1, max = 50))]
    pub name: Option<String>,
    #[validate(length(min = 1, max = 50))]
    pub surname: Option<String>,
    #[serde(default, deserialize_with = "trimmed_opt")]
    #[validate(email)]
    pub email: Option<String>,
    #[validate(length(min = 1, max = 25))]
    pub phone_number: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub birthday: Option<Option<NaiveDate>>,
    #[serde(default, deserialize_with = "nullable")]
    pub additional_info: Option<Option<String>>,
}

impl TryFrom<ContactPatchForm> for UpdateContact {
    type Error = FormError;

    fn try_from(form: ContactPatchForm) -> Result<Self, Self::Error> {
        form.validate()?;

        Ok(Self {
            name: form
                .name
                .map(PersonName::new)
                .transpose()
                .map_err(|_| FormError::InvalidName)?,
            surname: form
                .surname
                .map(PersonName::new)
                .transpose()
                .map_err(|_| FormError::InvalidSurname)?,
            email: form
                .email
                .map(EmailAddress::new)
                .transpose()
                .map_err(|_| FormError::InvalidEmail)?,
            phone_number: form
                .phone_number
                .map(PhoneNumber::new)
                .transpose()
                .map_err(|_| FormError::InvalidPhoneNumber)?,
            birthday: form.birthday,
            additional_info: form.additional_info.map(parse_note).transpose()?,
        })
    }
}

fn default_limit() -> i64 {
    DEFAULT_CONTACTS_LIMIT
}

#[derive(Debug, Deserialize)]
/// Query string of `GET /contacts/`.
pub struct ContactListParams {
    #[serde(default)]
    pub skip: i64,
    #[serde(default = "default_limit")]
    pub limit: i64,
    #[serde(default)]
    pub query: Option<String>,
}

impl Default for ContactListParams {
    fn default() -> Self {
        Self {
            skip: 0,
            limit: DEFAULT_CONTACTS_LIMIT,
            query: None,
        }
    }
}

fn default_days() -> u32 {
    7
}

#[derive(Debug, Deserialize)]
/// Query string of `GET /contacts/upcoming_birthdays/`.
pub struct BirthdaysParams {
    #[serde(default = "default_days")]
    pub days: u32,
}

impl BirthdaysParams {
    pub fn window(&self) -> Result<u32, FormError> {
        if self.days > MAX_BIRTHDAY_WINDOW_DAYS {
            return Err(FormError::InvalidDays(MAX_BIRTHDAY_WINDOW_DAYS));
        }
        Ok(self.days)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form() -> ContactForm {
        ContactForm {
            name: "Jane".into(),
            surname: "Doe".into(),
            email: "Jane@Example.com".into(),
            phone_number: "+1 415 555 2671".into(),
            birthday: NaiveDate::from_ymd_opt(1990, 5, 17),
            additional_info: Some("  ".into()),
        }
    }

    #[test]
    fn contact_form_is_normalized() {
        let payload = ContactPayload::try_from(form()).unwrap();
        assert_eq!(payload.email.as_str(), "jane@example.com");
        assert_eq!(payload.phone_number.as_str(), "+14155552671");
        assert!(payload.additional_info.is_none());
    }

    #[test]
    fn padded_email_is_accepted() {
        let form: ContactForm = serde_json::from_value(serde_json::json!({
            "name": "Jane",
            "surname": "Doe",
            "email": " jane@example.com ",
            "phone_number": "+1 415 555 2671",
        }))
        .unwrap();
        let payload = ContactPayload::try_from(form).unwrap();
        assert_eq!(payload.email.as_str(), "jane@example.com");

        let patch: ContactPatchForm =
            serde_json::from_value(serde_json::json!({ "email": " Jane@Example.com " })).unwrap();
        let update = UpdateContact::try_from(patch).unwrap();
        assert_eq!(update.email.unwrap().as_str(), "jane@example.com");
    }

    #[test]
    fn contact_form_rejects_long_name() {
        let mut form = form();
        form.name = "n".repeat(51);
        assert!(matches!(
            ContactPayload::try_from(form),
            Err(FormError::Validation(_))
        ));
    }

    #[test]
    fn contact_form_rejects_bad_phone() {
        let mut form = form();
        form.phone_number = "call me".into();
        assert!(matches!(
            ContactPayload::try_from(form),
            Err(FormError::InvalidPhoneNumber)
        ));
    }

    #[test]
    fn patch_distinguishes_null_from_missing() {
        let form: ContactPatchForm =
            serde_json::from_str(r#"{"surname": "Smith", "birthday": null}"#).unwrap();
        let update = UpdateContact::try_from(form).unwrap();

        assert_eq!(update.surname.unwrap().as_str(), "Smith");
        assert_eq!(update.birthday, Some(None));
        assert!(update.additional_info.is_none());
        assert!(update.name.is_none());
    }

    #[test]
    fn list_params_default_when_absent() {
        let params: ContactListParams = serde_json::from_str("{}").unwrap();
        assert_eq!(params.skip, 0);
        assert_eq!(params.limit, DEFAULT_CONTACTS_LIMIT);
        assert!(params.query.is_none());
    }

    #[test]
    fn birthday_window_is_bounded() {
        assert_eq!(BirthdaysParams { days: 7 }.window().unwrap(), 7);
        assert!(BirthdaysParams { days: 400 }.window().is_err());
    }
}
