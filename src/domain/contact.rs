use chrono::{Datelike, NaiveDate};
use serde::Serialize;

use crate::domain::types::{ContactId, ContactNote, EmailAddress, PersonName, PhoneNumber, UserId};

/// Address book entry owned by a single user.
#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct Contact {
    pub id: ContactId,
    pub name: PersonName,
    pub surname: PersonName,
    pub email: EmailAddress,
    pub phone_number: PhoneNumber,
    pub birthday: Option<NaiveDate>,
    pub additional_info: Option<ContactNote>,
    #[serde(skip_serializing)]
    pub user_id: UserId,
}

impl Contact {
    /// Number of days from `today` until the next occurrence of the birthday,
    /// `0` when the birthday is today. `None` when no birthday is recorded.
    pub fn days_until_birthday(&self, today: NaiveDate) -> Option<i64> {
        let birthday = self.birthday?;
        let this_year = anniversary_in(birthday, today.year())?;
        let next = if this_year < today {
            anniversary_in(birthday, today.year() + 1)?
        } else {
            this_year
        };
        Some((next - today).num_days())
    }

    /// Whether the next birthday falls within `days` days from `today`, inclusive.
    pub fn has_birthday_within(&self, today: NaiveDate, days: u32) -> bool {
        self.days_until_birthday(today)
            .is_some_and(|until| (0..=i64::from(days)).contains(&until))
    }
}

/// Date the birthday is celebrated in `year`. February 29 falls back to
/// February 28 in non-leap years.
fn anniversary_in(birthday: NaiveDate, year: i32) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(year, birthday.month(), birthday.day())
        .or_else(|| NaiveDate::from_ymd_opt(year, 2, 28))
}

/// Data required to create a contact.
#[derive(Clone, Debug)]
pub struct NewContact {
    pub name: PersonName,
    pub surname: PersonName,
    pub email: EmailAddress,
    pub phone_number: PhoneNumber,
    pub birthday: Option<NaiveDate>,
    pub additional_info: Option<ContactNote>,
    pub user_id: UserId,
}

/// Partial update of a contact. `None` leaves the field untouched; for the
/// nullable fields `Some(None)` clears the stored value.
#[derive(Clone, Debug, Default)]
pub struct UpdateContact {
    pub name: Option<PersonName>,
    pub surname: Option<PersonName>,
    pub email: Option<EmailAddress>,
    pub phone_number: Option<PhoneNumber>,
    pub birthday: Option<Option<NaiveDate>>,
    pub additional_info: Option<Option<ContactNote>>,
}

impl UpdateContact {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.surname.is_none()
            && self.email.is_none()
            && self.phone_number.is_none()
            && self.birthday.is_none()
            && self.additional_info.is_none()
    }
}
