//! Diesel models representing contacts.

use chrono::NaiveDate;
use diesel::prelude::*;

use crate::domain::contact::{
    Contact as DomainContact, NewContact as DomainNewContact, UpdateContact as DomainUpdateContact,
};
use crate::domain::types::{
    ContactId, ContactNote, EmailAddress, PersonName, PhoneNumber, TypeConstraintError, UserId,
};
use crate::models::user::User;

#[derive(Debug, Clone, Identifiable, Queryable, Selectable, Associations)]
#[diesel(table_name = crate::schema::contacts)]
#[diesel(belongs_to(User, foreign_key = user_id))]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
/// Diesel model for [`crate::domain::contact::Contact`].
pub struct Contact {
    pub id: i32,
    pub name: String,
    pub surname: String,
    pub email: String,
    pub phone_number: String,
    pub birthday: Option<NaiveDate>,
    pub additional_info: Option<String>,
    pub user_id: i32,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::contacts)]
/// Insertable form of [`Contact`].
pub struct NewContact<'a> {
    pub name: &'a str,
    pub surname: &'a str,
    pub email: &'a str,
    pub phone_number: &'a str,
    pub birthday: Option<NaiveDate>,
    pub additional_info: Option<&'a str>,
    pub user_id: i32,
    pub name_search: String,
    pub surname_search: String,
}

#[derive(AsChangeset)]
#[diesel(table_name = crate::schema::contacts)]
/// Data used when updating a [`Contact`] record. Only `Some` fields are written.
pub struct UpdateContact<'a> {
    pub name: Option<&'a str>,
    pub surname: Option<&'a str>,
    pub email: Option<&'a str>,
    pub phone_number: Option<&'a str>,
    pub birthday: Option<Option<NaiveDate>>,
    pub additional_info: Option<Option<&'a str>>,
    pub name_search: Option<String>,
    pub surname_search: Option<String>,
}

impl TryFrom<Contact> for DomainContact {
    type Error = TypeConstraintError;

    fn try_from(contact: Contact) -> Result<Self, Self::Error> {
        Ok(Self {
            id: ContactId::try_from(contact.id)?,
            name: PersonName::new(contact.name)?,
            surname: PersonName::new(contact.surname)?,
            email: EmailAddress::new(contact.email)?,
            phone_number: PhoneNumber::new(contact.phone_number)?,
            birthday: contact.birthday,
            additional_info: contact.additional_info.map(ContactNote::new).transpose()?,
            user_id: UserId::try_from(contact.user_id)?,
        })
    }
}

impl<'a> From<&'a DomainNewContact> for NewContact<'a> {
    fn from(contact: &'a DomainNewContact) -> Self {
        Self {
            name: contact.name.as_str(),
            surname: contact.surname.as_str(),
            email: contact.email.as_str(),
            phone_number: contact.phone_number.as_str(),
            birthday: contact.birthday,
            additional_info: contact.additional_info.as_ref().map(ContactNote::as_str),
            user_id: contact.user_id.get(),
            name_search: contact.name.search_key(),
            surname_search: contact.surname.search_key(),
        }
    }
}

impl<'a> From<&'a DomainUpdateContact> for UpdateContact<'a> {
    fn from(update: &'a DomainUpdateContact) -> Self {
        Self {
            name: update.name.as_ref().map(PersonName::as_str),
            surname: update.surname.as_ref().map(PersonName::as_str),
            email: update.email.as_ref().map(EmailAddress::as_str),
            phone_number: update.phone_number.as_ref().map(PhoneNumber::as_str),
            birthday: update.birthday,
            additional_info: update
                .additional_info
                .as_ref()
                .map(|note| note.as_ref().map(ContactNote::as_str)),
            name_search: update.name.as_ref().map(PersonName::search_key),
            surname_search: update.surname.as_ref().map(PersonName::search_key),
        }
    }
}
