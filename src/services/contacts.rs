//! Contact book services. Every operation is scoped to the calling user.

use chrono::NaiveDate;

use crate::domain::contact::UpdateContact;
use crate::domain::types::ContactId;
use crate::domain::user::User;
use crate::dto::contacts::{BirthdaysResponse, ContactResponse};
use crate::forms::contacts::{
    BirthdaysParams, ContactForm, ContactListParams, ContactPatchForm, ContactPayload,
};
use crate::repository::errors::RepositoryError;
use crate::repository::{ContactListQuery, ContactReader, ContactWriter};
use crate::services::{ServiceError, ServiceResult};

fn not_found() -> ServiceError {
    ServiceError::NotFound("Contact not found".to_string())
}

fn duplicate(err: RepositoryError) -> ServiceError {
    match err {
        RepositoryError::ConstraintViolation(_) => ServiceError::Conflict(
            "Contact with this email or phone number already exists".to_string(),
        ),
        other => other.into(),
    }
}

/// Identifiers that cannot exist are reported like missing contacts.
fn contact_id(id: i32) -> ServiceResult<ContactId> {
    ContactId::new(id).map_err(|_| not_found())
}

/// Lists the user's contacts ordered by id, optionally filtered by `query`.
pub fn list_contacts<R>(
    repo: &R,
    user: &User,
    params: ContactListParams,
) -> ServiceResult<Vec<ContactResponse>>
where
    R: ContactReader + ?Sized,
{
    let mut query = ContactListQuery::new(user.id).window(params.skip, params.limit);
    if let Some(term) = params.query.filter(|term| !term.trim().is_empty()) {
        query = query.search(term.trim());
    }

    let contacts = repo.list_contacts(query)?;

    Ok(contacts.into_iter().map(ContactResponse::from).collect())
}

pub fn get_contact<R>(repo: &R, user: &User, id: i32) -> ServiceResult<ContactResponse>
where
    R: ContactReader + ?Sized,
{
    repo.get_contact_by_id(contact_id(id)?, user.id)?
        .map(ContactResponse::from)
        .ok_or_else(not_found)
}

pub fn create_contact<R>(repo: &R, user: &User, form: ContactForm) -> ServiceResult<ContactResponse>
where
    R: ContactWriter + ?Sized,
{
    let payload = ContactPayload::try_from(form)?;
    let new_contact = payload.into_domain(user.id);

    let contact = repo.create_contact(&new_contact).map_err(duplicate)?;
    log::info!("User {} created contact {}", user.id, contact.id);

    Ok(contact.into())
}

/// Applies the supplied fields to the contact; omitted fields keep their value.
pub fn update_contact<R>(
    repo: &R,
    user: &User,
    id: i32,
    form: ContactPatchForm,
) -> ServiceResult<ContactResponse>
where
    R: ContactWriter + ?Sized,
{
    let id = contact_id(id)?;
    let updates = UpdateContact::try_from(form)?;

    repo.update_contact(id, user.id, &updates)
        .map_err(duplicate)?
        .map(ContactResponse::from)
        .ok_or_else(not_found)
}

/// Removes the contact and returns it as it was.
pub fn delete_contact<R>(repo: &R, user: &User, id: i32) -> ServiceResult<ContactResponse>
where
    R: ContactWriter + ?Sized,
{
    let contact = repo
        .delete_contact(contact_id(id)?, user.id)?
        .ok_or_else(not_found)?;
    log::info!("User {} deleted contact {}", user.id, contact.id);

    Ok(contact.into())
}

/// Contacts whose next birthday falls within `params.days` days of `today`,
/// soonest first.
pub fn upcoming_birthdays<R>(
    repo: &R,
    user: &User,
    params: BirthdaysParams,
    today: NaiveDate,
) -> ServiceResult<BirthdaysResponse>
where
    R: ContactReader + ?Sized,
{
    let days = params.window()?;

    let mut upcoming: Vec<_> = repo
        .list_contacts_with_birthday(user.id)?
        .into_iter()
        .filter(|contact| contact.has_birthday_within(today, days))
        .collect();
    upcoming.sort_by_key(|contact| contact.days_until_birthday(today));

    Ok(BirthdaysResponse::new(
        upcoming.into_iter().map(ContactResponse::from).collect(),
    ))
}
