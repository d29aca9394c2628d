//! Contact book endpoints under `/api/contacts`.

use actix_web::{HttpResponse, delete, get, patch, post, web};
use chrono::Local;

use crate::extractors::CurrentUser;
use crate::forms::contacts::{BirthdaysParams, ContactForm, ContactListParams, ContactPatchForm};
use crate::repository::DieselRepository;
use crate::services::ServiceResult;
use crate::services::contacts as contacts_service;

#[get("/")]
pub async fn list_contacts(
    CurrentUser(user): CurrentUser,
    repo: web::Data<DieselRepository>,
    params: web::Query<ContactListParams>,
) -> ServiceResult<HttpResponse> {
    let contacts = contacts_service::list_contacts(repo.get_ref(), &user, params.into_inner())?;
    Ok(HttpResponse::Ok().json(contacts))
}

#[get("/upcoming_birthdays/")]
pub async fn upcoming_birthdays(
    CurrentUser(user): CurrentUser,
    repo: web::Data<DieselRepository>,
    params: web::Query<BirthdaysParams>,
) -> ServiceResult<HttpResponse> {
    let today = Local::now().date_naive();
    let response =
        contacts_service::upcoming_birthdays(repo.get_ref(), &user, params.into_inner(), today)?;
    Ok(HttpResponse::Ok().json(response))
}

#[get("/{contact_id}")]
pub async fn get_contact(
    CurrentUser(user): CurrentUser,
    repo: web::Data<DieselRepository>,
    contact_id: web::Path<i32>,
) -> ServiceResult<HttpResponse> {
    let contact = contacts_service::get_contact(repo.get_ref(), &user, contact_id.into_inner())?;
    Ok(HttpResponse::Ok().json(contact))
}

#[post("/")]
pub async fn create_contact(
    CurrentUser(user): CurrentUser,
    repo: web::Data<DieselRepository>,
    web::Json(form): web::Json<ContactForm>,
) -> ServiceResult<HttpResponse> {
    let contact = contacts_service::create_contact(repo.get_ref(), &user, form)?;
    Ok(HttpResponse::Created().json(contact))
}

#[patch("/{contact_id}")]
pub async fn update_contact(
    CurrentUser(user): CurrentUser,
    repo: web::Data<DieselRepository>,
    contact_id: web::Path<i32>,
    web::Json(form): web::Json<ContactPatchForm>,
) -> ServiceResult<HttpResponse> {
    let contact =
        contacts_service::update_contact(repo.get_ref(), &user, contact_id.into_inner(), form)?;
    Ok(HttpResponse::Ok().json(contact))
}

#[delete("/{contact_id}")]
pub async fn delete_contact(
    CurrentUser(user): CurrentUser,
    repo: web::Data<DieselRepository>,
    contact_id: web::Path<i32>,
) -> ServiceResult<HttpResponse> {
    let contact = contacts_service::delete_contact(repo.get_ref(), &user, contact_id.into_inner())?;
    Ok(HttpResponse::Ok().json(contact))
}
