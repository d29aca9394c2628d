use std::sync::Arc;

use actix_web::http::{StatusCode, header};
use actix_web::{App, test, web};
use chrono::{Datelike, Local, TimeDelta};
use diesel::RunQueryDsl;
use serde_json::{Value, json};

use contacts_app::configure_api;
use contacts_app::middleware::RateLimit;
use contacts_app::models::config::CloudinaryConfig;
use contacts_app::repository::DieselRepository;
use contacts_app::services::auth::AuthService;
use contacts_app::services::upload_file::CloudinaryUploader;

mod common;

use common::RecordingEmailSender;

fn cloudinary_config() -> CloudinaryConfig {
    CloudinaryConfig {
        cloud_name: "demo".to_string(),
        api_key: "key".to_string(),
        api_secret: "secret".to_string(),
    }
}

/// Token following `marker` in a rendered email body.
fn token_after(body: &str, marker: &str) -> String {
    let start = body.find(marker).expect("marker present") + marker.len();
    body[start..]
        .chars()
        .take_while(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
        .collect()
}

macro_rules! init_app {
    ($db:expr, $sender:expr) => {
        init_app!($db, $sender, 100)
    };
    ($db:expr, $sender:expr, $me_limit:expr) => {
        test::init_service(
            App::new()
                .app_data(web::Data::new(DieselRepository::new($db.pool())))
                .app_data(web::Data::new(AuthService::new(&common::jwt_config())))
                .app_data(web::Data::new(common::email_service($sender.clone())))
                .app_data(web::Data::new(CloudinaryUploader::new(cloudinary_config())))
                .configure(|cfg| configure_api(cfg, RateLimit::per_minute($me_limit))),
        )
        .await
    };
}

macro_rules! send {
    ($app:expr, $req:expr) => {{
        let resp = test::call_service(&$app, $req.to_request()).await;
        let status = resp.status();
        let bytes = test::read_body(resp).await;
        let body: Value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, body)
    }};
}

/// Registers, confirms and logs in `$name`, yielding the login response body.
macro_rules! signed_in {
    ($app:expr, $sender:expr, $name:expr) => {{
        let name: &str = $name;
        let (status, _) = send!(
            $app,
            test::TestRequest::post()
                .uri("/api/auth/register")
                .set_json(json!({
                    "username": name,
                    "email": format!("{name}@example.com"),
                    "password": "secret1",
                }))
        );
        assert_eq!(status, StatusCode::CREATED);

        let email = $sender.last().expect("confirmation email");
        let token = token_after(&email.body, "confirmed_email/");
        let (status, _) = send!(
            $app,
            test::TestRequest::get().uri(&format!("/api/auth/confirmed_email/{token}"))
        );
        assert_eq!(status, StatusCode::OK);

        let (status, tokens) = send!(
            $app,
            test::TestRequest::post()
                .uri("/api/auth/login")
                .set_form([("username", name), ("password", "secret1")])
        );
        assert_eq!(status, StatusCode::OK);
        tokens
    }};
}

fn bearer(tokens: &Value) -> (header::HeaderName, String) {
    (
        header::AUTHORIZATION,
        format!("Bearer {}", tokens["access_token"].as_str().unwrap()),
    )
}

#[actix_web::test]
async fn test_registration_flow() {
    let test_db = common::TestDb::new("test_registration_flow.db");
    let sender = Arc::new(RecordingEmailSender::default());
    let app = init_app!(test_db, sender);

    let register = json!({
        "username": "alice",
        "email": "Alice@Example.com",
        "password": "secret1",
    });
    let (status, body) = send!(
        app,
        test::TestRequest::post()
            .uri("/api/auth/register")
            .set_json(&register)
    );
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["username"], "alice");
    assert_eq!(body["email"], "alice@example.com");
    assert!(
        body["avatar"]
            .as_str()
            .unwrap()
            .starts_with("https://www.gravatar.com/avatar/")
    );
    assert!(body.get("hashed_password").is_none());

    let email = sender.last().expect("confirmation email");
    assert_eq!(email.recipients, vec!["alice@example.com".to_string()]);
    assert_eq!(email.subject, "Confirm your email");

    let (status, body) = send!(
        app,
        test::TestRequest::post()
            .uri("/api/auth/register")
            .set_json(&register)
    );
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["detail"], "User with this email already exists");

    let (status, body) = send!(
        app,
        test::TestRequest::post()
            .uri("/api/auth/register")
            .set_json(json!({
                "username": "alice",
                "email": "other@example.com",
                "password": "secret1",
            }))
    );
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["detail"], "User with this name already exists");

    let login = [("username", "alice"), ("password", "secret1")];
    let (status, body) = send!(
        app,
        test::TestRequest::post()
            .uri("/api/auth/login")
            .set_form(login)
    );
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["detail"], "Email is not confirmed");

    let token = token_after(&email.body, "confirmed_email/");
    let confirm_uri = format!("/api/auth/confirmed_email/{token}");
    let (status, body) = send!(app, test::TestRequest::get().uri(&confirm_uri));
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Email confirmed");

    let (_, body) = send!(app, test::TestRequest::get().uri(&confirm_uri));
    assert_eq!(body["message"], "Email already confirmed");

    let (status, tokens) = send!(
        app,
        test::TestRequest::post()
            .uri("/api/auth/login")
            .set_form(login)
    );
    assert_eq!(status, StatusCode::OK);
    assert_eq!(tokens["token_type"], "bearer");

    let (status, me) = send!(
        app,
        test::TestRequest::get()
            .uri("/api/users/me")
            .insert_header(bearer(&tokens))
    );
    assert_eq!(status, StatusCode::OK);
    assert_eq!(me["username"], "alice");
}

#[actix_web::test]
async fn test_login_rejects_bad_credentials() {
    let test_db = common::TestDb::new("test_login_rejects_bad_credentials.db");
    let sender = Arc::new(RecordingEmailSender::default());
    let app = init_app!(test_db, sender);
    signed_in!(app, sender, "bob");

    let resp = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/api/auth/login")
            .set_form([("username", "bob"), ("password", "wrong-password")])
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(
        resp.headers().get(header::WWW_AUTHENTICATE).unwrap(),
        "Bearer"
    );
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["detail"], "Incorrect login or password");
}

#[actix_web::test]
async fn test_confirmation_rejects_garbage_token() {
    let test_db = common::TestDb::new("test_confirmation_rejects_garbage.db");
    let sender = Arc::new(RecordingEmailSender::default());
    let app = init_app!(test_db, sender);

    let (status, body) = send!(
        app,
        test::TestRequest::get().uri("/api/auth/confirmed_email/not-a-token")
    );
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["detail"], "Invalid token for email verification");
}

#[actix_web::test]
async fn test_token_kinds_are_enforced() {
    let test_db = common::TestDb::new("test_token_kinds_are_enforced.db");
    let sender = Arc::new(RecordingEmailSender::default());
    let app = init_app!(test_db, sender);
    let tokens = signed_in!(app, sender, "carol");

    let (status, body) = send!(
        app,
        test::TestRequest::get()
            .uri("/api/users/me")
            .insert_header((
                header::AUTHORIZATION,
                format!("Bearer {}", tokens["refresh_token"].as_str().unwrap()),
            ))
    );
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["detail"], "Could not validate credentials");

    let (status, refreshed) = send!(
        app,
        test::TestRequest::post()
            .uri("/api/auth/refresh-token")
            .set_json(json!({ "refresh_token": tokens["refresh_token"] }))
    );
    assert_eq!(status, StatusCode::OK);
    assert_eq!(refreshed["refresh_token"], tokens["refresh_token"]);

    let (status, body) = send!(
        app,
        test::TestRequest::post()
            .uri("/api/auth/refresh-token")
            .set_json(json!({ "refresh_token": tokens["access_token"] }))
    );
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["detail"], "Invalid or expired refresh token");
}

#[actix_web::test]
async fn test_password_reset_flow() {
    let test_db = common::TestDb::new("test_password_reset_flow.db");
    let sender = Arc::new(RecordingEmailSender::default());
    let app = init_app!(test_db, sender);
    signed_in!(app, sender, "dave");

    let (status, body) = send!(
        app,
        test::TestRequest::post()
            .uri("/api/auth/password/forgot")
            .set_json(json!({ "email": "dave@example.com" }))
    );
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Reset link was sent");

    let email = sender.last().unwrap();
    assert_eq!(email.subject, "Password Reset Request - Contacts App");
    let token = token_after(&email.body, "reset?token=");

    let (status, body) = send!(
        app,
        test::TestRequest::post()
            .uri("/api/auth/password/reset")
            .set_json(json!({ "token": "bogus", "new_password": "brand-new" }))
    );
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["detail"], "Invalid reset token");

    let (status, body) = send!(
        app,
        test::TestRequest::post()
            .uri("/api/auth/password/reset")
            .set_json(json!({ "token": token, "new_password": "brand-new" }))
    );
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Password updated");

    let (status, _) = send!(
        app,
        test::TestRequest::post()
            .uri("/api/auth/login")
            .set_form([("username", "dave"), ("password", "secret1")])
    );
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = send!(
        app,
        test::TestRequest::post()
            .uri("/api/auth/login")
            .set_form([("username", "dave"), ("password", "brand-new")])
    );
    assert_eq!(status, StatusCode::OK);

    let sent_before = sender.sent.lock().unwrap().len();
    let (status, body) = send!(
        app,
        test::TestRequest::post()
            .uri("/api/auth/password/forgot")
            .set_json(json!({ "email": "nobody@example.com" }))
    );
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Reset link was sent");
    assert_eq!(sender.sent.lock().unwrap().len(), sent_before);
}

#[actix_web::test]
async fn test_request_email_resends_confirmation() {
    let test_db = common::TestDb::new("test_request_email.db");
    let sender = Arc::new(RecordingEmailSender::default());
    let app = init_app!(test_db, sender);

    let (status, _) = send!(
        app,
        test::TestRequest::post()
            .uri("/api/auth/register")
            .set_json(json!({
                "username": "erin",
                "email": "erin@example.com",
                "password": "secret1",
            }))
    );
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = send!(
        app,
        test::TestRequest::post()
            .uri("/api/auth/request_email")
            .set_json(json!({ "email": "erin@example.com" }))
    );
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Please check your email for confirmation");
    assert_eq!(sender.sent.lock().unwrap().len(), 2);

    let (status, body) = send!(
        app,
        test::TestRequest::post()
            .uri("/api/auth/request_email")
            .set_json(json!({ "email": "not-an-email" }))
    );
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["detail"].is_string());
}

#[actix_web::test]
async fn test_contacts_require_authentication() {
    let test_db = common::TestDb::new("test_contacts_require_auth.db");
    let sender = Arc::new(RecordingEmailSender::default());
    let app = init_app!(test_db, sender);

    let resp = test::call_service(
        &app,
        test::TestRequest::get().uri("/api/contacts/").to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(
        resp.headers().get(header::WWW_AUTHENTICATE).unwrap(),
        "Bearer"
    );

    let (status, _) = send!(
        app,
        test::TestRequest::get()
            .uri("/api/contacts/")
            .insert_header((header::AUTHORIZATION, "Bearer not.a.jwt"))
    );
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn test_contacts_crud() {
    let test_db = common::TestDb::new("test_contacts_crud.db");
    let sender = Arc::new(RecordingEmailSender::default());
    let app = init_app!(test_db, sender);
    let tokens = signed_in!(app, sender, "frank");

    let (status, created) = send!(
        app,
        test::TestRequest::post()
            .uri("/api/contacts/")
            .insert_header(bearer(&tokens))
            .set_json(json!({
                "name": "Jane",
                "surname": "Doe",
                "email": "jane@example.com",
                "phone_number": "+1 415 555 2671",
                "birthday": "1990-05-17",
                "additional_info": "Met at <script>alert(1)</script>the conference",
            }))
    );
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["phone_number"], "+14155552671");
    assert_eq!(created["birthday"], "1990-05-17");
    assert_eq!(created["additional_info"], "Met at the conference");
    assert!(created.get("user_id").is_none());
    let id = created["id"].as_i64().unwrap();

    let (status, list) = send!(
        app,
        test::TestRequest::get()
            .uri("/api/contacts/")
            .insert_header(bearer(&tokens))
    );
    assert_eq!(status, StatusCode::OK);
    assert_eq!(list.as_array().unwrap().len(), 1);

    let (status, found) = send!(
        app,
        test::TestRequest::get()
            .uri("/api/contacts/?query=DOE")
            .insert_header(bearer(&tokens))
    );
    assert_eq!(status, StatusCode::OK);
    assert_eq!(found[0]["id"], id);

    let (status, fetched) = send!(
        app,
        test::TestRequest::get()
            .uri(&format!("/api/contacts/{id}"))
            .insert_header(bearer(&tokens))
    );
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched, created);

    let (status, patched) = send!(
        app,
        test::TestRequest::patch()
            .uri(&format!("/api/contacts/{id}"))
            .insert_header(bearer(&tokens))
            .set_json(json!({ "surname": "Smith", "birthday": null }))
    );
    assert_eq!(status, StatusCode::OK);
    assert_eq!(patched["surname"], "Smith");
    assert_eq!(patched["name"], "Jane");
    assert_eq!(patched["email"], "jane@example.com");
    assert_eq!(patched["birthday"], Value::Null);
    assert_eq!(patched["additional_info"], "Met at the conference");

    let (status, body) = send!(
        app,
        test::TestRequest::post()
            .uri("/api/contacts/")
            .insert_header(bearer(&tokens))
            .set_json(json!({
                "name": "Copy",
                "surname": "Cat",
                "email": "jane@example.com",
                "phone_number": "+14155550000",
            }))
    );
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(
        body["detail"],
        "Contact with this email or phone number already exists"
    );

    let (status, body) = send!(
        app,
        test::TestRequest::post()
            .uri("/api/contacts/")
            .insert_header(bearer(&tokens))
            .set_json(json!({
                "name": "",
                "surname": "Cat",
                "email": "cat@example.com",
                "phone_number": "+14155550001",
            }))
    );
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["detail"].is_string());

    let (status, _) = send!(
        app,
        test::TestRequest::post()
            .uri("/api/contacts/")
            .insert_header(bearer(&tokens))
            .set_json(json!({ "name": "Broken" }))
    );
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let (status, deleted) = send!(
        app,
        test::TestRequest::delete()
            .uri(&format!("/api/contacts/{id}"))
            .insert_header(bearer(&tokens))
    );
    assert_eq!(status, StatusCode::OK);
    assert_eq!(deleted["id"], id);

    let (status, body) = send!(
        app,
        test::TestRequest::get()
            .uri(&format!("/api/contacts/{id}"))
            .insert_header(bearer(&tokens))
    );
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["detail"], "Contact not found");
}

#[actix_web::test]
async fn test_contacts_are_private() {
    let test_db = common::TestDb::new("test_contacts_are_private.db");
    let sender = Arc::new(RecordingEmailSender::default());
    let app = init_app!(test_db, sender);
    let owner = signed_in!(app, sender, "gina");
    let intruder = signed_in!(app, sender, "hank");

    let (_, created) = send!(
        app,
        test::TestRequest::post()
            .uri("/api/contacts/")
            .insert_header(bearer(&owner))
            .set_json(json!({
                "name": "Secret",
                "surname": "Friend",
                "email": "secret@example.com",
                "phone_number": "+14155552672",
            }))
    );
    let uri = format!("/api/contacts/{}", created["id"]);

    let (_, list) = send!(
        app,
        test::TestRequest::get()
            .uri("/api/contacts/")
            .insert_header(bearer(&intruder))
    );
    assert!(list.as_array().unwrap().is_empty());

    let (status, _) = send!(
        app,
        test::TestRequest::get()
            .uri(&uri)
            .insert_header(bearer(&intruder))
    );
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send!(
        app,
        test::TestRequest::patch()
            .uri(&uri)
            .insert_header(bearer(&intruder))
            .set_json(json!({ "name": "Stolen" }))
    );
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send!(
        app,
        test::TestRequest::delete()
            .uri(&uri)
            .insert_header(bearer(&intruder))
    );
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, still_there) = send!(
        app,
        test::TestRequest::get().uri(&uri).insert_header(bearer(&owner))
    );
    assert_eq!(status, StatusCode::OK);
    assert_eq!(still_there["name"], "Secret");
}

#[actix_web::test]
async fn test_upcoming_birthdays() {
    let test_db = common::TestDb::new("test_upcoming_birthdays.db");
    let sender = Arc::new(RecordingEmailSender::default());
    let app = init_app!(test_db, sender);
    let tokens = signed_in!(app, sender, "ivy");

    let today = Local::now().date_naive();
    let born = |date: chrono::NaiveDate| date.with_year(2000).unwrap().to_string();

    let (_, empty) = send!(
        app,
        test::TestRequest::get()
            .uri("/api/contacts/upcoming_birthdays/")
            .insert_header(bearer(&tokens))
    );
    assert_eq!(empty["message"], "No birthdays this week");

    for (name, phone, birthday) in [
        ("Today", "+14155550301", born(today)),
        ("Soon", "+14155550302", born(today + TimeDelta::days(7))),
        ("Later", "+14155550303", born(today + TimeDelta::days(30))),
    ] {
        let (status, _) = send!(
            app,
            test::TestRequest::post()
                .uri("/api/contacts/")
                .insert_header(bearer(&tokens))
                .set_json(json!({
                    "name": name,
                    "surname": "Born",
                    "email": format!("{}@example.com", name.to_lowercase()),
                    "phone_number": phone,
                    "birthday": birthday,
                }))
        );
        assert_eq!(status, StatusCode::CREATED);
    }

    let (status, body) = send!(
        app,
        test::TestRequest::get()
            .uri("/api/contacts/upcoming_birthdays/")
            .insert_header(bearer(&tokens))
    );
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Birthdays this week");
    let names: Vec<_> = body["contacts"]
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c["name"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(names, vec!["Today", "Soon"]);

    let (_, wide) = send!(
        app,
        test::TestRequest::get()
            .uri("/api/contacts/upcoming_birthdays/?days=31")
            .insert_header(bearer(&tokens))
    );
    assert_eq!(wide["contacts"].as_array().unwrap().len(), 3);

    let (status, _) = send!(
        app,
        test::TestRequest::get()
            .uri("/api/contacts/upcoming_birthdays/?days=400")
            .insert_header(bearer(&tokens))
    );
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[actix_web::test]
async fn test_avatar_update_requires_admin() {
    let test_db = common::TestDb::new("test_avatar_requires_admin.db");
    let sender = Arc::new(RecordingEmailSender::default());
    let app = init_app!(test_db, sender);
    let tokens = signed_in!(app, sender, "jack");

    let boundary = "----contacts-test-boundary";
    let payload = format!(
        "--{boundary}\r\n\
         Content-Disposition: form-data; name=\"file\"; filename=\"avatar.png\"\r\n\
         Content-Type: image/png\r\n\r\n\
         not-really-a-png\r\n\
         --{boundary}--\r\n"
    );

    let (status, body) = send!(
        app,
        test::TestRequest::patch()
            .uri("/api/users/avatar")
            .insert_header(bearer(&tokens))
            .insert_header((
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={boundary}"),
            ))
            .set_payload(payload)
    );
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(
        body["detail"],
        "Operation not allowed. Please contact the admin."
    );
}

fn multipart_without_file() -> (String, String) {
    let boundary = "----contacts-test-boundary";
    let payload = format!(
        "--{boundary}\r\n\
         Content-Disposition: form-data; name=\"note\"\r\n\r\n\
         no file here\r\n\
         --{boundary}--\r\n"
    );
    (format!("multipart/form-data; boundary={boundary}"), payload)
}

#[actix_web::test]
async fn test_avatar_role_is_checked_before_the_body() {
    let test_db = common::TestDb::new("test_avatar_role_before_body.db");
    let sender = Arc::new(RecordingEmailSender::default());
    let app = init_app!(test_db, sender);
    let tokens = signed_in!(app, sender, "liam");

    let (content_type, payload) = multipart_without_file();
    let (status, body) = send!(
        app,
        test::TestRequest::patch()
            .uri("/api/users/avatar")
            .insert_header(bearer(&tokens))
            .insert_header((header::CONTENT_TYPE, content_type))
            .set_payload(payload)
    );
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(
        body["detail"],
        "Operation not allowed. Please contact the admin."
    );

    let (status, body) = send!(
        app,
        test::TestRequest::patch()
            .uri("/api/users/avatar")
            .insert_header(bearer(&tokens))
            .set_payload("plain text")
    );
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert!(body["detail"].is_string());
}

#[actix_web::test]
async fn test_admin_malformed_avatar_upload_is_unprocessable() {
    let test_db = common::TestDb::new("test_admin_malformed_avatar.db");
    let sender = Arc::new(RecordingEmailSender::default());
    let app = init_app!(test_db, sender);
    let tokens = signed_in!(app, sender, "mona");

    let mut conn = test_db.pool().get().unwrap();
    diesel::sql_query("UPDATE users SET role = 'admin' WHERE username = 'mona'")
        .execute(&mut conn)
        .unwrap();

    let (content_type, payload) = multipart_without_file();
    let (status, body) = send!(
        app,
        test::TestRequest::patch()
            .uri("/api/users/avatar")
            .insert_header(bearer(&tokens))
            .insert_header((header::CONTENT_TYPE, content_type))
            .set_payload(payload)
    );
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["detail"].is_string());
}

#[actix_web::test]
async fn test_me_is_rate_limited() {
    let test_db = common::TestDb::new("test_me_is_rate_limited.db");
    let sender = Arc::new(RecordingEmailSender::default());
    let app = init_app!(test_db, sender, 2);
    let tokens = signed_in!(app, sender, "kate");

    for _ in 0..2 {
        let (status, _) = send!(
            app,
            test::TestRequest::get()
                .uri("/api/users/me")
                .insert_header(bearer(&tokens))
        );
        assert_eq!(status, StatusCode::OK);
    }

    let (status, body) = send!(
        app,
        test::TestRequest::get()
            .uri("/api/users/me")
            .insert_header(bearer(&tokens))
    );
    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(body["error"], "Request limit exceeded. Try again later");
}
