use std::net::SocketAddr;

use actix_web::http::{StatusCode, header};
use actix_web::{App, HttpResponse, test, web};

use contacts_app::domain::types::{EmailAddress, HashedPassword, Username};
use contacts_app::domain::user::NewUser;
use contacts_app::middleware::{RATE_LIMIT_MESSAGE, RateLimit};
use contacts_app::repository::{DieselRepository, UserWriter};
use contacts_app::services::auth::AuthService;

mod common;

fn peer(ip: &str) -> SocketAddr {
    format!("{ip}:40000").parse().unwrap()
}

/// Repository and auth state holding one user, plus a bearer header for them.
fn signed_in(test_db: &common::TestDb) -> (DieselRepository, AuthService, String) {
    let repo = DieselRepository::new(test_db.pool());
    let auth = AuthService::new(&common::jwt_config());

    let user = repo
        .create_user(&NewUser::new(
            Username::new("limited").unwrap(),
            EmailAddress::new("limited@example.com").unwrap(),
            HashedPassword::new("$argon2id$v=19$m=19456,t=2,p=1$c2FsdA$aGFzaA").unwrap(),
        ))
        .unwrap();
    let token = auth.create_access_token(&user.username).unwrap();

    (repo, auth, format!("Bearer {token}"))
}

macro_rules! init_app {
    ($repo:expr, $auth:expr, $limit:expr) => {
        test::init_service(
            App::new()
                .app_data(web::Data::new($repo.clone()))
                .app_data(web::Data::new($auth.clone()))
                .wrap($limit.clone())
                .default_service(web::to(|| async { HttpResponse::Ok().finish() })),
        )
        .await
    };
}

#[actix_web::test]
async fn requests_within_quota_pass_through() {
    let test_db = common::TestDb::new("requests_within_quota.db");
    let (repo, auth, bearer) = signed_in(&test_db);
    let app = init_app!(repo, auth, RateLimit::per_minute(3));

    for _ in 0..3 {
        let req = test::TestRequest::default()
            .peer_addr(peer("10.0.0.1"))
            .insert_header((header::AUTHORIZATION, bearer.as_str()))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
    }
}

#[actix_web::test]
async fn exhausted_quota_is_rejected() {
    let test_db = common::TestDb::new("exhausted_quota.db");
    let (repo, auth, bearer) = signed_in(&test_db);
    let app = init_app!(repo, auth, RateLimit::per_minute(2));

    for _ in 0..2 {
        let req = test::TestRequest::default()
            .peer_addr(peer("10.0.0.2"))
            .insert_header((header::AUTHORIZATION, bearer.as_str()))
            .to_request();
        test::call_service(&app, req).await;
    }

    let req = test::TestRequest::default()
        .peer_addr(peer("10.0.0.2"))
        .insert_header((header::AUTHORIZATION, bearer.as_str()))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::TOO_MANY_REQUESTS);

    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], RATE_LIMIT_MESSAGE);
}

#[actix_web::test]
async fn clients_are_limited_independently() {
    let test_db = common::TestDb::new("clients_independent.db");
    let (repo, auth, bearer) = signed_in(&test_db);
    let app = init_app!(repo, auth, RateLimit::per_minute(1));

    let call = |ip: &str| {
        test::TestRequest::default()
            .peer_addr(peer(ip))
            .insert_header((header::AUTHORIZATION, bearer.as_str()))
            .to_request()
    };

    assert_eq!(
        test::call_service(&app, call("10.0.0.3")).await.status(),
        StatusCode::OK
    );
    assert_eq!(
        test::call_service(&app, call("10.0.0.4")).await.status(),
        StatusCode::OK
    );
    assert_eq!(
        test::call_service(&app, call("10.0.0.3")).await.status(),
        StatusCode::TOO_MANY_REQUESTS
    );
}

#[actix_web::test]
async fn forwarded_headers_do_not_change_the_client() {
    let test_db = common::TestDb::new("forwarded_headers.db");
    let (repo, auth, bearer) = signed_in(&test_db);
    let limit = RateLimit::per_minute(1);
    let app = init_app!(repo, auth, limit);

    let mut accepted = 0;
    for i in 0..20 {
        let req = test::TestRequest::default()
            .peer_addr(peer("10.0.0.9"))
            .insert_header((header::AUTHORIZATION, bearer.as_str()))
            .insert_header(("X-Forwarded-For", format!("1.2.3.{i}")))
            .insert_header((header::FORWARDED, format!("for=5.6.7.{i}")))
            .to_request();
        if test::call_service(&app, req).await.status() == StatusCode::OK {
            accepted += 1;
        }
    }

    assert_eq!(accepted, 1);
    assert_eq!(limit.tracked_clients(), 1);
}

#[actix_web::test]
async fn unauthenticated_requests_do_not_consume_quota() {
    let test_db = common::TestDb::new("unauthenticated_quota.db");
    let (repo, auth, bearer) = signed_in(&test_db);
    let limit = RateLimit::per_minute(1);
    let app = init_app!(repo, auth, limit);

    for _ in 0..3 {
        let req = test::TestRequest::default()
            .peer_addr(peer("10.0.0.5"))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            resp.headers().get(header::WWW_AUTHENTICATE).unwrap(),
            "Bearer"
        );
    }
    assert_eq!(limit.tracked_clients(), 0);

    let req = test::TestRequest::default()
        .peer_addr(peer("10.0.0.5"))
        .insert_header((header::AUTHORIZATION, bearer.as_str()))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);
}
