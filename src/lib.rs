//! Contacts App: a JSON API for user accounts and personal contact books.
//!
//! With only the `data` feature the crate exposes the domain, the diesel
//! models and the repositories. The default `server` feature adds the
//! services, the actix-web routes and [`run`].

#[cfg(feature = "data")]
pub mod db;
#[cfg(feature = "data")]
pub mod domain;
#[cfg(feature = "data")]
pub mod models;
#[cfg(feature = "data")]
pub mod repository;
#[cfg(feature = "data")]
pub mod schema;

#[cfg(feature = "server")]
pub mod dto;
#[cfg(feature = "server")]
pub mod extractors;
#[cfg(feature = "server")]
pub mod forms;
#[cfg(feature = "server")]
pub mod middleware;
#[cfg(feature = "server")]
pub mod routes;
#[cfg(feature = "server")]
pub mod services;

#[cfg(feature = "server")]
pub use server::{configure_api, run};

#[cfg(feature = "server")]
mod server {
    use std::sync::Arc;

    use actix_cors::Cors;
    use actix_web::{App, HttpServer, middleware, web};
    use tera::Tera;

    use crate::db::{establish_connection_pool, run_pending_migrations};
    use crate::middleware::RateLimit;
    use crate::models::config::ServerConfig;
    use crate::repository::DieselRepository;
    use crate::routes::auth::{
        confirmed_email, forgot_password, login, refresh_token, register, request_email,
        reset_password,
    };
    use crate::routes::contacts::{
        create_contact, delete_contact, get_contact, list_contacts, update_contact,
        upcoming_birthdays,
    };
    use crate::routes::users::{me, update_avatar};
    use crate::routes::{form_config, json_config, multipart_config, query_config};
    use crate::services::auth::AuthService;
    use crate::services::email::{EmailService, ZmqEmailSender};
    use crate::services::upload_file::CloudinaryUploader;

    /// Registers every `/api` route. Application state is expected to be
    /// provided by the caller as `web::Data`.
    pub fn configure_api(cfg: &mut web::ServiceConfig, me_limit: RateLimit) {
        cfg.app_data(json_config())
            .app_data(query_config())
            .app_data(form_config())
            .app_data(multipart_config())
            .service(
                web::scope("/api")
                    .service(
                        web::scope("/auth")
                            .service(register)
                            .service(login)
                            .service(confirmed_email)
                            .service(request_email)
                            .service(refresh_token)
                            .service(forgot_password)
                            .service(reset_password),
                    )
                    .service(
                        web::scope("/users")
                            .service(
                                web::resource("/me")
                                    .route(web::get().to(me))
                                    .wrap(me_limit),
                            )
                            .service(update_avatar),
                    )
                    .service(
                        web::scope("/contacts")
                            .service(upcoming_birthdays)
                            .service(list_contacts)
                            .service(create_contact)
                            .service(get_contact)
                            .service(update_contact)
                            .service(delete_contact),
                    ),
            );
    }

    fn cors(allowed_origins: &[String]) -> Cors {
        allowed_origins
            .iter()
            .fold(Cors::default(), |cors, origin| cors.allowed_origin(origin))
            .supports_credentials()
            .allow_any_method()
            .allow_any_header()
    }

    /// Builds and runs the Actix-Web HTTP server using the provided configuration.
    pub async fn run(server_config: ServerConfig) -> std::io::Result<()> {
        // Establish Diesel connection pool for the SQLite database.
        let pool = establish_connection_pool(&server_config.database_url).map_err(|e| {
            std::io::Error::other(format!("Failed to establish database connection: {e}"))
        })?;

        if server_config.run_migrations {
            run_pending_migrations(&pool)
                .map_err(|e| std::io::Error::other(format!("Failed to run migrations: {e}")))?;
        }

        let repo = DieselRepository::new(pool);

        // Start a background ZeroMQ publisher used for outbound email.
        let sender = ZmqEmailSender::start(&server_config.mail.zmq_emailer_pub)
            .map_err(|e| std::io::Error::other(format!("Failed to start ZMQ sender: {e}")))?;

        let tera = Tera::new(&server_config.templates_dir)
            .map_err(|e| std::io::Error::other(format!("Template parsing error(s): {e}")))?;

        let mailer = EmailService::new(Arc::new(sender), tera, server_config.mail.clone());
        let auth = AuthService::new(&server_config.jwt);
        let uploader = CloudinaryUploader::new(server_config.cloudinary.clone());
        let me_limit = RateLimit::per_minute(server_config.rate_limit.me_per_minute);

        let allowed_origins = server_config.allowed_origins.clone();
        let bind_address = (server_config.address.clone(), server_config.port);
        log::info!("Listening on {}:{}", bind_address.0, bind_address.1);

        HttpServer::new(move || {
            App::new()
                .wrap(cors(&allowed_origins))
                .wrap(middleware::Logger::default())
                .app_data(web::Data::new(repo.clone()))
                .app_data(web::Data::new(auth.clone()))
                .app_data(web::Data::new(mailer.clone()))
                .app_data(web::Data::new(uploader.clone()))
                .configure(|cfg| configure_api(cfg, me_limit.clone()))
        })
        .bind(bind_address)?
        .run()
        .await
    }
}
