#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use tempfile::TempDir;
use tera::Tera;

use contacts_app::db::{DbPool, establish_connection_pool, run_pending_migrations};
use contacts_app::models::config::{JwtConfig, MailConfig};
use contacts_app::models::zmq::ZmqEmailMessage;
use contacts_app::services::email::{EmailError, EmailSender, EmailService};

/// Migrated SQLite database living in a temporary directory that is removed
/// on drop.
pub struct TestDb {
    _dir: TempDir,
    pool: DbPool,
}

impl TestDb {
    pub fn new(filename: &str) -> Self {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join(filename);
        let pool = establish_connection_pool(path.to_str().expect("utf-8 path"))
            .expect("Failed to establish SQLite connection.");
        run_pending_migrations(&pool).expect("Migrations failed");

        Self { _dir: dir, pool }
    }

    pub fn pool(&self) -> DbPool {
        self.pool.clone()
    }
}

/// Collects sent emails instead of publishing them.
#[derive(Default)]
pub struct RecordingEmailSender {
    pub sent: Mutex<Vec<ZmqEmailMessage>>,
}

impl RecordingEmailSender {
    pub fn last(&self) -> Option<ZmqEmailMessage> {
        self.sent.lock().unwrap().last().cloned()
    }
}

impl EmailSender for RecordingEmailSender {
    fn send(&self, message: &ZmqEmailMessage) -> Result<(), EmailError> {
        self.sent.lock().unwrap().push(message.clone());
        Ok(())
    }
}

pub fn jwt_config() -> JwtConfig {
    JwtConfig {
        secret: "integration-secret".to_string(),
        access_ttl_secs: 900,
        refresh_ttl_secs: 604_800,
        email_ttl_secs: 900,
        reset_ttl_secs: 900,
        user_cache_ttl_secs: 3600,
    }
}

pub fn mail_config() -> MailConfig {
    MailConfig {
        zmq_emailer_pub: "tcp://127.0.0.1:5557".to_string(),
        from_email: "noreply@contacts.local".to_string(),
        from_name: "Contacts App".to_string(),
        reply_to: "no-reply@yourapp.com".to_string(),
        list_unsubscribe: "<mailto:unsubscribe@yourapp.com>".to_string(),
    }
}

pub fn email_service(sender: Arc<RecordingEmailSender>) -> EmailService {
    let templates = Tera::new(concat!(env!("CARGO_MANIFEST_DIR"), "/templates/**/*.html"))
        .expect("templates should parse");
    EmailService::new(sender, templates, mail_config())
}
