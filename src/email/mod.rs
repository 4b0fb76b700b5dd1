pub mod templates;

use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};

use crate::config::{SiteConfig, SmtpConfig};

/// Seam to the transactional email sender. The identity flows invoke these
/// hooks inline; a send failure is the caller's to log, never to propagate —
/// the token issued alongside stays valid either way.
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send_verification(&self, to: &str, user_name: &str, url: &str) -> Result<(), String>;

    async fn send_password_reset(&self, to: &str, url: &str) -> Result<(), String>;
}

pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: String,
    site_name: String,
    contact_address: String,
}

impl SmtpMailer {
    pub fn new(config: &SmtpConfig, site: &SiteConfig) -> Result<Self, String> {
        let creds = Credentials::new(config.user.clone(), config.pass.clone());

        let transport = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.host)
            .map_err(|e| format!("SMTP error: {e}"))?
            .port(config.port)
            .credentials(creds)
            .build();

        Ok(Self {
            transport,
            from: config.from.clone(),
            site_name: site.name.clone(),
            contact_address: site.contact_address.clone(),
        })
    }

    async fn send(&self, to: &str, subject: &str, html_body: &str) -> Result<(), String> {
        let message = Message::builder()
            .from(
                self.from
                    .parse()
                    .map_err(|e| format!("Invalid from address: {e}"))?,
            )
            .to(to.parse().map_err(|e| format!("Invalid to address: {e}"))?)
            .subject(subject)
            .header(ContentType::TEXT_HTML)
            .body(html_body.to_string())
            .map_err(|e| format!("Failed to build email: {e}"))?;

        self.transport
            .send(message)
            .await
            .map_err(|e| format!("Failed to send email: {e}"))?;

        Ok(())
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send_verification(&self, to: &str, user_name: &str, url: &str) -> Result<(), String> {
        let html = templates::render_verification(
            &self.site_name,
            &self.contact_address,
            user_name,
            url,
        );
        self.send(
            to,
            &format!("Verify your email address - {}", self.site_name),
            &html,
        )
        .await
    }

    async fn send_password_reset(&self, to: &str, url: &str) -> Result<(), String> {
        let html = templates::render_password_reset(&self.site_name, url);
        self.send(
            to,
            &format!("Reset your password - {}", self.site_name),
            &html,
        )
        .await
    }
}
