//! Report delivery over the SendGrid v3 mail API.

use crate::reports::{GeneratedReport, ReportKind};
use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum MailError {
    #[error("sendgrid request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("sendgrid rejected the message with status {status}: {body}")]
    Rejected { status: u16, body: String },
}

#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send_report(
        &self,
        to: &str,
        kind: ReportKind,
        report: &GeneratedReport,
    ) -> Result<(), MailError>;
}

#[derive(Debug, Clone)]
pub struct SendGridConfig {
    pub api_key: String,
    pub from_email: String,
    pub from_name: String,
    pub reply_to: Option<String>,
}

impl SendGridConfig {
    pub fn from_env() -> Result<Self, std::env::VarError> {
        Ok(Self {
            api_key: std::env::var("SENDGRID_API_KEY")?,
            from_email: std::env::var("SENDGRID_FROM")?,
            from_name: std::env::var("SENDGRID_FROM_NAME")
                .unwrap_or_else(|_| "Evija".to_string()),
            reply_to: std::env::var("SENDGRID_REPLY_TO").ok(),
        })
    }
}

pub struct SendGridMailer {
    config: SendGridConfig,
    client: reqwest::Client,
}

const SENDGRID_URL: &str = "https://api.sendgrid.com/v3/mail/send";

/// Subject line per report type.
pub fn subject_for(kind: ReportKind) -> &'static str {
    match kind {
        ReportKind::Personality => "Tava personības analīze",
        ReportKind::Child => "Tava bērna personības analīze",
        ReportKind::Finances => "Tava finanšu un realizācijas analīze",
        ReportKind::Forecast => "Tava gada prognoze",
        ReportKind::Compatibility => "Jūsu saderības analīze",
    }
}

/// HTML body per report type.
pub fn body_for(kind: ReportKind) -> &'static str {
    match kind {
        ReportKind::Personality => {
            "<p>Sveika!</p><p>Pielikumā atradīsi savu personības analīzi. \
             Lai tā palīdz labāk iepazīt sevi un savus resursus.</p><p>Evija</p>"
        }
        ReportKind::Child => {
            "<p>Sveika!</p><p>Pielikumā atradīsi sava bērna personības analīzi. \
             Lai tā palīdz labāk saprast un atbalstīt savu bērnu.</p><p>Evija</p>"
        }
        ReportKind::Finances => {
            "<p>Sveika!</p><p>Pielikumā atradīsi savu finanšu un realizācijas analīzi. \
             Lai tā palīdz atvērt savu potenciālu.</p><p>Evija</p>"
        }
        ReportKind::Forecast => {
            "<p>Sveika!</p><p>Pielikumā atradīsi savu gada prognozi. \
             Lai tev izdevies un harmonisks gads!</p><p>Evija</p>"
        }
        ReportKind::Compatibility => {
            "<p>Sveiki!</p><p>Pielikumā atradīsiet savu saderības analīzi. \
             Lai tā palīdz labāk saprast vienam otru.</p><p>Evija</p>"
        }
    }
}

impl SendGridMailer {
    pub fn new(config: SendGridConfig, client: reqwest::Client) -> Self {
        Self { config, client }
    }

    /// The full v3 mail/send payload, separated out so it can be checked
    /// without network access.
    pub fn build_payload(
        &self,
        to: &str,
        kind: ReportKind,
        report: &GeneratedReport,
    ) -> serde_json::Value {
        let mut payload = json!({
            "personalizations": [{ "to": [{ "email": to }] }],
            "from": {
                "email": self.config.from_email,
                "name": self.config.from_name,
            },
            "subject": subject_for(kind),
            "content": [{
                "type": "text/html",
                "value": body_for(kind),
            }],
            "attachments": [{
                "content": BASE64.encode(&report.pdf),
                "type": "application/pdf",
                "filename": report.filename,
                "disposition": "attachment",
            }],
        });
        if let Some(reply_to) = &self.config.reply_to {
            payload["reply_to"] = json!({ "email": reply_to });
        }
        payload
    }
}

#[async_trait]
impl Mailer for SendGridMailer {
    async fn send_report(
        &self,
        to: &str,
        kind: ReportKind,
        report: &GeneratedReport,
    ) -> Result<(), MailError> {
        let payload = self.build_payload(to, kind, report);
        let response = self
            .client
            .post(SENDGRID_URL)
            .bearer_auth(&self.config.api_key)
            .json(&payload)
            .send()
            .await?;
        let status = response.status().as_u16();
        if !(200..300).contains(&status) {
            let body = response.text().await.unwrap_or_default();
            return Err(MailError::Rejected { status, body });
        }
        log::info!("sent {} report to {}", kind.as_str(), to);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mailer() -> SendGridMailer {
        SendGridMailer::new(
            SendGridConfig {
                api_key: "SG.test".to_string(),
                from_email: "evija@example.com".to_string(),
                from_name: "Evija".to_string(),
                reply_to: Some("evija@example.com".to_string()),
            },
            reqwest::Client::new(),
        )
    }

    fn report() -> GeneratedReport {
        GeneratedReport {
            filename: "GADA_PROGNOZE_15071990_2025.pdf".to_string(),
            pdf: b"%PDF-1.5 test".to_vec(),
            pages: 3,
        }
    }

    #[test]
    fn test_payload_shape() {
        let payload = mailer().build_payload("user@example.com", ReportKind::Forecast, &report());
        assert_eq!(
            payload["personalizations"][0]["to"][0]["email"],
            "user@example.com"
        );
        assert_eq!(payload["subject"], "Tava gada prognoze");
        assert_eq!(payload["from"]["email"], "evija@example.com");
        let attachment = &payload["attachments"][0];
        assert_eq!(attachment["type"], "application/pdf");
        assert_eq!(attachment["filename"], "GADA_PROGNOZE_15071990_2025.pdf");
        assert_eq!(
            attachment["content"],
            BASE64.encode(b"%PDF-1.5 test")
        );
        assert_eq!(payload["reply_to"]["email"], "evija@example.com");
    }

    #[test]
    fn test_from_env_reads_sendgrid_from() {
        std::env::set_var("SENDGRID_API_KEY", "SG.env");
        std::env::set_var("SENDGRID_FROM", "no-reply@example.com");
        std::env::remove_var("SENDGRID_FROM_NAME");
        std::env::remove_var("SENDGRID_REPLY_TO");
        let config = SendGridConfig::from_env().unwrap();
        assert_eq!(config.from_email, "no-reply@example.com");
        assert_eq!(config.from_name, "Evija");
        assert!(config.reply_to.is_none());
    }

    #[test]
    fn test_subjects_cover_every_kind() {
        for kind in [
            ReportKind::Personality,
            ReportKind::Child,
            ReportKind::Finances,
            ReportKind::Forecast,
            ReportKind::Compatibility,
        ] {
            assert!(!subject_for(kind).is_empty());
            assert!(body_for(kind).contains("Evija"));
        }
    }
}
