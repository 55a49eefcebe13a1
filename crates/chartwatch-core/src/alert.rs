//! Email alerts for symbols with detected trend changes

use crate::analysis::AlertLevel;
use crate::config::EmailConfig;
use crate::consensus::ConsensusOutcome;
use crate::error::{Result, WatchError};
use async_trait::async_trait;
use chrono::{DateTime, Local};
use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Message, SmtpTransport, Transport};
use tracing::{error, info, warn};

/// Delivers alerts for a symbol's consensus outcome
#[async_trait]
pub trait AlertNotifier: Send + Sync {
    /// Whether the notifier has everything it needs to deliver
    fn is_configured(&self) -> bool;

    /// Deliver an alert; `Ok(false)` when delivery failed or was not possible
    async fn send(&self, outcome: &ConsensusOutcome, report: &str, symbol: &str) -> Result<bool>;
}

/// Subject line, by severity
pub fn alert_subject(level: AlertLevel, symbol: &str) -> String {
    match level {
        AlertLevel::Critical => format!("[CRITICAL] STOCK ALERT - {symbol} - Major Trend Changes"),
        AlertLevel::High => format!("[WARN] HIGH STOCK ALERT - {symbol} - Significant Changes"),
        AlertLevel::Medium => format!("[DATA] MEDIUM STOCK ALERT - {symbol} - Notable Changes"),
        AlertLevel::Low | AlertLevel::Info => {
            format!("[INFO] Stock Update - {symbol} - Changes Detected")
        }
    }
}

/// Plain-text body: the outcome, then the complete report
pub fn alert_body(
    outcome: &ConsensusOutcome,
    report: &str,
    symbol: &str,
    generated_at: DateTime<Local>,
) -> String {
    let rule = "=".repeat(60);
    let reasoning = if outcome.probability_reasoning.trim().is_empty() {
        "No reasoning provided"
    } else {
        outcome.probability_reasoning.trim()
    };

    let mut body = format!("Stock Analysis Alert for {symbol}\n");
    body.push_str(&format!(
        "Generated: {}\n\n",
        generated_at.format("%Y-%m-%d %H:%M:%S")
    ));
    body.push_str(&format!(
        "ALERT LEVEL: {}\n",
        outcome.alert_level.as_str().to_uppercase()
    ));
    body.push_str(&format!(
        "TREND CHANGE PROBABILITY: {:.1}% (Confidence: {})\n\n",
        outcome.trend_change_probability,
        outcome.confidence_level.to_uppercase()
    ));
    body.push_str(&format!("SUMMARY:\n{}\n\n", outcome.summary));
    body.push_str(&format!("REASONING:\n{reasoning}\n\n"));

    body.push_str("KEY CHANGES:\n");
    if outcome.key_changes.is_empty() {
        body.push_str("- No specific changes identified\n");
    } else {
        for change in &outcome.key_changes {
            body.push_str(&format!("- {change}\n"));
        }
    }

    body.push_str(&format!("\n{rule}\nCOMPLETE ANALYSIS REPORT\n{rule}\n\n"));
    body.push_str(report.trim());
    body.push_str("\n\n---\nThis alert was generated automatically by chartwatch.\n");
    body
}

/// SMTP delivery with STARTTLS and login credentials
#[derive(Debug, Clone)]
pub struct EmailNotifier {
    config: EmailConfig,
}

impl EmailNotifier {
    pub fn new(config: EmailConfig) -> Self {
        Self { config }
    }

    fn build_message(&self, from: &str, to: &str, subject: String, body: String) -> Result<Message> {
        let from: Mailbox = from
            .parse()
            .map_err(|e| WatchError::Email(format!("invalid sender '{from}': {e}")))?;

        let mut builder = Message::builder().from(from);
        for recipient in to.split(',').map(str::trim).filter(|r| !r.is_empty()) {
            let mailbox: Mailbox = recipient
                .parse()
                .map_err(|e| WatchError::Email(format!("invalid recipient '{recipient}': {e}")))?;
            builder = builder.to(mailbox);
        }

        builder
            .subject(subject)
            .header(ContentType::TEXT_PLAIN)
            .body(body)
            .map_err(|e| WatchError::Email(e.to_string()))
    }
}

#[async_trait]
impl AlertNotifier for EmailNotifier {
    fn is_configured(&self) -> bool {
        self.config.is_configured()
    }

    async fn send(&self, outcome: &ConsensusOutcome, report: &str, symbol: &str) -> Result<bool> {
        let (Some(user), Some(password), Some(to)) =
            (&self.config.user, &self.config.password, &self.config.to)
        else {
            warn!("Email not configured, skipping alert for {}", symbol);
            return Ok(false);
        };

        if !outcome.has_changes {
            info!("No significant changes for {}, no email sent", symbol);
            return Ok(true);
        }

        let subject = alert_subject(outcome.alert_level, symbol);
        let body = alert_body(outcome, report, symbol, Local::now());
        let message = match self.build_message(user, to, subject.clone(), body) {
            Ok(message) => message,
            Err(e) => {
                warn!("Cannot build email alert for {}: {}", symbol, e);
                return Ok(false);
            }
        };

        let credentials = Credentials::new(user.clone(), password.clone());
        let server = self.config.smtp_server.clone();
        let port = self.config.smtp_port;

        let delivery = tokio::task::spawn_blocking(move || {
            let transport = SmtpTransport::starttls_relay(&server)?
                .port(port)
                .credentials(credentials)
                .build();
            transport.send(&message)
        })
        .await;

        match delivery {
            Ok(Ok(_)) => {
                info!("Email alert sent for {}: {}", symbol, subject);
                Ok(true)
            }
            Ok(Err(e)) => {
                error!("Failed to send email alert for {}: {}", symbol, e);
                Ok(false)
            }
            Err(e) => {
                error!("Email task failed for {}: {}", symbol, e);
                Ok(false)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn outcome(level: AlertLevel, has_changes: bool) -> ConsensusOutcome {
        ConsensusOutcome {
            has_changes,
            alert_level: level,
            summary: "Consensus from 2 providers: breakout".into(),
            trend_change_probability: 72.5,
            confidence_level: "high".into(),
            provider_count: 2,
            provider_agreement: 50.0,
            consolidator_decision: false,
            key_changes: vec!["+RD formed".into(), "UT Bot BUY".into()],
            probability_reasoning: String::new(),
        }
    }

    fn configured() -> EmailConfig {
        EmailConfig {
            user: Some("bot@example.com".into()),
            password: Some("secret".into()),
            to: Some("trader@example.com, desk@example.com".into()),
            ..EmailConfig::default()
        }
    }

    #[test]
    fn test_subjects() {
        assert_eq!(
            alert_subject(AlertLevel::Critical, "QBTS"),
            "[CRITICAL] STOCK ALERT - QBTS - Major Trend Changes"
        );
        assert_eq!(
            alert_subject(AlertLevel::High, "QBTS"),
            "[WARN] HIGH STOCK ALERT - QBTS - Significant Changes"
        );
        assert_eq!(
            alert_subject(AlertLevel::Medium, "QBTS"),
            "[DATA] MEDIUM STOCK ALERT - QBTS - Notable Changes"
        );
        assert_eq!(
            alert_subject(AlertLevel::Info, "QBTS"),
            "[INFO] Stock Update - QBTS - Changes Detected"
        );
    }

    #[test]
    fn test_body() {
        let at = Local.with_ymd_and_hms(2025, 3, 14, 10, 30, 0).unwrap();
        let body = alert_body(&outcome(AlertLevel::High, true), "CLAUDE ANALYSIS\n...", "QBTS", at);

        assert!(body.starts_with("Stock Analysis Alert for QBTS\nGenerated: 2025-03-14 10:30:00"));
        assert!(body.contains("ALERT LEVEL: HIGH"));
        assert!(body.contains("TREND CHANGE PROBABILITY: 72.5% (Confidence: HIGH)"));
        assert!(body.contains("REASONING:\nNo reasoning provided"));
        assert!(body.contains("KEY CHANGES:\n- +RD formed\n- UT Bot BUY\n"));
        assert!(body.contains("COMPLETE ANALYSIS REPORT\n"));
        assert!(body.contains("CLAUDE ANALYSIS\n..."));
    }

    #[test]
    fn test_body_without_key_changes() {
        let mut outcome = outcome(AlertLevel::Low, true);
        outcome.key_changes.clear();
        let body = alert_body(&outcome, "", "QBTS", Local::now());
        assert!(body.contains("- No specific changes identified"));
    }

    #[test]
    fn test_message_accepts_recipient_list() {
        let notifier = EmailNotifier::new(configured());
        let message = notifier
            .build_message("bot@example.com", "trader@example.com, desk@example.com", "s".into(), "b".into())
            .unwrap();
        assert_eq!(message.envelope().to().len(), 2);

        assert!(matches!(
            notifier.build_message("not an address", "trader@example.com", "s".into(), "b".into()),
            Err(WatchError::Email(_))
        ));
    }

    #[test]
    fn test_unconfigured_is_not_sent() {
        let notifier = EmailNotifier::new(EmailConfig::default());
        assert!(!notifier.is_configured());
        let sent = tokio_test::assert_ok!(tokio_test::block_on(notifier.send(
            &outcome(AlertLevel::High, true),
            "report",
            "QBTS"
        )));
        assert!(!sent);
    }

    #[tokio::test]
    async fn test_invalid_address_is_not_an_error() {
        let notifier = EmailNotifier::new(EmailConfig {
            to: Some("not an address".into()),
            ..configured()
        });
        let sent = notifier
            .send(&outcome(AlertLevel::High, true), "report", "QBTS")
            .await
            .unwrap();
        assert!(!sent);
    }

    #[tokio::test]
    async fn test_no_changes_skips_delivery() {
        let notifier = EmailNotifier::new(configured());
        assert!(notifier.is_configured());
        let sent = notifier
            .send(&outcome(AlertLevel::Low, false), "report", "QBTS")
            .await
            .unwrap();
        assert!(sent);
    }
}
