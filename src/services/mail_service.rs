//! Alert email assembly and SMTP delivery

use std::time::Duration;

use chrono::NaiveDate;
use lettre::message::header::ContentType;
use lettre::message::{Attachment, Body, Mailbox, MultiPart, SinglePart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use thiserror::Error;

use crate::config::MonitorConfig;
use crate::models::Alert;

const SEND_TIMEOUT: Duration = Duration::from_secs(30);

/// Errors while assembling or delivering an alert email
#[derive(Debug, Error)]
pub enum MailError {
    #[error("Invalid email address: {0}")]
    Address(#[from] lettre::address::AddressError),
    #[error("Invalid attachment content type: {0}")]
    ContentType(#[from] lettre::message::header::ContentTypeErr),
    #[error("Failed to assemble message: {0}")]
    Message(#[from] lettre::error::Error),
    #[error("SMTP transport error: {0}")]
    Transport(#[from] lettre::transport::smtp::Error),
}

/// SMTP mailer delivering one HTML email per alert batch
pub struct Mailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    sender: Mailbox,
    recipient: Mailbox,
}

impl Mailer {
    /// Build an implicit-TLS transport on the configured server and
    /// port 465, authenticated with the sender credentials.
    pub fn from_config(config: &MonitorConfig) -> Result<Self, MailError> {
        let transport = AsyncSmtpTransport::<Tokio1Executor>::relay(&config.smtp_server)?
            .port(config.smtp_port)
            .credentials(Credentials::new(
                config.sender_email.clone(),
                config.sender_password.clone(),
            ))
            .timeout(Some(SEND_TIMEOUT))
            .build();

        Ok(Self {
            transport,
            sender: config.sender_email.parse()?,
            recipient: config.recipient_email.parse()?,
        })
    }

    /// Send one email carrying the whole alert batch: an HTML card per
    /// alert plus inline PNG parts for the attached charts.
    pub async fn send_alerts(&self, alerts: &[Alert], date: NaiveDate) -> Result<(), MailError> {
        let subject = format!("Financial Alert - {}", date.format("%Y-%m-%d"));

        let mut related = MultiPart::related().singlepart(
            SinglePart::builder()
                .header(ContentType::TEXT_HTML)
                .body(build_html_body(alerts, date)),
        );

        let png = ContentType::parse("image/png")?;
        for (idx, alert) in alerts.iter().enumerate() {
            if let Some(chart) = &alert.chart {
                related = related.singlepart(
                    Attachment::new_inline(format!("chart_{}", idx))
                        .body(Body::new(chart.clone()), png.clone()),
                );
            }
        }

        let message = Message::builder()
            .from(self.sender.clone())
            .to(self.recipient.clone())
            .subject(subject)
            .multipart(related)?;

        self.transport.send(message).await?;
        Ok(())
    }
}

/// HTML body: gradient header with the date, one card per alert (message
/// colored red for drops), inline chart image when one was rendered.
pub fn build_html_body(alerts: &[Alert], date: NaiveDate) -> String {
    let mut body = format!(
        r#"<html>
  <body style="margin:0;padding:0;font-family:Arial,Helvetica,sans-serif;background:#f0f2f5;">
    <div style="max-width:800px;margin:20px auto;padding:0 15px;">
      <div style="background:linear-gradient(135deg,#34495e,#2ecc71);padding:20px;border-radius:12px 12px 0 0;text-align:center;color:#fff;">
        <h1 style="margin:0;font-size:26px;">&#128202; Financial Alert</h1>
        <p style="margin:5px 0 0;font-size:14px;">{}</p>
      </div>"#,
        date.format("%Y-%m-%d")
    );

    for (idx, alert) in alerts.iter().enumerate() {
        let color = if alert.message.contains('-') {
            "#e74c3c"
        } else {
            "#27ae60"
        };

        body.push_str(&format!(
            r#"
      <div style="background:#ffffff;border-radius:10px;padding:18px;margin-top:20px;box-shadow:0 4px 16px rgba(0,0,0,0.08);">
        <p style="margin:0 0 8px;font-size:16px;">
          <strong style="font-size:18px;color:#34495e;">{} - {}</strong>
        </p>
        <p style="margin:0 0 12px;font-size:14px;color:{};line-height:1.5;">
          {}
        </p>"#,
            alert.symbol, alert.name, color, alert.message
        ));

        if alert.chart.is_some() {
            body.push_str(&format!(
                r#"
        <div style="text-align:center;margin-top:10px;">
          <img src="cid:chart_{idx}" alt="Chart {idx}" style="max-width:100%;border-radius:8px;border:1px solid #ddd;box-shadow:0 2px 8px rgba(0,0,0,0.05);"/>
        </div>"#
            ));
        }

        body.push_str("\n      </div>");
    }

    body.push_str(
        r#"
      <div style="text-align:center;margin-top:30px;font-size:12px;color:#999;">
        <p>Sent automatically by <strong>vigil</strong></p>
      </div>
    </div>
  </body>
</html>"#,
    );

    body
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Period;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 1).unwrap()
    }

    #[test]
    fn test_body_has_one_card_per_alert() {
        let alerts = vec![
            Alert::new("SP500", "^GSPC", Period::Daily, "SP500: -3.00% (daily) - Price: $4000.00".to_string()),
            Alert::new("Gold", "GC=F", Period::Weekly, "Gold: -6.00% (weekly) - Price: $1800.00".to_string()),
        ];

        let body = build_html_body(&alerts, date());

        assert_eq!(body.matches("^GSPC - SP500").count(), 1);
        assert_eq!(body.matches("GC=F - Gold").count(), 1);
        assert!(body.contains("2024-03-01"));
    }

    #[test]
    fn test_chart_cid_tracks_alert_position() {
        // Only the second alert has a chart: the body must reference
        // chart_1 and nothing else.
        let mut charted = Alert::new("Gold", "GC=F", Period::Daily, "Gold: -2.10% (daily) - Price: $1800.00".to_string());
        charted.attach_chart(vec![0u8; 8]);
        let alerts = vec![
            Alert::new("SP500", "^GSPC", Period::Daily, "SP500: -3.00% (daily) - Price: $4000.00".to_string()),
            charted,
        ];

        let body = build_html_body(&alerts, date());

        assert!(!body.contains("cid:chart_0"));
        assert!(body.contains("cid:chart_1"));
    }

    #[test]
    fn test_drop_messages_are_colored_red() {
        let alerts = vec![Alert::new(
            "Bitcoin",
            "BTC-USD",
            Period::Monthly,
            "Bitcoin: -11.00% (monthly) - Price: $30000.00".to_string(),
        )];

        let body = build_html_body(&alerts, date());
        assert!(body.contains("#e74c3c"));
    }
}
