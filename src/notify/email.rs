// src/notify/email.rs
use std::fmt::Write as _;

use anyhow::{Context, Result};
use lettre::message::{header, Mailbox, Message};
use lettre::transport::smtp::{authentication::Credentials, AsyncSmtpTransport};
use lettre::{AsyncTransport, Tokio1Executor};

use super::Notifier;
use crate::posting::MatchedPosting;

pub struct EmailNotifier {
    mailer: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
    to: Mailbox,
}

impl EmailNotifier {
    /// SMTP settings come from the environment. Missing or invalid settings
    /// are a construction error; the caller decides whether that disables
    /// the channel or aborts.
    pub fn from_env() -> Result<Self> {
        let host = std::env::var("SMTP_HOST").context("SMTP_HOST missing")?;
        let user = std::env::var("SMTP_USER").context("SMTP_USER missing")?;
        let pass = std::env::var("SMTP_PASS").context("SMTP_PASS missing")?;
        let from_addr = std::env::var("NOTIFY_EMAIL_FROM").context("NOTIFY_EMAIL_FROM missing")?;
        let to_addr = std::env::var("NOTIFY_EMAIL_TO").context("NOTIFY_EMAIL_TO missing")?;

        let creds = Credentials::new(user, pass);
        let mailer = AsyncSmtpTransport::<Tokio1Executor>::relay(&host)
            .context("invalid SMTP_HOST")?
            .credentials(creds)
            .build();

        let from = from_addr.parse().context("invalid NOTIFY_EMAIL_FROM")?;
        let to = to_addr.parse().context("invalid NOTIFY_EMAIL_TO")?;

        Ok(Self { mailer, from, to })
    }

    fn render(postings: &[MatchedPosting]) -> String {
        let mut body = format!("New job postings have been found! ({} items)\n", postings.len());
        for (i, m) in postings.iter().enumerate() {
            let _ = write!(
                body,
                "\n[{}] {}\nCompany: {}\nLink: {}\nSource: {}\nSimilarity: {:.2}%\nMatched Keyword: {}\n",
                i + 1,
                m.posting.title,
                m.posting.company,
                m.posting.link,
                m.posting.source,
                m.score * 100.0,
                m.matched_keyword,
            );
        }
        let _ = write!(
            body,
            "\n---\nSent at: {}\n",
            chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
        );
        body
    }
}

#[async_trait::async_trait]
impl Notifier for EmailNotifier {
    async fn send(&self, postings: &[MatchedPosting]) -> Result<()> {
        let subject = format!("New job postings found! ({} items)", postings.len());
        let msg = Message::builder()
            .from(self.from.clone())
            .to(self.to.clone())
            .subject(subject)
            .header(header::ContentType::TEXT_PLAIN)
            .body(Self::render(postings))
            .context("build email")?;

        self.mailer.send(msg).await.context("send email")?;
        Ok(())
    }

    fn name(&self) -> &'static str {
        "email"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::posting::Posting;

    #[test]
    fn rendered_body_lists_every_posting() {
        let batch = vec![
            MatchedPosting {
                posting: Posting {
                    title: "Python Developer".into(),
                    company: "Acme".into(),
                    link: "https://jobs.example/1".into(),
                    detail: String::new(),
                    source: "example".into(),
                },
                score: 1.5,
                matched_keyword: "python".into(),
            },
            MatchedPosting {
                posting: Posting {
                    title: "백엔드 개발자".into(),
                    company: "Beta".into(),
                    link: "https://jobs.example/2".into(),
                    detail: String::new(),
                    source: "example".into(),
                },
                score: 0.9,
                matched_keyword: "백엔드 개발자".into(),
            },
        ];
        let body = EmailNotifier::render(&batch);
        assert!(body.contains("(2 items)"));
        assert!(body.contains("[1] Python Developer"));
        assert!(body.contains("[2] 백엔드 개발자"));
        assert!(body.contains("Similarity: 150.00%"));
    }
}
