use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct MailAddress {
    name: String,
    email: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Smtp {
    url: String,
    username: String,
    password: String,
    #[serde(default)]
    use_starttls: bool,
}

/// The `[mail]` table of the config file: the sender identity and the SMTP
/// account used to deliver invoices.
#[derive(Debug, Clone, Deserialize)]
pub struct Mail {
    from: MailAddress,
    smtp: Smtp,
}

#[cfg(feature = "lettre")]
mod transport {
    use std::fs;
    use std::path::Path;

    use anyhow::Context;
    use lettre::message::header::ContentType;
    use lettre::message::{Attachment, Mailbox, MultiPart, SinglePart};
    use lettre::transport::smtp::authentication::Credentials;
    use lettre::transport::smtp::SmtpTransport;
    use lettre::{Message, Transport};
    use log::info;

    use super::{Mail, MailAddress, Smtp};

    impl MailAddress {
        fn mailbox(&self) -> anyhow::Result<Mailbox> {
            Ok(Mailbox::new(
                Some(self.name.clone()),
                self.email
                    .parse()
                    .with_context(|| format!("invalid sender address \"{}\"", self.email))?,
            ))
        }
    }

    impl Smtp {
        fn to_transport(&self) -> anyhow::Result<SmtpTransport> {
            let relay = self.url.as_str();
            let transport = {
                if self.use_starttls {
                    SmtpTransport::starttls_relay(relay)
                } else {
                    SmtpTransport::relay(relay)
                }
            }
            .with_context(|| format!("invalid smtp relay \"{}\"", relay))?;

            Ok(transport
                .credentials(Credentials::new(
                    self.username.clone(),
                    self.password.clone(),
                ))
                .build())
        }
    }

    fn attachment_from_file(path: &Path) -> anyhow::Result<SinglePart> {
        Ok(Attachment::new(
            path.file_name()
                .ok_or_else(|| {
                    anyhow::anyhow!("missing file_name in path \"{}\"", path.display())
                })?
                .to_str()
                .ok_or_else(|| {
                    anyhow::anyhow!(
                        "failed to convert path to a unicode string: \"{}\"",
                        path.display()
                    )
                })?
                .to_string(),
        )
        .body(fs::read(path)?, ContentType::parse("application/pdf")?))
    }

    impl Mail {
        /// Checks that the SMTP account accepts our credentials without
        /// sending anything.
        pub fn validate(&self) -> anyhow::Result<()> {
            let transport = self.smtp.to_transport()?;
            transport
                .test_connection()
                .context("failed to connect to the smtp server")
                .and_then(|ok| {
                    ok.then_some(())
                        .context("the smtp server rejected the credentials")
                })
        }

        /// Sends one invoice: plain-text body plus the exported pdf.
        pub fn send_invoice(
            &self,
            to: &str,
            subject: &str,
            body: &str,
            attachment: &Path,
        ) -> anyhow::Result<()> {
            let email = Message::builder()
                .from(self.from.mailbox()?)
                .to(to
                    .parse()
                    .with_context(|| format!("invalid recipient address \"{}\"", to))?)
                .subject(subject)
                .multipart(
                    MultiPart::mixed()
                        .singlepart(SinglePart::plain(body.to_string()))
                        .singlepart(attachment_from_file(attachment)?),
                )?;

            info!(
                "sending email to \"{}\" with subject \"{}\"",
                to, subject
            );

            self.smtp.to_transport()?.send(&email).with_context(|| {
                format!(
                    "failed to send email to \"{}\" with subject \"{}\"",
                    to, subject
                )
            })?;

            info!("sent email successfully");
            Ok(())
        }
    }
}
