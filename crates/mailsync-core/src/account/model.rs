//! Account model types.

use mailsync_imap::{Endpoint, SearchVariant};
use serde::{Deserialize, Serialize};

/// Mail provider family, determining which search variant to issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Provider {
    /// Gmail-family servers (supports the `X-GM-RAW` search extension).
    Gmail,
    /// Any standard IMAP server.
    #[default]
    Generic,
}

impl Provider {
    /// Detects the provider from an email address domain.
    #[must_use]
    pub fn detect(email: &str) -> Self {
        match email.rsplit('@').next().map(str::to_lowercase).as_deref() {
            Some("gmail.com" | "googlemail.com") => Self::Gmail,
            _ => Self::Generic,
        }
    }

    /// Returns the search variant this provider understands.
    #[must_use]
    pub const fn search_variant(self) -> SearchVariant {
        match self {
            Self::Gmail => SearchVariant::GmailRaw,
            Self::Generic => SearchVariant::Text,
        }
    }

    /// Get display name for the provider.
    #[must_use]
    pub const fn display_name(self) -> &'static str {
        match self {
            Self::Gmail => "Gmail",
            Self::Generic => "IMAP",
        }
    }
}

/// A configured mail account.
///
/// Loaded once per process invocation from the account store and immutable
/// for the duration of a sync pass. The password is an opaque bearer owned
/// by whatever provisioned the account; the core only forwards it to LOGIN.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Account {
    /// Email address (also the account identity).
    pub email: String,
    /// Provider family.
    pub provider: Provider,
    /// IMAP server hostname.
    pub imap_host: String,
    /// IMAP server port (993 for implicit TLS).
    pub imap_port: u16,
    /// Password or app-specific password.
    pub password: String,
}

impl Account {
    /// Creates an account with provider settings auto-detected from the
    /// email domain, where the domain is well known.
    #[must_use]
    pub fn with_email(email: &str) -> Self {
        let provider = Provider::detect(email);
        let mut account = Self {
            email: email.to_string(),
            provider,
            imap_port: 993,
            ..Default::default()
        };

        if provider == Provider::Gmail {
            account.imap_host = "imap.gmail.com".to_string();
        } else if let Some(domain) = email.split('@').nth(1) {
            match domain.to_lowercase().as_str() {
                "yahoo.com" => account.imap_host = "imap.mail.yahoo.com".to_string(),
                "outlook.com" | "hotmail.com" | "live.com" => {
                    account.imap_host = "outlook.office365.com".to_string();
                }
                other => account.imap_host = format!("imap.{other}"),
            }
        }

        account
    }

    /// Returns the endpoint to dial for this account.
    #[must_use]
    pub fn endpoint(&self) -> Endpoint {
        Endpoint::new(self.imap_host.clone(), self.imap_port)
    }
}
