//! Login, registration and logout.
//!
//! Credentials are validated locally first; a malformed email never reaches
//! the auth service. Passwords stay wrapped in `SecretString` until the
//! request body is serialized.

use secrecy::SecretString;
use tracing::{info, instrument};

use shopfront_core::Email;

use crate::api::StoreApi;
use crate::app::Storefront;
use crate::error::{AppError, add_breadcrumb};
use crate::notice::Notice;
use crate::router::Section;

fn parse_email(raw: &str) -> Result<Email, AppError> {
    Email::parse(raw).map_err(|e| AppError::InvalidInput(format!("Invalid email: {e}")))
}

impl<A: StoreApi> Storefront<A> {
    /// Log in and persist the returned token.
    ///
    /// Success shows the home section; failure leaves the view unchanged.
    #[instrument(skip(self, password))]
    pub async fn login(&self, email: &str, password: &SecretString) -> bool {
        let result = async {
            let email = parse_email(email)?;
            let token = self.api().login(&email, password).await?;
            self.session().set_token(&token)?;
            Ok::<_, AppError>(())
        }
        .await;

        match result {
            Ok(()) => {
                info!("Logged in");
                add_breadcrumb("auth", "Logged in", None);
                self.notify(Notice::info("Login successful!"));
                self.router().show(Section::Home);
                true
            }
            Err(e) => {
                let notice = e.report("login");
                self.notify(Notice::error(format!("Login failed: {}", notice.message)));
                false
            }
        }
    }

    /// Create an account.
    ///
    /// Success surfaces the service's message and shows the login section.
    #[instrument(skip(self, password))]
    pub async fn register(&self, username: &str, email: &str, password: &SecretString) -> bool {
        let result = async {
            let username = username.trim();
            if username.is_empty() {
                return Err(AppError::InvalidInput("Username is required".to_string()));
            }
            let email = parse_email(email)?;
            Ok::<_, AppError>(self.api().register(username, &email, password).await?)
        }
        .await;

        match result {
            Ok(message) => {
                info!("Registered");
                self.notify(Notice::info(message));
                self.router().show(Section::Login);
                true
            }
            Err(e) => {
                let notice = e.report("register");
                self.notify(Notice::error(format!(
                    "Registration failed: {}",
                    notice.message
                )));
                false
            }
        }
    }

    /// Forget the session and return home.
    #[instrument(skip(self))]
    pub fn logout(&self) {
        match self.session().clear_token() {
            Ok(()) => {
                add_breadcrumb("auth", "Logged out", None);
                self.notify(Notice::info("Logged out"));
                self.router().show(Section::Home);
            }
            Err(e) => self.notify(AppError::from(e).report("logout")),
        }
    }
}
