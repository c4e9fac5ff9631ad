//! Authentication state machine for the SCOPE portal: reuse the persisted
//! profile when it still authenticates, otherwise drive the CWL single
//! sign-on handshake through to the out-of-band 2FA approval.

use std::time::Duration;

use chromiumoxide::{Element, Page};
use tracing::info;

use scopemate_common::{Credentials, ScopeError};

use crate::wait::{self, wait_until};

/// Bounded wait for handshake selectors. Missing selectors here are fatal.
const SELECTOR_TIMEOUT: Duration = Duration::from_secs(15);
/// Keystroke pacing; instant fills trip the IdP's anti-automation checks.
const KEYSTROKE_DELAY: Duration = Duration::from_millis(100);
const URL_POLL_INTERVAL: Duration = Duration::from_secs(1);

const SSO_TRIGGER: &str = r#"a[href*="Shibboleth.sso"]"#;
const USERNAME_FIELD: &str = "#username";
const PASSWORD_FIELD: &str = "#password";
const SUBMIT_BUTTON: &str = r#"button[name="_eventId_proceed"]"#;

const NOT_LOGGED_IN_MARKER: &str = "notLoggedIn";
const DASHBOARD_MARKER: &str = "/myAccount/dashboard.htm";

pub struct SessionManager {
    base_url: String,
    credentials: Credentials,
}

impl SessionManager {
    pub fn new(base_url: &str, credentials: Credentials) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            credentials,
        }
    }

    pub fn postings_url(&self) -> String {
        format!("{}/myAccount/co-op/postings.htm", self.base_url)
    }

    fn login_url(&self) -> String {
        format!("{}/students/cwl-current-student-login.htm", self.base_url)
    }

    /// Leave `page` on the authenticated postings view, logging in first
    /// if the persisted profile no longer carries a valid session.
    pub async fn ensure_authenticated(&self, page: &Page) -> Result<(), ScopeError> {
        page.goto(self.postings_url()).await.map_err(auth_err)?;
        page.wait_for_navigation().await.map_err(auth_err)?;

        if !current_url(page).await?.contains(NOT_LOGGED_IN_MARKER) {
            info!("Already logged in using session cache");
            return Ok(());
        }

        info!("Not logged in, performing CWL login");
        page.goto(self.login_url()).await.map_err(auth_err)?;

        let trigger = wait::wait_for_selector(page, SSO_TRIGGER, SELECTOR_TIMEOUT)
            .await
            .map_err(|_| ScopeError::Auth(format!("SSO trigger {SSO_TRIGGER} never appeared")))?;
        trigger.click().await.map_err(auth_err)?;
        page.wait_for_navigation().await.map_err(auth_err)?;

        let username = wait::wait_for_selector(page, USERNAME_FIELD, SELECTOR_TIMEOUT)
            .await
            .map_err(|_| {
                ScopeError::Auth(format!("Username field {USERNAME_FIELD} never appeared"))
            })?;
        type_paced(&username, &self.credentials.username).await?;

        let password = page.find_element(PASSWORD_FIELD).await.map_err(auth_err)?;
        type_paced(&password, &self.credentials.password).await?;

        page.find_element(SUBMIT_BUTTON)
            .await
            .map_err(auth_err)?
            .click()
            .await
            .map_err(auth_err)?;
        page.wait_for_navigation().await.map_err(auth_err)?;

        info!("Waiting for 2FA approval on your device (no timeout)");
        self.await_dashboard(page).await?;
        info!("2FA complete, logged in");

        page.goto(self.postings_url()).await.map_err(auth_err)?;
        page.wait_for_navigation().await.map_err(auth_err)?;
        Ok(())
    }

    /// Unbounded by design: approval latency is a human on a phone, not
    /// something this process controls.
    async fn await_dashboard(&self, page: &Page) -> Result<(), ScopeError> {
        wait_until(
            || {
                let page = page.clone();
                async move {
                    match page.url().await {
                        Ok(Some(url)) if url.contains(DASHBOARD_MARKER) => Some(()),
                        _ => None,
                    }
                }
            },
            URL_POLL_INTERVAL,
            None,
        )
        .await
        .map_err(|e| ScopeError::Auth(e.to_string()))
    }
}

async fn current_url(page: &Page) -> Result<String, ScopeError> {
    let url = page.url().await.map_err(auth_err)?;
    Ok(url.unwrap_or_default())
}

/// Type one keystroke at a time with a fixed delay between characters.
async fn type_paced(field: &Element, text: &str) -> Result<(), ScopeError> {
    field.click().await.map_err(auth_err)?;
    for ch in text.chars() {
        field
            .type_str(ch.to_string())
            .await
            .map_err(auth_err)?;
        tokio::time::sleep(KEYSTROKE_DELAY).await;
    }
    Ok(())
}

fn auth_err(e: impl std::fmt::Display) -> ScopeError {
    ScopeError::Auth(e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn urls_are_joined_without_doubled_slashes() {
        let manager = SessionManager::new(
            "https://scope.example.ca/",
            Credentials {
                username: "u".into(),
                password: "p".into(),
            },
        );
        assert_eq!(
            manager.postings_url(),
            "https://scope.example.ca/myAccount/co-op/postings.htm"
        );
        assert_eq!(
            manager.login_url(),
            "https://scope.example.ca/students/cwl-current-student-login.htm"
        );
    }
}
