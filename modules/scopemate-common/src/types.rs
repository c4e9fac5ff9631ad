use std::fmt;

use serde::{Deserialize, Serialize};

/// Portal login credentials. Never logged in full; the Debug impl redacts
/// the password so accidental `{:?}` prints stay safe.
#[derive(Clone)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// One job listing row. `company` is empty when the row has fewer than two
/// label cells; `description` stays `None` until the detail view has loaded.
#[derive(Debug, Clone)]
pub struct Posting {
    pub row: usize,
    pub title: String,
    pub company: String,
    pub description: Option<String>,
}

/// Structured classifier verdict for one posting. Wire format is the
/// camelCase JSON the model is instructed to return.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FitJudgment {
    pub is_dev: bool,
    pub is_fit: bool,
    #[serde(default)]
    pub reason: String,
}

impl FitJudgment {
    /// The safe default used whenever the classifier response is absent,
    /// malformed, or unparsable. Classification failures are never fatal.
    pub fn non_fit(reason: impl Into<String>) -> Self {
        Self {
            is_dev: false,
            is_fit: false,
            reason: reason.into(),
        }
    }
}

/// Counters from one triage run.
#[derive(Debug, Default)]
pub struct RunStats {
    pub rows_seen: u32,
    pub rows_without_action: u32,
    pub rows_skipped: u32,
    pub row_failures: u32,
    pub postings_classified: u32,
    pub descriptions_written: u32,
    pub letters_written: u32,
}

impl fmt::Display for RunStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "\n=== Run Complete ===")?;
        writeln!(f, "Rows seen:            {}", self.rows_seen)?;
        writeln!(f, "Rows without action:  {}", self.rows_without_action)?;
        writeln!(f, "Rows skipped:         {}", self.rows_skipped)?;
        writeln!(f, "Row failures:         {}", self.row_failures)?;
        writeln!(f, "Postings classified:  {}", self.postings_classified)?;
        writeln!(f, "Descriptions written: {}", self.descriptions_written)?;
        writeln!(f, "Cover letters:        {}", self.letters_written)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fit_judgment_uses_camel_case_on_the_wire() {
        let judgment: FitJudgment =
            serde_json::from_str(r#"{"isDev":true,"isFit":false,"reason":"x"}"#).unwrap();
        assert!(judgment.is_dev);
        assert!(!judgment.is_fit);
        assert_eq!(judgment.reason, "x");
    }

    #[test]
    fn fit_judgment_reason_defaults_to_empty() {
        let judgment: FitJudgment =
            serde_json::from_str(r#"{"isDev":true,"isFit":true}"#).unwrap();
        assert_eq!(judgment.reason, "");
    }

    #[test]
    fn fit_judgment_requires_both_flags() {
        assert!(serde_json::from_str::<FitJudgment>(r#"{"isDev":true}"#).is_err());
    }

    #[test]
    fn credentials_debug_redacts_password() {
        let creds = Credentials {
            username: "student".to_string(),
            password: "hunter2".to_string(),
        };
        let printed = format!("{creds:?}");
        assert!(printed.contains("student"));
        assert!(!printed.contains("hunter2"));
    }
}
