//! LLM-backed triage: classify a posting against the user's developer
//! interests, and rewrite the template cover letter for a selected posting.

use async_trait::async_trait;
use chrono::Local;
use tracing::warn;

use ai_client::{util, ChatMessage, ChatRequest, OpenRouter};
use scopemate_common::{FitJudgment, ScopeError};

use crate::traits::{Classifier, LetterWriter};

/// Descriptions are truncated before the request to stay inside the
/// context window of the free-tier models.
const MAX_DESCRIPTION_BYTES: usize = 30_000;

const FIT_SYSTEM_PROMPT: &str = r#"You are an AI assistant that analyzes a job title and job description.

Your task is to determine:
  1) Is it a "developer role"?
  2) If yes, does it align with the user's developer interests listed below?

The user's primary developer interests are:
  - Frontend
  - Backend
  - Full Stack
  - Web Development
  - Mobile App Development
  - Game Development
  - QA Automation / Testing

Your final answer must be valid JSON **only** in this exact format:
  {
    "isDev": boolean,
    "isFit": boolean,
    "reason": string
  }

Where:
  - "isDev" is true if the job is a software, web, or app developer role of any kind, else false.
  - "isFit" is true if it specifically matches one (or more) of the user's interests listed above, else false.
  - "reason" is a short sentence explaining your reasoning.

Do NOT include triple backticks, code fences, or any text outside the JSON object."#;

const LETTER_SYSTEM_PROMPT: &str = r#"You are an expert AI assistant that revises cover letters according to a given template and new job details.
You only output the updated cover letter text - no extraneous comments, disclaimers, or markdown.

Instructions:
  1. Use the original cover letter structure and wording as much as possible.
  2. Replace references to the old company name and address with the new ones.
  3. Update the "Re:" line, the first paragraph, and the final paragraph to reflect the new company details and role.
  4. Insert today's date.
  5. If the job description does NOT provide a valid company address or postal code, leave a placeholder noting the address is unknown.
  6. Use simpler language where it improves clarity.
  7. Keep the tone confident but not overly formal.
  8. Absolutely do not include anything outside of the cover letter text (no code fences, no triple backticks, no disclaimers)."#;

const LETTER_TEMPLATE: &str = r#"
  February 18, 2025

  Example Networks
  123 Harbour St,
  Vancouver, BC V6A 1A1

  Re: Software Development Co-op - May 2025 - Example Networks (Vancouver)

  Dear Hiring Manager,

  As a Software Developer drawn to teams that build online services at
  real scale, I am excited to apply for this Software Development Co-op
  opportunity at Example Networks. With a strong foundation in
  object-oriented design, data structures, and hands-on experience in
  Python, C++, and JavaScript, I am confident I would contribute quickly.

  Among my relevant projects, I built a full-stack multiplayer card game
  platform with MySQL, Node.js, and Express.js, managing players,
  memberships, and match data across multiple pages. The project followed
  an MVC architecture behind a RESTful API, with cookie and local-storage
  based session handling, a responsive EJS front end, form validation,
  and asynchronous data fetching. On the backend I wrote parameterized
  SQL templates and input sanitization to close off injection attacks.
  The work strengthened my ability to design maintainable architectures
  and debug across the whole stack.

  Beyond the technical side, coaching a competitive sports team sharpened
  my communication and leadership: I collaborated with other coaches,
  reviewed many hours of match footage, and gave targeted feedback. Those
  habits transfer directly to fast-paced, team-oriented agile work.

  I would welcome the chance to bring this experience to your team, and
  I am happy to arrange an interview through my co-op office at any time.

  Best regards,

  A. Student
"#;

pub struct TriageAdvisor {
    client: OpenRouter,
    model: String,
}

impl TriageAdvisor {
    pub fn new(client: OpenRouter, model: &str) -> Self {
        Self {
            client,
            model: model.to_string(),
        }
    }
}

#[async_trait]
impl Classifier for TriageAdvisor {
    async fn judge(&self, title: &str, description: &str) -> FitJudgment {
        let description = util::truncate_to_char_boundary(description, MAX_DESCRIPTION_BYTES);
        let user = format!(
            "Title: {title}\n\nDescription: {description}\n\n\
             Return valid JSON only, in the specified format. No extra text or markdown."
        );

        let raw = match self.client.complete(&self.model, FIT_SYSTEM_PROMPT, &user).await {
            Ok(raw) => raw,
            Err(e) => {
                warn!(error = %e, "Classifier request failed, defaulting to non-fit");
                return FitJudgment::non_fit("No valid response from AI");
            }
        };

        parse_judgment(&raw)
    }
}

#[async_trait]
impl LetterWriter for TriageAdvisor {
    async fn compose(&self, company: &str, description: &str) -> Result<String, ScopeError> {
        if description.trim().is_empty() {
            return Err(ScopeError::EmptyDescription);
        }

        let today = letter_date();
        let description = util::truncate_to_char_boundary(description, MAX_DESCRIPTION_BYTES);
        let user = format!(
            "Today's Date: {today}\n\
             Company Name: {company}\n\
             Original Cover Letter: {LETTER_TEMPLATE}\n\
             Job Description: {description}\n\n\
             Rewrite the cover letter to match these new details. \
             Output only the revised cover letter text."
        );

        let request = ChatRequest::new(
            &self.model,
            vec![
                ChatMessage::system(LETTER_SYSTEM_PROMPT),
                ChatMessage::user(user),
            ],
        );
        let response = self
            .client
            .chat(&request)
            .await
            .map_err(|e| ScopeError::Model(e.to_string()))?;

        // An empty or contentless response is an empty letter, not an error.
        let letter = response
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .unwrap_or_default();
        Ok(letter.trim().to_string())
    }
}

/// Today's date as "Month D, YYYY" on the local calendar. A UTC stamp
/// would roll over to tomorrow during evening runs west of Greenwich.
fn letter_date() -> String {
    Local::now().format("%B %-d, %Y").to_string()
}

/// Strict parse of the classifier response: strip fences, then require the
/// full JSON shape. Anything else becomes the documented default.
pub fn parse_judgment(raw: &str) -> FitJudgment {
    let cleaned = util::strip_code_blocks(raw);
    match serde_json::from_str::<FitJudgment>(cleaned) {
        Ok(judgment) => judgment,
        Err(e) => {
            warn!(error = %e, "Classifier returned unparsable JSON, defaulting to non-fit");
            FitJudgment::non_fit("Parsing error")
        }
    }
}
