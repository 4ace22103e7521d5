//! Requests asking the Tutor module to show something to the learner.

use std::fmt;
use std::sync::atomic::{AtomicU32, Ordering};

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::errors::CoreError;
use crate::validate::{self, Validate};

static NEXT_CHAT_ID: AtomicU32 = AtomicU32::new(1);

/// Next process-wide chat id. Ids start at 1 and never repeat.
pub fn next_chat_id() -> u32 {
    NEXT_CHAT_ID.fetch_add(1, Ordering::Relaxed)
}

// ---------------------------------------------------------------------------
// Chat windows
// ---------------------------------------------------------------------------

/// Open a new chat window in the tutor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct DisplayChatWindowRequest {
    chat_id: u32,
    chat_name: String,
    #[serde(default)]
    description: Option<String>,
    /// Let the learner skip the conversation.
    #[serde(default)]
    provide_bypass: bool,
    /// First entry shown in the window. Shares `chat_id` with this request.
    update: DisplayChatWindowUpdateRequest,
}

impl DisplayChatWindowRequest {
    /// Build a request for a fresh chat window, drawing its id from
    /// [`next_chat_id`].
    ///
    /// # Errors
    ///
    /// Returns `CoreError::InvalidArgument` if `chat_name` is blank or the
    /// opening text is invalid.
    pub fn new(
        chat_name: impl Into<String>,
        description: Option<String>,
        provide_bypass: bool,
        opening_text: impl Into<String>,
        choices: Vec<String>,
    ) -> Result<Self, CoreError> {
        let chat_name = chat_name.into();
        validate::non_blank("chat_name", &chat_name)?;
        let chat_id = next_chat_id();
        let update = DisplayChatWindowUpdateRequest::new(chat_id, opening_text, choices)?;
        Ok(Self {
            chat_id,
            chat_name,
            description,
            provide_bypass,
            update,
        })
    }

    #[must_use]
    pub const fn chat_id(&self) -> u32 {
        self.chat_id
    }

    #[must_use]
    pub fn chat_name(&self) -> &str {
        &self.chat_name
    }

    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    #[must_use]
    pub const fn provide_bypass(&self) -> bool {
        self.provide_bypass
    }

    #[must_use]
    pub const fn update(&self) -> &DisplayChatWindowUpdateRequest {
        &self.update
    }
}

impl Validate for DisplayChatWindowRequest {
    fn validate(&self) -> Result<(), CoreError> {
        validate::at_least_one("chat_id", self.chat_id)?;
        validate::non_blank("chat_name", &self.chat_name)?;
        self.update.validate()?;
        if self.update.chat_id != self.chat_id {
            return Err(CoreError::invalid(
                "update.chat_id",
                format!("expected {} but found {}", self.chat_id, self.update.chat_id),
            ));
        }
        Ok(())
    }
}

impl fmt::Display for DisplayChatWindowRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[DisplayChatWindowRequest: chatId = {}, chatName = {}, provideBypass = {}, update = {}]",
            self.chat_id, self.chat_name, self.provide_bypass, self.update
        )
    }
}

/// Add an entry to an open chat window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct DisplayChatWindowUpdateRequest {
    chat_id: u32,
    text: String,
    #[serde(default)]
    allow_free_response: bool,
    #[serde(default)]
    choices: Vec<String>,
}

impl DisplayChatWindowUpdateRequest {
    /// Free response is allowed exactly when no choices are offered.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::InvalidArgument` if `chat_id` is zero or `text` or
    /// any choice is blank.
    pub fn new(
        chat_id: u32,
        text: impl Into<String>,
        choices: Vec<String>,
    ) -> Result<Self, CoreError> {
        let request = Self {
            chat_id,
            text: text.into(),
            allow_free_response: choices.is_empty(),
            choices,
        };
        request.validate()?;
        Ok(request)
    }

    /// Offer choices and also accept typed answers.
    #[must_use]
    pub const fn with_free_response(mut self) -> Self {
        self.allow_free_response = true;
        self
    }

    #[must_use]
    pub const fn chat_id(&self) -> u32 {
        self.chat_id
    }

    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    #[must_use]
    pub const fn allow_free_response(&self) -> bool {
        self.allow_free_response
    }

    #[must_use]
    pub fn choices(&self) -> &[String] {
        &self.choices
    }
}

impl Validate for DisplayChatWindowUpdateRequest {
    fn validate(&self) -> Result<(), CoreError> {
        validate::at_least_one("chat_id", self.chat_id)?;
        validate::non_blank("text", &self.text)?;
        if !self.allow_free_response && self.choices.is_empty() {
            return Err(CoreError::invalid(
                "choices",
                "at least one choice is required when free response is not allowed",
            ));
        }
        for choice in &self.choices {
            validate::non_blank("choices", choice)?;
        }
        Ok(())
    }
}

impl fmt::Display for DisplayChatWindowUpdateRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[DisplayChatWindowUpdateRequest: chatId = {}, text = {}, allowFreeResponse = {}, choices = {:?}]",
            self.chat_id, self.text, self.allow_free_response, self.choices
        )
    }
}

// ---------------------------------------------------------------------------
// Feedback and guidance
// ---------------------------------------------------------------------------

/// Show a feedback message, optionally with an audio clip.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct DisplayFeedbackTutorRequest {
    text: String,
    #[serde(default)]
    audio_file: Option<String>,
    /// How long to keep the message up; `None` leaves it to the tutor.
    #[serde(default)]
    display_duration_ms: Option<u64>,
}

impl DisplayFeedbackTutorRequest {
    /// # Errors
    ///
    /// Returns `CoreError::InvalidArgument` if `text` is blank.
    pub fn new(text: impl Into<String>) -> Result<Self, CoreError> {
        let text = text.into();
        validate::non_blank("text", &text)?;
        Ok(Self {
            text,
            audio_file: None,
            display_duration_ms: None,
        })
    }

    /// # Errors
    ///
    /// Returns `CoreError::InvalidArgument` if `audio_file` is blank.
    pub fn with_audio_file(mut self, audio_file: impl Into<String>) -> Result<Self, CoreError> {
        let audio_file = audio_file.into();
        validate::non_blank("audio_file", &audio_file)?;
        self.audio_file = Some(audio_file);
        Ok(self)
    }

    #[must_use]
    pub const fn with_display_duration_ms(mut self, duration: u64) -> Self {
        self.display_duration_ms = Some(duration);
        self
    }

    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    #[must_use]
    pub fn audio_file(&self) -> Option<&str> {
        self.audio_file.as_deref()
    }

    #[must_use]
    pub const fn display_duration_ms(&self) -> Option<u64> {
        self.display_duration_ms
    }
}

impl Validate for DisplayFeedbackTutorRequest {
    fn validate(&self) -> Result<(), CoreError> {
        validate::non_blank("text", &self.text)?;
        validate::optional_non_blank("audio_file", self.audio_file())
    }
}

/// What a guidance request shows: inline text or a web page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum GuidanceContent {
    Text(String),
    Url(String),
}

/// Show guidance between course objects or during a lesson.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct DisplayGuidanceTutorRequest {
    content: GuidanceContent,
    #[serde(default)]
    fullscreen: bool,
    #[serde(default)]
    display_duration_ms: Option<u64>,
}

impl DisplayGuidanceTutorRequest {
    /// # Errors
    ///
    /// Returns `CoreError::InvalidArgument` if the text is blank.
    pub fn text(text: impl Into<String>) -> Result<Self, CoreError> {
        Self::from_content(GuidanceContent::Text(text.into()))
    }

    /// # Errors
    ///
    /// Returns `CoreError::InvalidArgument` if the url is blank.
    pub fn url(url: impl Into<String>) -> Result<Self, CoreError> {
        Self::from_content(GuidanceContent::Url(url.into()))
    }

    fn from_content(content: GuidanceContent) -> Result<Self, CoreError> {
        let request = Self {
            content,
            fullscreen: false,
            display_duration_ms: None,
        };
        request.validate()?;
        Ok(request)
    }

    #[must_use]
    pub const fn with_fullscreen(mut self, fullscreen: bool) -> Self {
        self.fullscreen = fullscreen;
        self
    }

    #[must_use]
    pub const fn with_display_duration_ms(mut self, duration: u64) -> Self {
        self.display_duration_ms = Some(duration);
        self
    }

    #[must_use]
    pub const fn content(&self) -> &GuidanceContent {
        &self.content
    }

    #[must_use]
    pub const fn fullscreen(&self) -> bool {
        self.fullscreen
    }

    #[must_use]
    pub const fn display_duration_ms(&self) -> Option<u64> {
        self.display_duration_ms
    }
}

impl Validate for DisplayGuidanceTutorRequest {
    fn validate(&self) -> Result<(), CoreError> {
        match &self.content {
            GuidanceContent::Text(text) => validate::non_blank("text", text),
            GuidanceContent::Url(url) => validate::non_blank("url", url),
        }
    }
}

// ---------------------------------------------------------------------------
// After-action review
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum AarEventKind {
    Lesson,
    Survey,
    Structured,
    Performance,
}

impl AarEventKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Lesson => "lesson",
            Self::Survey => "survey",
            Self::Structured => "structured",
            Self::Performance => "performance",
        }
    }
}

impl fmt::Display for AarEventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One course event summarized in the after-action review.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct AarEvent {
    name: String,
    start_ms: i64,
    end_ms: i64,
    kind: AarEventKind,
}

impl AarEvent {
    /// # Errors
    ///
    /// Returns `CoreError::InvalidArgument` if `name` is blank or the event
    /// ends before it starts.
    pub fn new(
        name: impl Into<String>,
        start_ms: i64,
        end_ms: i64,
        kind: AarEventKind,
    ) -> Result<Self, CoreError> {
        let event = Self {
            name: name.into(),
            start_ms,
            end_ms,
            kind,
        };
        event.validate()?;
        Ok(event)
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub const fn start_ms(&self) -> i64 {
        self.start_ms
    }

    #[must_use]
    pub const fn end_ms(&self) -> i64 {
        self.end_ms
    }

    #[must_use]
    pub const fn kind(&self) -> AarEventKind {
        self.kind
    }

    /// Saturates at `i64::MAX` for events spanning more than that.
    #[must_use]
    pub const fn duration_ms(&self) -> i64 {
        self.end_ms.saturating_sub(self.start_ms)
    }
}

impl Validate for AarEvent {
    fn validate(&self) -> Result<(), CoreError> {
        validate::non_blank("name", &self.name)?;
        if self.end_ms < self.start_ms {
            return Err(CoreError::invalid(
                "end_ms",
                format!("event {} ends before it starts", self.name),
            ));
        }
        Ok(())
    }
}

/// Show the after-action review for the events so far.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct DisplayAarTutorRequest {
    #[serde(default)]
    events: Vec<AarEvent>,
}

impl DisplayAarTutorRequest {
    #[must_use]
    pub const fn new(events: Vec<AarEvent>) -> Self {
        Self { events }
    }

    #[must_use]
    pub fn events(&self) -> &[AarEvent] {
        &self.events
    }
}

impl Validate for DisplayAarTutorRequest {
    fn validate(&self) -> Result<(), CoreError> {
        self.events.validate()
    }
}

// ---------------------------------------------------------------------------
// Surveys
// ---------------------------------------------------------------------------

/// Present a survey from the survey context.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct DisplaySurveyTutorRequest {
    survey_context_id: u32,
    /// Key of the survey inside its context.
    gift_key: String,
    #[serde(default)]
    full_screen: bool,
}

impl DisplaySurveyTutorRequest {
    /// # Errors
    ///
    /// Returns `CoreError::InvalidArgument` if `survey_context_id` is zero or
    /// `gift_key` is blank.
    pub fn new(survey_context_id: u32, gift_key: impl Into<String>) -> Result<Self, CoreError> {
        let request = Self {
            survey_context_id,
            gift_key: gift_key.into(),
            full_screen: false,
        };
        request.validate()?;
        Ok(request)
    }

    #[must_use]
    pub const fn with_full_screen(mut self, full_screen: bool) -> Self {
        self.full_screen = full_screen;
        self
    }

    #[must_use]
    pub const fn survey_context_id(&self) -> u32 {
        self.survey_context_id
    }

    #[must_use]
    pub fn gift_key(&self) -> &str {
        &self.gift_key
    }

    #[must_use]
    pub const fn full_screen(&self) -> bool {
        self.full_screen
    }
}

impl Validate for DisplaySurveyTutorRequest {
    fn validate(&self) -> Result<(), CoreError> {
        validate::at_least_one("survey_context_id", self.survey_context_id)?;
        validate::non_blank("gift_key", &self.gift_key)
    }
}
