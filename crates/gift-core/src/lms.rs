//! LMS course records: the long-term store of a learner's graded history.
//!
//! `LmsCourseRecords` keeps a per-domain index that is built on first read and
//! thrown away whenever records are added. Mutation needs `&mut self`, so a
//! reader can never observe an index older than the record list.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::sync::OnceLock;

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::enums::AssessmentLevel;
use crate::errors::CoreError;
use crate::validate::{self, Validate};

// ---------------------------------------------------------------------------
// Score tree
// ---------------------------------------------------------------------------

/// A node in a course record's score tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ScoreNode {
    Graded(GradedScoreNode),
    Raw(RawScoreNode),
}

impl ScoreNode {
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Graded(node) => &node.name,
            Self::Raw(node) => &node.name,
        }
    }

    #[must_use]
    pub const fn assessment(&self) -> AssessmentLevel {
        match self {
            Self::Graded(node) => node.grade,
            Self::Raw(node) => node.assessment,
        }
    }

    fn usernames(&self) -> &BTreeSet<String> {
        match self {
            Self::Graded(node) => &node.usernames,
            Self::Raw(node) => &node.usernames,
        }
    }

    /// Scores with no usernames apply to everyone.
    fn relates_to(&self, username: &str) -> bool {
        let names = self.usernames();
        names.is_empty() || names.iter().any(|n| n.eq_ignore_ascii_case(username))
    }
}

impl Validate for ScoreNode {
    fn validate(&self) -> Result<(), CoreError> {
        match self {
            Self::Graded(node) => node.validate(),
            Self::Raw(node) => node.validate(),
        }
    }
}

/// A graded node aggregating child scores.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct GradedScoreNode {
    name: String,
    grade: AssessmentLevel,
    #[serde(default)]
    usernames: BTreeSet<String>,
    #[serde(default)]
    children: Vec<ScoreNode>,
}

impl GradedScoreNode {
    /// # Errors
    ///
    /// Returns `CoreError::InvalidArgument` if `name` is blank.
    pub fn new(name: impl Into<String>, grade: AssessmentLevel) -> Result<Self, CoreError> {
        let name = name.into();
        validate::non_blank("name", &name)?;
        Ok(Self {
            name,
            grade,
            usernames: BTreeSet::new(),
            children: Vec::new(),
        })
    }

    #[must_use]
    pub fn with_usernames<I, S>(mut self, usernames: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.usernames = usernames.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub fn with_child(mut self, child: impl Into<ScoreNode>) -> Self {
        self.children.push(child.into());
        self
    }

    pub fn add_child(&mut self, child: impl Into<ScoreNode>) {
        self.children.push(child.into());
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub const fn grade(&self) -> AssessmentLevel {
        self.grade
    }

    #[must_use]
    pub fn children(&self) -> &[ScoreNode] {
        &self.children
    }

    #[must_use]
    pub const fn usernames(&self) -> &BTreeSet<String> {
        &self.usernames
    }

    /// Drop every score that belongs to other learners, at any depth.
    ///
    /// A team session record holds scores for every member; a learner's own
    /// copy keeps only shared scores and the scores naming that learner.
    pub fn remove_unrelated_scores(&mut self, username: &str) {
        self.children.retain(|child| child.relates_to(username));
        for child in &mut self.children {
            if let ScoreNode::Graded(graded) = child {
                graded.remove_unrelated_scores(username);
            }
        }
    }

    /// Set this node's grade to the lowest known child grade.
    /// Children without a known grade are ignored; with none, the grade stays.
    pub fn update_grade_from_children(&mut self) {
        for child in &mut self.children {
            if let ScoreNode::Graded(graded) = child {
                graded.update_grade_from_children();
            }
        }
        if let Some(lowest) = self
            .children
            .iter()
            .map(ScoreNode::assessment)
            .filter(|level| level.rank().is_some())
            .min_by_key(|level| level.rank())
        {
            self.grade = lowest;
        }
    }
}

impl Validate for GradedScoreNode {
    fn validate(&self) -> Result<(), CoreError> {
        validate::non_blank("name", &self.name)?;
        self.children.validate()
    }
}

impl From<GradedScoreNode> for ScoreNode {
    fn from(node: GradedScoreNode) -> Self {
        Self::Graded(node)
    }
}

/// A measured value, e.g. a time or a hit count.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct RawScoreNode {
    name: String,
    value: String,
    #[serde(default)]
    units: Option<String>,
    assessment: AssessmentLevel,
    #[serde(default)]
    usernames: BTreeSet<String>,
}

impl RawScoreNode {
    /// # Errors
    ///
    /// Returns `CoreError::InvalidArgument` if `name` is blank.
    pub fn new(
        name: impl Into<String>,
        value: impl Into<String>,
        units: Option<String>,
        assessment: AssessmentLevel,
    ) -> Result<Self, CoreError> {
        let name = name.into();
        validate::non_blank("name", &name)?;
        Ok(Self {
            name,
            value: value.into(),
            units,
            assessment,
            usernames: BTreeSet::new(),
        })
    }

    #[must_use]
    pub fn with_usernames<I, S>(mut self, usernames: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.usernames = usernames.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub fn value(&self) -> &str {
        &self.value
    }

    #[must_use]
    pub fn units(&self) -> Option<&str> {
        self.units.as_deref()
    }
}

impl Validate for RawScoreNode {
    fn validate(&self) -> Result<(), CoreError> {
        validate::non_blank("name", &self.name)
    }
}

impl From<RawScoreNode> for ScoreNode {
    fn from(node: RawScoreNode) -> Self {
        Self::Raw(node)
    }
}

// ---------------------------------------------------------------------------
// Course records
// ---------------------------------------------------------------------------

/// One graded course (or course section) stored in an LMS.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct LmsCourseRecord {
    domain_name: String,
    domain_session_id: u32,
    date: DateTime<Utc>,
    root: GradedScoreNode,
    #[serde(default)]
    lms_connection_name: Option<String>,
}

impl LmsCourseRecord {
    /// # Errors
    ///
    /// Returns `CoreError::InvalidArgument` if `domain_name` is blank or
    /// `domain_session_id` is zero.
    pub fn new(
        domain_name: impl Into<String>,
        domain_session_id: u32,
        date: DateTime<Utc>,
        root: GradedScoreNode,
    ) -> Result<Self, CoreError> {
        let record = Self {
            domain_name: domain_name.into(),
            domain_session_id,
            date,
            root,
            lms_connection_name: None,
        };
        record.validate()?;
        Ok(record)
    }

    #[must_use]
    pub fn with_lms_connection_name(mut self, name: impl Into<String>) -> Self {
        self.lms_connection_name = Some(name.into());
        self
    }

    #[must_use]
    pub fn domain_name(&self) -> &str {
        &self.domain_name
    }

    #[must_use]
    pub const fn domain_session_id(&self) -> u32 {
        self.domain_session_id
    }

    #[must_use]
    pub const fn date(&self) -> DateTime<Utc> {
        self.date
    }

    #[must_use]
    pub const fn root(&self) -> &GradedScoreNode {
        &self.root
    }

    #[must_use]
    pub fn lms_connection_name(&self) -> Option<&str> {
        self.lms_connection_name.as_deref()
    }

    /// A deep copy holding only the scores relevant to `username`.
    #[must_use]
    pub fn learner_specific_copy(&self, username: &str) -> Self {
        let mut copy = self.clone();
        copy.root.remove_unrelated_scores(username);
        copy
    }
}

impl Validate for LmsCourseRecord {
    fn validate(&self) -> Result<(), CoreError> {
        validate::non_blank("domain_name", &self.domain_name)?;
        validate::at_least_one("domain_session_id", self.domain_session_id)?;
        self.root.validate()
    }
}

impl fmt::Display for LmsCourseRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[LMSCourseRecord: domain = {}, domainSessionId = {}, date = {}, root = {} ({})]",
            self.domain_name,
            self.domain_session_id,
            self.date.to_rfc3339(),
            self.root.name,
            self.root.grade,
        )
    }
}

/// Parameters of an LMS history lookup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct LmsDataRequest {
    username: String,
    #[serde(default)]
    page_start: usize,
    /// Zero means no limit.
    #[serde(default)]
    page_size: usize,
    #[serde(default)]
    sort_descending: bool,
    /// Only records for these domains. Empty means all.
    #[serde(default)]
    domain_ids: Vec<String>,
    /// Only records from these domain sessions. Empty means all.
    #[serde(default)]
    domain_session_ids: Vec<u32>,
}

impl LmsDataRequest {
    /// # Errors
    ///
    /// Returns `CoreError::InvalidArgument` if `username` is blank.
    pub fn new(username: impl Into<String>) -> Result<Self, CoreError> {
        let username = username.into();
        validate::non_blank("username", &username)?;
        Ok(Self {
            username,
            page_start: 0,
            page_size: 0,
            sort_descending: false,
            domain_ids: Vec::new(),
            domain_session_ids: Vec::new(),
        })
    }

    #[must_use]
    pub const fn with_page(mut self, page_start: usize, page_size: usize) -> Self {
        self.page_start = page_start;
        self.page_size = page_size;
        self
    }

    #[must_use]
    pub const fn sorted_descending(mut self, sort_descending: bool) -> Self {
        self.sort_descending = sort_descending;
        self
    }

    #[must_use]
    pub fn with_domain_ids(mut self, domain_ids: Vec<String>) -> Self {
        self.domain_ids = domain_ids;
        self
    }

    #[must_use]
    pub fn with_domain_session_ids(mut self, ids: Vec<u32>) -> Self {
        self.domain_session_ids = ids;
        self
    }

    #[must_use]
    pub fn username(&self) -> &str {
        &self.username
    }

    #[must_use]
    pub const fn page_start(&self) -> usize {
        self.page_start
    }

    #[must_use]
    pub const fn page_size(&self) -> usize {
        self.page_size
    }

    #[must_use]
    pub const fn sort_descending(&self) -> bool {
        self.sort_descending
    }

    #[must_use]
    pub fn domain_ids(&self) -> &[String] {
        &self.domain_ids
    }

    #[must_use]
    pub fn domain_session_ids(&self) -> &[u32] {
        &self.domain_session_ids
    }
}

impl Validate for LmsDataRequest {
    fn validate(&self) -> Result<(), CoreError> {
        validate::non_blank("username", &self.username)
    }
}

/// A learner's course records, indexed by domain on demand.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct LmsCourseRecords {
    #[serde(default)]
    records: Vec<LmsCourseRecord>,
    /// Positions in `records` per domain name. Reset on every mutation.
    #[serde(skip)]
    by_domain: OnceLock<BTreeMap<String, Vec<usize>>>,
}

impl LmsCourseRecords {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_record(&mut self, record: LmsCourseRecord) {
        self.records.push(record);
        self.invalidate();
    }

    pub fn add_records(&mut self, records: impl IntoIterator<Item = LmsCourseRecord>) {
        self.records.extend(records);
        self.invalidate();
    }

    fn invalidate(&mut self) {
        self.by_domain.take();
    }

    #[must_use]
    pub fn records(&self) -> &[LmsCourseRecord] {
        &self.records
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Order records oldest first.
    pub fn sort(&mut self) {
        self.records.sort_by_key(LmsCourseRecord::date);
        self.invalidate();
    }

    /// The newest record by date.
    #[must_use]
    pub fn latest(&self) -> Option<&LmsCourseRecord> {
        self.records.iter().max_by_key(|record| record.date)
    }

    fn index(&self) -> &BTreeMap<String, Vec<usize>> {
        self.by_domain.get_or_init(|| {
            tracing::debug!(records = self.records.len(), "rebuilding course record domain index");
            let mut index: BTreeMap<String, Vec<usize>> = BTreeMap::new();
            for (position, record) in self.records.iter().enumerate() {
                index
                    .entry(record.domain_name.clone())
                    .or_default()
                    .push(position);
            }
            index
        })
    }

    /// Records grouped by domain name, in insertion order within a domain.
    #[must_use]
    pub fn records_by_domain(&self) -> BTreeMap<&str, Vec<&LmsCourseRecord>> {
        self.index()
            .iter()
            .map(|(domain, positions)| {
                (
                    domain.as_str(),
                    positions.iter().map(|&p| &self.records[p]).collect(),
                )
            })
            .collect()
    }

    #[must_use]
    pub fn records_for_domain(&self, domain_name: &str) -> Vec<&LmsCourseRecord> {
        self.index()
            .get(domain_name)
            .map(|positions| positions.iter().map(|&p| &self.records[p]).collect())
            .unwrap_or_default()
    }

    /// Answer an LMS data request: filter, sort by date, then page.
    #[must_use]
    pub fn query(&self, request: &LmsDataRequest) -> Self {
        let mut matching: Vec<&LmsCourseRecord> = self
            .records
            .iter()
            .filter(|record| {
                request.domain_ids.is_empty()
                    || request.domain_ids.iter().any(|id| *id == record.domain_name)
            })
            .filter(|record| {
                request.domain_session_ids.is_empty()
                    || request
                        .domain_session_ids
                        .contains(&record.domain_session_id)
            })
            .collect();

        matching.sort_by_key(|record| record.date);
        if request.sort_descending {
            matching.reverse();
        }

        let page_size = if request.page_size == 0 {
            usize::MAX
        } else {
            request.page_size
        };

        let mut page = Self::new();
        page.add_records(
            matching
                .into_iter()
                .skip(request.page_start)
                .take(page_size)
                .cloned(),
        );
        page
    }
}

/// Equality looks at the records only; the index is derived state.
impl PartialEq for LmsCourseRecords {
    fn eq(&self, other: &Self) -> bool {
        self.records == other.records
    }
}

impl Validate for LmsCourseRecords {
    fn validate(&self) -> Result<(), CoreError> {
        self.records.validate()
    }
}

impl FromIterator<LmsCourseRecord> for LmsCourseRecords {
    fn from_iter<I: IntoIterator<Item = LmsCourseRecord>>(iter: I) -> Self {
        let mut records = Self::new();
        records.add_records(iter);
        records
    }
}
