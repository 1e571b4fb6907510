use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// Survey submission body as posted to `/submit`.
///
/// Both sections must be JSON objects; everything inside them is read
/// leniently by [`PersonalInfo::from_map`] and the answer flattening in
/// `mapping`.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SubmissionRequest {
    #[serde(rename = "personalInfo")]
    pub personal_info: Map<String, Value>,

    pub responses: Map<String, Value>,
}

impl SubmissionRequest {
    /// Top-level keys and response group names, for logging without personal values.
    /// Groups that map to no column are listed separately as `ignored`.
    pub fn shape(&self) -> String {
        let info_keys: Vec<&str> = self.personal_info.keys().map(String::as_str).collect();
        let (groups, ignored): (Vec<&str>, Vec<&str>) = self
            .responses
            .keys()
            .map(String::as_str)
            .partition(|tag| GroupTag::from_tag(tag).is_some());

        if ignored.is_empty() {
            format!("personalInfo{:?} responses{:?}", info_keys, groups)
        } else {
            format!(
                "personalInfo{:?} responses{:?} ignored{:?}",
                info_keys, groups, ignored
            )
        }
    }
}

/// Required personal-information fields, in reporting order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RequiredField {
    Name,
    Gender,
    City,
    Email,
    Phone,
    Occupation,
}

impl RequiredField {
    pub const ALL: [RequiredField; 6] = [
        RequiredField::Name,
        RequiredField::Gender,
        RequiredField::City,
        RequiredField::Email,
        RequiredField::Phone,
        RequiredField::Occupation,
    ];

    /// Key under `personalInfo`.
    pub fn key(self) -> &'static str {
        match self {
            RequiredField::Name => "name",
            RequiredField::Gender => "gender",
            RequiredField::City => "city",
            RequiredField::Email => "email",
            RequiredField::Phone => "phone",
            RequiredField::Occupation => "occupation",
        }
    }

    /// Maximum stored length in characters.
    pub fn max_len(self) -> usize {
        match self {
            RequiredField::Name => 100,
            RequiredField::Gender => 20,
            RequiredField::City => 50,
            RequiredField::Email => 100,
            RequiredField::Phone => 20,
            RequiredField::Occupation => 50,
        }
    }
}

impl fmt::Display for RequiredField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Validated personal information, values exactly as submitted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersonalInfo {
    pub name: String,
    pub gender: String,
    pub city: String,
    pub email: String,
    pub phone: String,
    pub occupation: String,
}

impl PersonalInfo {
    /// Extracts all six required fields.
    ///
    /// A field counts as missing when absent, not a string, or empty. On
    /// failure every missing field is returned, in [`RequiredField::ALL`] order.
    pub fn from_map(map: &Map<String, Value>) -> Result<Self, Vec<RequiredField>> {
        let field = |f: RequiredField| -> Option<String> {
            match map.get(f.key()) {
                Some(Value::String(s)) if !s.is_empty() => Some(s.clone()),
                _ => None,
            }
        };

        let missing: Vec<RequiredField> = RequiredField::ALL
            .into_iter()
            .filter(|f| field(*f).is_none())
            .collect();
        if !missing.is_empty() {
            return Err(missing);
        }

        Ok(Self {
            name: field(RequiredField::Name).unwrap_or_default(),
            gender: field(RequiredField::Gender).unwrap_or_default(),
            city: field(RequiredField::City).unwrap_or_default(),
            email: field(RequiredField::Email).unwrap_or_default(),
            phone: field(RequiredField::Phone).unwrap_or_default(),
            occupation: field(RequiredField::Occupation).unwrap_or_default(),
        })
    }
}

/// The eight question groups of the form, each stored in its own column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GroupTag {
    Weekend,
    Meeting,
    Vibe,
    NewThings,
    Frustrations,
    Blockers,
    SafeFun,
    Platform,
}

impl GroupTag {
    pub const ALL: [GroupTag; 8] = [
        GroupTag::Weekend,
        GroupTag::Meeting,
        GroupTag::Vibe,
        GroupTag::NewThings,
        GroupTag::Frustrations,
        GroupTag::Blockers,
        GroupTag::SafeFun,
        GroupTag::Platform,
    ];

    /// Key under `responses`.
    pub fn tag(self) -> &'static str {
        match self {
            GroupTag::Weekend => "weekend",
            GroupTag::Meeting => "meeting",
            GroupTag::Vibe => "vibe",
            GroupTag::NewThings => "new_things",
            GroupTag::Frustrations => "frustrations",
            GroupTag::Blockers => "blockers",
            GroupTag::SafeFun => "safe_fun",
            GroupTag::Platform => "platform",
        }
    }

    /// Column in `desirablity_form_responses`.
    pub fn column(self) -> &'static str {
        match self {
            GroupTag::Weekend => "weekend_options",
            GroupTag::Meeting => "meeting_feeling",
            GroupTag::Vibe => "vibe_selections",
            GroupTag::NewThings => "last_new_thing",
            GroupTag::Frustrations => "main_frustration",
            GroupTag::Blockers => "meeting_blocker",
            GroupTag::SafeFun => "safe_fun_option",
            GroupTag::Platform => "platform_likelihood",
        }
    }

    pub fn from_tag(tag: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|g| g.tag() == tag)
    }
}

/// Maximum stored length of a flattened answer column, in characters.
pub const ANSWER_COLUMN_MAX_LEN: usize = 255;

/// One row of `desirablity_form_responses`, minus the generated `id`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormResponseRecord {
    pub full_name: String,
    pub gender: String,
    pub city: String,
    pub email: String,
    pub phone: String,
    pub occupation: String,
    pub weekend_options: String,
    pub meeting_feeling: String,
    pub vibe_selections: String,
    pub last_new_thing: String,
    pub main_frustration: String,
    pub meeting_blocker: String,
    pub safe_fun_option: String,
    pub platform_likelihood: String,
}

impl FormResponseRecord {
    pub fn answers(&self, group: GroupTag) -> &str {
        match group {
            GroupTag::Weekend => &self.weekend_options,
            GroupTag::Meeting => &self.meeting_feeling,
            GroupTag::Vibe => &self.vibe_selections,
            GroupTag::NewThings => &self.last_new_thing,
            GroupTag::Frustrations => &self.main_frustration,
            GroupTag::Blockers => &self.meeting_blocker,
            GroupTag::SafeFun => &self.safe_fun_option,
            GroupTag::Platform => &self.platform_likelihood,
        }
    }

    pub fn answers_mut(&mut self, group: GroupTag) -> &mut String {
        match group {
            GroupTag::Weekend => &mut self.weekend_options,
            GroupTag::Meeting => &mut self.meeting_feeling,
            GroupTag::Vibe => &mut self.vibe_selections,
            GroupTag::NewThings => &mut self.last_new_thing,
            GroupTag::Frustrations => &mut self.main_frustration,
            GroupTag::Blockers => &mut self.meeting_blocker,
            GroupTag::SafeFun => &mut self.safe_fun_option,
            GroupTag::Platform => &mut self.platform_likelihood,
        }
    }
}

/// Successful `/submit` response body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmitResponse {
    pub success: bool,
    pub message: String,
}

impl SubmitResponse {
    pub fn submitted() -> Self {
        Self {
            success: true,
            message: "Form submitted successfully".to_string(),
        }
    }
}

/// Result of a stored submission. The id is only used for logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Confirmation {
    pub record_id: i64,
}
