use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::core::parsing::parse_ages;

/// Gender recorded on a recipient application
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", from = "String")]
pub enum Gender {
    Male,
    Female,
    Other,
    Unspecified,
}

/// Stored records may carry free text; anything unrecognised is unspecified
impl From<String> for Gender {
    fn from(value: String) -> Self {
        Gender::parse(&value).unwrap_or(Gender::Unspecified)
    }
}

impl Gender {
    /// Strict parse for submitted applications
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "male" | "boy" | "boys" => Some(Gender::Male),
            "female" | "girl" | "girls" => Some(Gender::Female),
            "other" => Some(Gender::Other),
            "" | "unspecified" => Some(Gender::Unspecified),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Gender::Male => "male",
            Gender::Female => "female",
            Gender::Other => "other",
            Gender::Unspecified => "unspecified",
        }
    }
}

/// Donor-side gender preference
///
/// `None` and `Both` accept any recipient gender.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", try_from = "String")]
pub enum GenderPref {
    None,
    Male,
    Female,
    Both,
}

impl TryFrom<String> for GenderPref {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        GenderPref::parse(&value).ok_or_else(|| format!("unknown gender preference '{}'", value))
    }
}

impl GenderPref {
    /// Only blank and `none` mean no preference; unknown text is rejected
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "" | "none" => Some(GenderPref::None),
            "male" | "boys" => Some(GenderPref::Male),
            "female" | "girls" => Some(GenderPref::Female),
            "both" => Some(GenderPref::Both),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            GenderPref::None => "none",
            GenderPref::Male => "male",
            GenderPref::Female => "female",
            GenderPref::Both => "both",
        }
    }
}

/// Inclusive age range, always `min <= max`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawAgeRange")]
pub struct AgeRange {
    min: u32,
    max: u32,
}

#[derive(Deserialize)]
struct RawAgeRange {
    min: u32,
    max: u32,
}

impl TryFrom<RawAgeRange> for AgeRange {
    type Error = String;

    fn try_from(raw: RawAgeRange) -> Result<Self, Self::Error> {
        AgeRange::new(raw.min, raw.max)
    }
}

impl AgeRange {
    pub fn new(min: u32, max: u32) -> Result<Self, String> {
        if min > max {
            return Err(format!("age range minimum {} exceeds maximum {}", min, max));
        }
        Ok(Self { min, max })
    }

    pub fn min(&self) -> u32 {
        self.min
    }

    pub fn max(&self) -> u32 {
        self.max
    }

    #[inline]
    pub fn contains(&self, age: u32) -> bool {
        age >= self.min && age <= self.max
    }
}

/// A donor's matching preferences
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DonorPreference {
    #[serde(rename = "childCount")]
    pub child_count: u32,
    #[serde(rename = "genderPref", default = "default_gender_pref")]
    pub gender_pref: GenderPref,
    #[serde(rename = "ageRange", default)]
    pub age_range: Option<AgeRange>,
}

fn default_gender_pref() -> GenderPref {
    GenderPref::None
}

/// Children's ages as loaded from the profile store
///
/// Older clients saved ages as free text ("4, 6"). Text that parses becomes
/// `Parsed`; anything else is kept verbatim as `Malformed` so the eligibility
/// filter can reject it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "RawAges", untagged)]
pub enum Ages {
    Parsed(Vec<u32>),
    Malformed(String),
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawAges {
    List(Vec<u32>),
    Text(String),
    Other(serde_json::Value),
}

impl From<RawAges> for Ages {
    fn from(raw: RawAges) -> Self {
        match raw {
            RawAges::List(ages) => Ages::Parsed(ages),
            RawAges::Text(text) => match parse_ages(&text) {
                Ok(ages) => Ages::Parsed(ages),
                Err(_) => Ages::Malformed(text),
            },
            RawAges::Other(value) => Ages::Malformed(value.to_string()),
        }
    }
}

impl Ages {
    pub fn parsed(&self) -> Option<&[u32]> {
        match self {
            Ages::Parsed(ages) => Some(ages),
            Ages::Malformed(_) => None,
        }
    }
}

impl Default for Ages {
    fn default() -> Self {
        Ages::Parsed(Vec::new())
    }
}

/// A single requested gift
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WishlistItem {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
}

/// One child's wishlist
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Wishlist {
    #[serde(rename = "childId")]
    pub child_id: u32,
    #[serde(default)]
    pub items: Vec<WishlistItem>,
}

/// A family's application and matching state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecipientRecord {
    pub id: String,
    #[serde(default)]
    pub address: String,
    #[serde(rename = "zipCode", default)]
    pub zip_code: String,
    #[serde(rename = "kidCount")]
    pub kid_count: u32,
    #[serde(default)]
    pub ages: Ages,
    #[serde(default = "default_gender")]
    pub gender: Gender,
    #[serde(default)]
    pub approved: bool,
    #[serde(rename = "claimedBy", default)]
    pub claimed_by: Option<String>,
    #[serde(rename = "claimedAt", default)]
    pub claimed_at: Option<chrono::DateTime<chrono::Utc>>,
    #[serde(default)]
    pub wishlists: Option<Vec<Wishlist>>,
    #[serde(default)]
    pub documents: BTreeMap<String, String>,
    #[serde(rename = "createdAt", default)]
    pub created_at: Option<chrono::DateTime<chrono::Utc>>,
}

fn default_gender() -> Gender {
    Gender::Unspecified
}

impl RecipientRecord {
    /// Approved and not yet claimed by any donor
    pub fn is_visible(&self) -> bool {
        self.approved && self.claimed_by.is_none()
    }

    pub fn is_claimed_by(&self, donor_id: &str) -> bool {
        self.claimed_by.as_deref() == Some(donor_id)
    }
}

/// A family's application as submitted at registration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecipientApplication {
    pub address: String,
    pub zip_code: String,
    pub kid_count: u32,
    pub ages: Vec<u32>,
    pub gender: Gender,
}

/// Account role claimed by an authenticated principal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Donor,
    Recipient,
    Admin,
}

impl Role {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "donor" => Some(Role::Donor),
            "recipient" => Some(Role::Recipient),
            "admin" => Some(Role::Admin),
            _ => None,
        }
    }
}

/// The authenticated caller, passed explicitly into every operation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    pub id: String,
    pub role: Role,
    #[serde(default)]
    pub email: Option<String>,
}

impl Principal {
    pub fn new(id: impl Into<String>, role: Role) -> Self {
        Self {
            id: id.into(),
            role,
            email: None,
        }
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }
}
