use serde::{Deserialize, Serialize};
use validator::{Validate, ValidateUrl};

use crate::core::error::MatchError;
use crate::core::parsing::{parse_age_range, parse_ages};
use crate::models::domain::{DonorPreference, Gender, GenderPref, RecipientApplication, Wishlist, WishlistItem};

/// Request to set a donor's matching preferences
///
/// ```json
/// { "childCount": 2, "genderPref": "female", "ageRange": "3-10" }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct SetPreferenceRequest {
    #[validate(range(max = 50))]
    #[serde(alias = "child_count", rename = "childCount")]
    pub child_count: u32,
    #[serde(alias = "gender_pref", rename = "genderPref", default)]
    pub gender_pref: Option<String>,
    #[serde(alias = "age_range", rename = "ageRange", default)]
    pub age_range: Option<String>,
}

impl SetPreferenceRequest {
    pub fn into_preference(self) -> Result<DonorPreference, MatchError> {
        self.validate()?;

        let age_range = match self.age_range.as_deref() {
            Some(text) => parse_age_range(text).map_err(MatchError::Validation)?,
            None => None,
        };

        let gender_pref = match self.gender_pref.as_deref() {
            Some(text) => GenderPref::parse(text)
                .ok_or_else(|| MatchError::Validation(format!("unknown gender preference '{}'", text)))?,
            None => GenderPref::None,
        };

        Ok(DonorPreference {
            child_count: self.child_count,
            gender_pref,
            age_range,
        })
    }
}

/// Ages as typed by the family: a list or a comma separated string
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AgesInput {
    List(Vec<u32>),
    Text(String),
}

/// Request to register as a recipient family
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct RegisterRecipientRequest {
    #[validate(length(min = 1, max = 200))]
    pub address: String,
    #[validate(length(min = 5, max = 10))]
    #[serde(alias = "zip_code", alias = "postalCode", rename = "zipCode")]
    pub zip_code: String,
    #[validate(range(min = 1, max = 20))]
    #[serde(alias = "kid_count", alias = "childCount", rename = "kidCount")]
    pub kid_count: u32,
    pub ages: AgesInput,
    #[serde(default)]
    pub gender: Option<String>,
}

impl RegisterRecipientRequest {
    pub fn into_application(self) -> Result<RecipientApplication, MatchError> {
        self.validate()?;

        let ages = match self.ages {
            AgesInput::List(ages) => ages,
            AgesInput::Text(text) => parse_ages(&text).map_err(MatchError::Validation)?,
        };

        let gender = match self.gender.as_deref() {
            Some(text) => {
                Gender::parse(text).ok_or_else(|| MatchError::Validation(format!("unknown gender '{}'", text)))?
            }
            None => Gender::Unspecified,
        };

        Ok(RecipientApplication {
            address: self.address,
            zip_code: self.zip_code,
            kid_count: self.kid_count,
            ages,
            gender,
        })
    }
}

/// A wishlist item as submitted by a family
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct WishlistItemRequest {
    #[validate(length(max = 200))]
    pub name: String,
    #[serde(default)]
    pub link: Option<String>,
}

/// Blank links are dropped; anything else must be a URL
fn normalize_link(link: Option<String>) -> Result<Option<String>, MatchError> {
    match link.map(|l| l.trim().to_string()) {
        Some(link) if link.is_empty() => Ok(None),
        Some(link) if link.validate_url() => Ok(Some(link)),
        Some(link) => Err(MatchError::Validation(format!("'{}' is not a valid URL", link))),
        None => Ok(None),
    }
}

impl WishlistItemRequest {
    pub fn into_item(self) -> Result<WishlistItem, MatchError> {
        self.validate()?;
        Ok(WishlistItem {
            name: self.name,
            link: normalize_link(self.link)?,
        })
    }
}

/// Request to overwrite all of a family's wishlists
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaveWishlistsRequest {
    pub wishlists: Vec<Wishlist>,
}

impl SaveWishlistsRequest {
    pub fn into_wishlists(self) -> Result<Vec<Wishlist>, MatchError> {
        self.wishlists
            .into_iter()
            .map(|wishlist| {
                let items = wishlist
                    .items
                    .into_iter()
                    .map(|item| {
                        WishlistItemRequest {
                            name: item.name,
                            link: item.link,
                        }
                        .into_item()
                    })
                    .collect::<Result<Vec<_>, _>>()?;

                Ok(Wishlist {
                    child_id: wishlist.child_id,
                    items,
                })
            })
            .collect()
    }
}

/// Request to record an uploaded eligibility document
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct AttachDocumentRequest {
    #[validate(length(min = 1, max = 100))]
    pub label: String,
    #[validate(length(min = 1, max = 1000))]
    pub reference: String,
}
