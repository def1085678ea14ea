use crate::models::{Ages, AgeRange, DonorPreference, Gender, GenderPref, RecipientRecord};

/// Check that the donor can cover every child in the household
#[inline]
pub fn matches_capacity(record: &RecipientRecord, preference: &DonorPreference) -> bool {
    record.kid_count <= preference.child_count
}

/// Check the donor's gender preference against the recipient
#[inline]
pub fn matches_gender(gender: Gender, preference: GenderPref) -> bool {
    match preference {
        GenderPref::None | GenderPref::Both => true,
        GenderPref::Male => gender == Gender::Male,
        GenderPref::Female => gender == Gender::Female,
    }
}

/// Check every child's age against the donor's range
///
/// Without a range anything passes. With a range, a malformed age list
/// rejects the whole recipient.
#[inline]
pub fn matches_age_range(ages: &Ages, range: Option<&AgeRange>) -> bool {
    let Some(range) = range else {
        return true;
    };

    match ages.parsed() {
        Some(ages) => ages.iter().all(|age| range.contains(*age)),
        None => false,
    }
}

/// All eligibility rules for a single recipient
#[inline]
pub fn is_eligible(record: &RecipientRecord, preference: &DonorPreference) -> bool {
    matches_capacity(record, preference)
        && matches_gender(record.gender, preference.gender_pref)
        && matches_age_range(&record.ages, preference.age_range.as_ref())
}

/// Keep the candidates a donor is able to sponsor
///
/// Candidates are expected to be approved and unclaimed already. Input order is
/// preserved; nothing is scored or ranked.
pub fn filter_eligible(
    preference: &DonorPreference,
    candidates: Vec<RecipientRecord>,
) -> Vec<RecipientRecord> {
    candidates
        .into_iter()
        .filter(|record| is_eligible(record, preference))
        .collect()
}
