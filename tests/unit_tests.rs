// Unit tests for Goodfellows Match

use goodfellows_match::core::{
    filter_eligible, is_eligible, matches_age_range, matches_capacity, matches_gender, parse_age_range, parse_ages,
};
use goodfellows_match::models::{AgeRange, Ages, DonorPreference, Gender, GenderPref, RecipientRecord};

fn create_recipient(id: &str, kid_count: u32, gender: Gender, ages: Ages) -> RecipientRecord {
    RecipientRecord {
        id: id.to_string(),
        address: "1 Main St".to_string(),
        zip_code: "48187".to_string(),
        kid_count,
        ages,
        gender,
        approved: true,
        claimed_by: None,
        claimed_at: None,
        wishlists: None,
        documents: Default::default(),
        created_at: None,
    }
}

fn preference(child_count: u32, gender_pref: GenderPref, range: Option<(u32, u32)>) -> DonorPreference {
    DonorPreference {
        child_count,
        gender_pref,
        age_range: range.map(|(min, max)| AgeRange::new(min, max).unwrap()),
    }
}

#[test]
fn test_capacity_is_inclusive() {
    let pref = preference(2, GenderPref::None, None);

    let two = create_recipient("a", 2, Gender::Male, Ages::Parsed(vec![3, 4]));
    let three = create_recipient("b", 3, Gender::Male, Ages::Parsed(vec![3, 4, 5]));

    assert!(matches_capacity(&two, &pref));
    assert!(!matches_capacity(&three, &pref));
}

#[test]
fn test_gender_preference_table() {
    let genders = [Gender::Male, Gender::Female, Gender::Other, Gender::Unspecified];

    for gender in genders {
        assert!(matches_gender(gender, GenderPref::None));
        assert!(matches_gender(gender, GenderPref::Both));
        assert_eq!(matches_gender(gender, GenderPref::Male), gender == Gender::Male);
        assert_eq!(matches_gender(gender, GenderPref::Female), gender == Gender::Female);
    }
}

#[test]
fn test_age_range_bounds_are_inclusive() {
    let range = AgeRange::new(5, 5).unwrap();

    assert!(matches_age_range(&Ages::Parsed(vec![5]), Some(&range)));
    assert!(matches_age_range(&Ages::Parsed(vec![5, 5]), Some(&range)));
    assert!(!matches_age_range(&Ages::Parsed(vec![4]), Some(&range)));
    assert!(!matches_age_range(&Ages::Parsed(vec![5, 6]), Some(&range)));
}

#[test]
fn test_malformed_ages_only_matter_with_a_range() {
    let malformed = Ages::Malformed("four and six".to_string());
    let range = AgeRange::new(0, 18).unwrap();

    assert!(matches_age_range(&malformed, None));
    assert!(!matches_age_range(&malformed, Some(&range)));
}

#[test]
fn test_eligibility_is_conjunction_of_rules() {
    let prefs = [
        preference(1, GenderPref::None, None),
        preference(2, GenderPref::Female, Some((3, 10))),
        preference(3, GenderPref::Male, Some((0, 6))),
        preference(4, GenderPref::Both, Some((8, 12))),
    ];

    let records = [
        create_recipient("r1", 1, Gender::Female, Ages::Parsed(vec![4])),
        create_recipient("r2", 2, Gender::Male, Ages::Parsed(vec![2, 6])),
        create_recipient("r3", 3, Gender::Female, Ages::Parsed(vec![9, 10, 11])),
        create_recipient("r4", 2, Gender::Unspecified, Ages::Parsed(vec![12, 8])),
        create_recipient("r5", 1, Gender::Male, Ages::Malformed("n/a".to_string())),
    ];

    for pref in &prefs {
        for record in &records {
            let expected = matches_capacity(record, pref)
                && matches_gender(record.gender, pref.gender_pref)
                && matches_age_range(&record.ages, pref.age_range.as_ref());
            assert_eq!(is_eligible(record, pref), expected, "{} vs {:?}", record.id, pref);
        }
    }
}

#[test]
fn test_filter_keeps_input_order() {
    let pref = preference(3, GenderPref::None, None);
    let candidates = vec![
        create_recipient("z", 1, Gender::Male, Ages::Parsed(vec![1])),
        create_recipient("big", 4, Gender::Male, Ages::Parsed(vec![1, 2, 3, 4])),
        create_recipient("a", 2, Gender::Female, Ages::Parsed(vec![1, 2])),
        create_recipient("m", 3, Gender::Other, Ages::Parsed(vec![1, 2, 3])),
    ];

    let ids: Vec<String> = filter_eligible(&pref, candidates)
        .into_iter()
        .map(|r| r.id)
        .collect();

    assert_eq!(ids, vec!["z", "a", "m"]);
}

#[test]
fn test_filter_is_subset_of_candidates() {
    let pref = preference(2, GenderPref::Female, Some((4, 8)));
    let candidates: Vec<RecipientRecord> = (0..50)
        .map(|i| {
            let gender = if i % 2 == 0 { Gender::Female } else { Gender::Male };
            let kids = (i % 3 + 1) as u32;
            let ages = (0..kids).map(|k| (i + k as usize) as u32 % 12).collect();
            create_recipient(&format!("rec{}", i), kids, gender, Ages::Parsed(ages))
        })
        .collect();

    let eligible = filter_eligible(&pref, candidates.clone());

    assert!(eligible.len() <= candidates.len());
    for record in &eligible {
        assert!(candidates.contains(record));
        assert!(is_eligible(record, &pref));
    }
}

#[test]
fn test_example_scenario() {
    let pref = preference(2, GenderPref::Female, Some((3, 10)));

    let fits = create_recipient("rec1", 2, Gender::Female, Ages::Parsed(vec![4, 6]));
    let too_many = create_recipient("rec2", 3, Gender::Female, Ages::Parsed(vec![4, 6, 8]));
    let too_old = create_recipient("rec3", 2, Gender::Female, Ages::Parsed(vec![4, 12]));
    let wrong_gender = create_recipient("rec4", 1, Gender::Male, Ages::Parsed(vec![5]));

    let ids: Vec<String> = filter_eligible(&pref, vec![fits, too_many, too_old, wrong_gender])
        .into_iter()
        .map(|r| r.id)
        .collect();

    assert_eq!(ids, vec!["rec1"]);
}

#[test]
fn test_parse_ages_and_ranges() {
    assert_eq!(parse_ages("4, 6,11").unwrap(), vec![4, 6, 11]);
    assert!(parse_ages("4, -1").is_err());

    let range = parse_age_range("5 - 10").unwrap().unwrap();
    assert_eq!((range.min(), range.max()), (5, 10));

    let single = parse_age_range("7").unwrap().unwrap();
    assert_eq!((single.min(), single.max()), (7, 7));

    assert!(parse_age_range("   ").unwrap().is_none());
    assert!(parse_age_range("10-5").is_err());
    assert!(parse_age_range("five").is_err());
}
