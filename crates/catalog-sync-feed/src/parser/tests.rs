use super::*;
use catalog_sync_models::{FixedClock, Identity, SystemClock};
use chrono::TimeZone;
use serde_json::json;

const DUNE: &str = r#"[{"title":"Dune","budget":165000000,"release":"2021-10-22","rating":8.0,"poster":"https://x/p.jpg","duration":155,"genre":"SciFi","watched":false,"guidance":"PG13"}]"#;

fn element(title: &str, release: &str, genre: &str) -> Value {
    json!({
        "title": title,
        "budget": 1000000.0,
        "release": release,
        "rating": 7.5,
        "poster": "https://example.com/poster.jpg",
        "duration": 100,
        "genre": genre,
        "watched": true,
        "guidance": "PG"
    })
}

fn fixed_clock() -> FixedClock {
    FixedClock(Utc.with_ymd_and_hms(2030, 1, 2, 3, 4, 5).unwrap())
}

#[test]
fn test_parse_dune() {
    let clock = SystemClock;
    let feed = FeedParser::new(&clock, ReleaseDatePolicy::Lenient).parse(DUNE).unwrap();

    assert_eq!(feed.records.len(), 1);
    assert!(feed.field_errors.is_empty());
    assert!(feed.lenient_dates.is_empty());

    let dune = &feed.records[0];
    assert_eq!(dune.identity(), Identity::parse("Dune", "2021-10-22").unwrap());
    assert_eq!(dune.budget, Some(165_000_000.0));
    assert_eq!(dune.rating, 8.0);
    assert_eq!(dune.duration_minutes, 155);
    assert_eq!(dune.genre, Genre::SciFi);
    assert_eq!(dune.guidance, Some(ParentalGuidance::PG13));
    assert!(!dune.watched);
    assert_eq!(dune.poster_url, "https://x/p.jpg");
}

#[test]
fn test_invalid_genre_rejects_only_that_element() {
    let payload = json!([
        element("First", "2020-01-01", "Drama"),
        element("Second", "2020-01-02", "Musical"),
        element("Third", "2020-01-03", "Comedy"),
    ])
    .to_string();

    let clock = SystemClock;
    let feed = FeedParser::new(&clock, ReleaseDatePolicy::Lenient).parse(&payload).unwrap();

    let titles: Vec<&str> = feed.records.iter().map(|m| m.title.as_str()).collect();
    assert_eq!(titles, vec!["First", "Third"]);
    assert_eq!(feed.field_errors.len(), 1);
    assert_eq!(feed.field_errors[0].index, 1);
    assert_eq!(feed.field_errors[0].field, FeedField::Genre);
    assert_eq!(feed.total(), 3);
}

#[test]
fn test_enum_names_are_case_sensitive() {
    let mut lower_genre = element("A", "2020-01-01", "scifi");
    let mut bad_guidance = element("B", "2020-01-01", "SciFi");
    bad_guidance["guidance"] = json!("pg13");
    lower_genre["guidance"] = json!("PG13");
    let payload = json!([lower_genre, bad_guidance]).to_string();

    let clock = SystemClock;
    let feed = FeedParser::new(&clock, ReleaseDatePolicy::Lenient).parse(&payload).unwrap();
    assert!(feed.records.is_empty());
    assert_eq!(feed.field_errors[0].field, FeedField::Genre);
    assert_eq!(feed.field_errors[1].field, FeedField::Guidance);
}

#[test]
fn test_lenient_release_uses_day_of_parsing() {
    let payload = json!([element("Mystery", "not-a-date", "Horror")]).to_string();
    let clock = fixed_clock();
    let midnight = Utc.with_ymd_and_hms(2030, 1, 2, 0, 0, 0).unwrap();

    let feed = FeedParser::new(&clock, ReleaseDatePolicy::Lenient).parse(&payload).unwrap();

    assert_eq!(feed.records.len(), 1);
    assert_eq!(feed.records[0].release, midnight);
    assert_eq!(feed.records[0].identity(), Identity::parse("Mystery", "2030-01-02").unwrap());
    assert!(feed.field_errors.is_empty());
    assert_eq!(
        feed.lenient_dates,
        vec![DateLeniencyEvent {
            index: 0,
            title: "Mystery".to_string(),
            raw: "not-a-date".to_string(),
            substituted: midnight,
        }]
    );
}

#[test]
fn test_lenient_release_is_stable_within_a_day() {
    let payload = json!([element("Mystery", "soon", "Horror")]).to_string();
    let morning = FixedClock(Utc.with_ymd_and_hms(2030, 1, 2, 0, 0, 1).unwrap());
    let evening = FixedClock(Utc.with_ymd_and_hms(2030, 1, 2, 23, 59, 59).unwrap());

    let first = FeedParser::new(&morning, ReleaseDatePolicy::Lenient).parse(&payload).unwrap();
    let second = FeedParser::new(&evening, ReleaseDatePolicy::Lenient).parse(&payload).unwrap();

    assert_eq!(first.records[0].identity(), second.records[0].identity());
}

#[test]
fn test_strict_release_rejects() {
    let payload = json!([element("Mystery", "22/10/2021", "Horror")]).to_string();
    let clock = fixed_clock();

    let feed = FeedParser::new(&clock, ReleaseDatePolicy::Strict).parse(&payload).unwrap();

    assert!(feed.records.is_empty());
    assert!(feed.lenient_dates.is_empty());
    assert_eq!(feed.field_errors[0].field, FeedField::Release);
}

#[test]
fn test_missing_release_is_always_an_error() {
    let mut value = element("NoDate", "2020-01-01", "Drama");
    value.as_object_mut().unwrap().remove("release");
    let payload = json!([value]).to_string();

    let clock = fixed_clock();
    let feed = FeedParser::new(&clock, ReleaseDatePolicy::Lenient).parse(&payload).unwrap();

    assert!(feed.records.is_empty());
    assert_eq!(
        feed.field_errors[0],
        FieldError::new(0, FeedField::Release, FieldErrorKind::Missing)
    );
}

#[test]
fn test_field_constraints() {
    let mut zero_budget = element("Budget", "2020-01-01", "Drama");
    zero_budget["budget"] = json!(0);
    let mut high_rating = element("Rating", "2020-01-01", "Drama");
    high_rating["rating"] = json!(10.5);
    let mut relative_poster = element("Poster", "2020-01-01", "Drama");
    relative_poster["poster"] = json!("/img/p.jpg");
    let mut negative_duration = element("Duration", "2020-01-01", "Drama");
    negative_duration["duration"] = json!(-3);
    let mut fractional_duration = element("Fraction", "2020-01-01", "Drama");
    fractional_duration["duration"] = json!(90.5);
    let mut string_watched = element("Watched", "2020-01-01", "Drama");
    string_watched["watched"] = json!("yes");
    let empty_title = element("   ", "2020-01-01", "Drama");

    let payload = json!([
        zero_budget,
        high_rating,
        relative_poster,
        negative_duration,
        fractional_duration,
        string_watched,
        empty_title,
        42,
    ])
    .to_string();

    let clock = SystemClock;
    let feed = FeedParser::new(&clock, ReleaseDatePolicy::Lenient).parse(&payload).unwrap();

    assert!(feed.records.is_empty());
    let fields: Vec<FeedField> = feed.field_errors.iter().map(|e| e.field).collect();
    assert_eq!(
        fields,
        vec![
            FeedField::Budget,
            FeedField::Rating,
            FeedField::Poster,
            FeedField::Duration,
            FeedField::Duration,
            FeedField::Watched,
            FeedField::Title,
            FeedField::Element,
        ]
    );
    assert_eq!(
        feed.field_errors[4].kind,
        FieldErrorKind::WrongType { expected: "integer" }
    );
}

#[test]
fn test_rating_bounds_checked_before_narrowing() {
    let mut just_above = element("Above", "2020-01-01", "Drama");
    just_above["rating"] = json!(10.0000001);
    let mut just_below = element("Below", "2020-01-01", "Drama");
    just_below["rating"] = json!(-0.0000001);
    let mut top = element("Top", "2020-01-01", "Drama");
    top["rating"] = json!(10);
    let mut bottom = element("Bottom", "2020-01-01", "Drama");
    bottom["rating"] = json!(0.0);

    let payload = json!([just_above, just_below, top, bottom]).to_string();
    let clock = SystemClock;
    let feed = FeedParser::new(&clock, ReleaseDatePolicy::Lenient).parse(&payload).unwrap();

    let rejected: Vec<(usize, FeedField)> = feed.field_errors.iter().map(|e| (e.index, e.field)).collect();
    assert_eq!(rejected, vec![(0, FeedField::Rating), (1, FeedField::Rating)]);
    let ratings: Vec<f32> = feed.records.iter().map(|r| r.rating).collect();
    assert_eq!(ratings, vec![10.0, 0.0]);
}

#[test]
fn test_batch_errors() {
    let clock = SystemClock;
    let parser = FeedParser::new(&clock, ReleaseDatePolicy::Lenient);

    assert!(matches!(parser.parse("<html>oops</html>"), Err(BatchParseError::InvalidJson(_))));
    assert!(matches!(parser.parse(""), Err(BatchParseError::InvalidJson(_))));
    assert!(matches!(
        parser.parse(r#"{"title":"Dune"}"#),
        Err(BatchParseError::NotAnArray { found: "object" })
    ));
}

#[test]
fn test_entries_are_lazy() {
    let payload = json!([
        element("One", "2020-01-01", "Drama"),
        element("Two", "2020-01-01", "Nope"),
        element("Three", "2020-01-01", "Drama"),
    ])
    .to_string();

    let clock = SystemClock;
    let mut entries = FeedParser::new(&clock, ReleaseDatePolicy::Lenient).entries(&payload).unwrap();
    assert_eq!(entries.size_hint(), (3, Some(3)));

    assert_eq!(entries.next().unwrap().unwrap().record.title, "One");
    assert!(entries.next().unwrap().is_err());
    assert_eq!(entries.size_hint(), (1, Some(1)));
    assert_eq!(entries.next().unwrap().unwrap().record.title, "Three");
    assert!(entries.next().is_none());
}

#[test]
fn test_empty_array() {
    let clock = SystemClock;
    let feed = FeedParser::new(&clock, ReleaseDatePolicy::Lenient).parse("[]").unwrap();
    assert_eq!(feed.total(), 0);
}
