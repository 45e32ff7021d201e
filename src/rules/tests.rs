use std::collections::BTreeMap;
use std::sync::Arc;

use serde_json::json;

use super::*;
use crate::library::fixtures::{index_of, record, with_year};

fn tracks() -> Vec<Arc<Track>> {
    index_of(vec![
        with_year(
            record("/music/Rock/a 1979.mp3", "Alpha", &["Classic Rock"]),
            1979,
        ),
        with_year(record("/music/Rock/a 1980.mp3", "Alpha", &["Rock"]), 1980),
        with_year(
            record("/music/Rock/b 1985.mp3", "Beta Band", &["Rock", "Pop"]),
            1985,
        ),
        with_year(record("/music/Jazz/c 1989.mp3", "Gamma", &["Jazz"]), 1989),
        with_year(
            record("/music/French/d 1990.mp3", "Delta", &["Chanson"]),
            1990,
        ),
        record("/music/Rock/e unknown.mp3", "Epsilon", &["Rock"]),
    ])
    .tracks()
    .to_vec()
}

fn stems(tracks: &[Arc<Track>]) -> Vec<String> {
    tracks.iter().map(|t| t.title.clone()).collect()
}

fn raw(value: serde_json::Value) -> RuleSpec {
    serde_json::from_value(value).unwrap()
}

#[test]
fn between_is_inclusive_and_skips_unknown_years() {
    let value = json!({"type": "year", "operator": "between", "value": [1980, 1989]});
    let rule = validate(&raw(value)).unwrap();
    let hits = apply_rules(&tracks(), &[rule]);
    assert_eq!(stems(&hits), vec!["a 1980", "b 1985", "c 1989"]);
}

#[test]
fn year_operators_compare_numerically() {
    let all = tracks();
    let before = validate(&RuleSpec::year("<", 1985)).unwrap();
    assert_eq!(
        stems(&apply_rules(&all, &[before])),
        vec!["a 1979", "a 1980"]
    );

    let after = validate(&RuleSpec::year(">", 1985)).unwrap();
    assert_eq!(
        stems(&apply_rules(&all, &[after])),
        vec!["c 1989", "d 1990"]
    );

    // No operator means equality, and numeric strings are accepted.
    let equal = validate(&raw(json!({"type": "year", "value": "1985"}))).unwrap();
    assert_eq!(equal, Rule::Year(YearMatch::Equal(1985)));
    assert_eq!(stems(&apply_rules(&all, &[equal])), vec!["b 1985"]);
}

#[test]
fn text_rules_match_case_insensitive_substrings() {
    let all = tracks();

    let genre = validate(&RuleSpec::genre("rock")).unwrap();
    assert_eq!(
        stems(&apply_rules(&all, &[genre])),
        vec!["a 1979", "a 1980", "b 1985", "e unknown"]
    );

    let artist = validate(&RuleSpec::artist("BAND")).unwrap();
    assert_eq!(stems(&apply_rules(&all, &[artist])), vec!["b 1985"]);

    let folder = validate(&RuleSpec::folder("french")).unwrap();
    assert_eq!(stems(&apply_rules(&all, &[folder])), vec!["d 1990"]);
}

#[test]
fn rules_compose_as_and_regardless_of_order() {
    let all = tracks();
    let genre = validate(&RuleSpec::genre("rock")).unwrap();
    let year = validate(&RuleSpec::year_between(1980, 1989)).unwrap();

    let forward = apply_rules(&all, &[genre.clone(), year.clone()]);
    let backward = apply_rules(&all, &[year, genre]);
    assert_eq!(stems(&forward), vec!["a 1980", "b 1985"]);
    assert_eq!(stems(&forward), stems(&backward));
}

#[test]
fn validate_rejects_malformed_rules() {
    assert_eq!(
        validate(&raw(json!({"type": "mood", "value": "happy"}))),
        Err(TemplateError::UnknownRuleType {
            kind: "mood".into(),
        })
    );
    assert_eq!(
        validate(&raw(json!({"type": "genre"}))),
        Err(TemplateError::MissingValue {
            kind: "genre".into(),
        })
    );
    assert_eq!(
        validate(&raw(json!({"type": "artist", "value": "  "}))),
        Err(TemplateError::MissingValue {
            kind: "artist".into(),
        })
    );

    let short = json!({"type": "year", "operator": "between", "value": [1980]});
    assert!(matches!(
        validate(&raw(short)),
        Err(TemplateError::InvalidBetween { .. })
    ));
    let not_a_year = json!({"type": "year", "operator": "=", "value": "soon"});
    assert!(matches!(
        validate(&raw(not_a_year)),
        Err(TemplateError::InvalidYear { .. })
    ));
    let at_least = json!({"type": "year", "operator": ">=", "value": 2000});
    assert_eq!(
        validate(&raw(at_least)),
        Err(TemplateError::UnknownOperator {
            operator: ">=".into(),
        })
    );
}

#[test]
fn compile_template_rejects_whole_template_on_one_bad_rule() {
    let scalar = json!({"type": "year", "operator": "between", "value": 1980});
    let template = Template::new("Broken", "", vec![RuleSpec::genre("Rock"), raw(scalar)]);
    assert!(matches!(
        compile_template(&template),
        Err(TemplateError::InvalidBetween { .. })
    ));

    let empty = Template::new("Empty", "", vec![]);
    assert_eq!(
        compile_template(&empty),
        Err(TemplateError::NoRules {
            name: "Empty".into(),
        })
    );

    let unnamed = Template::new("", "", vec![RuleSpec::genre("Rock")]);
    assert_eq!(compile_template(&unnamed), Err(TemplateError::MissingName));
}

#[test]
fn builtin_catalog_compiles() {
    let all = builtin_templates();
    assert_eq!(all.len(), 13);
    for template in &all {
        compile_template(template).unwrap_or_else(|e| panic!("{}: {e}", template.name));
    }
}

#[test]
fn find_by_genre_is_exact_and_case_insensitive() {
    let all = builtin_templates();
    let names: Vec<_> = find_templates_by_genre(&all, "rock")
        .into_iter()
        .map(|t| t.name)
        .collect();
    assert_eq!(names, vec!["Rock & Metal", "Workout Mix", "Roadtrip Mix"]);
    assert!(find_templates_by_genre(&all, "Roc").is_empty());
}

#[test]
fn find_by_period_matches_year_rules_inside_the_range() {
    let all = builtin_templates();
    let names = |start, end| -> Vec<String> {
        find_templates_by_period(&all, start, end)
            .into_iter()
            .map(|t| t.name)
            .collect()
    };
    assert_eq!(names(1980, 1989), vec!["80s Hits"]);
    assert_eq!(names(1950, 1990), vec!["80s Hits", "Oldies but Goldies"]);
    assert_eq!(names(2015, 2030), vec!["Recent Discoveries"]);
}

#[test]
fn combine_merges_distinct_rules_and_tags() {
    let a = Template::new(
        "A",
        "",
        vec![RuleSpec::genre("Rock"), RuleSpec::genre("Pop")],
    )
    .with_advanced(BTreeMap::from([("mood".to_string(), json!("positive"))]));
    let b = Template::new(
        "B",
        "",
        vec![RuleSpec::genre("Pop"), RuleSpec::year(">", 2000)],
    )
    .with_advanced(BTreeMap::from([("mood".to_string(), json!("relaxed"))]));

    let hybrid = combine_templates(&[a.clone(), b], None).unwrap();
    assert_eq!(hybrid.name, "Hybrid Mix (2 templates)");
    assert_eq!(
        hybrid.description.as_deref(),
        Some("Combined from 2 templates")
    );
    assert_eq!(hybrid.rules.len(), 3);
    assert_eq!(hybrid.advanced.unwrap()["mood"], json!("relaxed"));

    let named = combine_templates(&[a.clone()], Some("Mine")).unwrap();
    assert_eq!(named.name, "Mine");
    assert_eq!(
        combine_templates(&[], None),
        Err(TemplateError::NothingToCombine)
    );

    let jazz = Template::new("C", "", vec![RuleSpec::genre("Jazz")]);
    let untagged = combine_templates(&[jazz], None).unwrap();
    assert!(untagged.advanced.is_none());
}

#[test]
fn create_template_drops_invalid_rules_and_normalizes() {
    let template = create_template(
        "Custom",
        "mine",
        &[
            RuleSpec::genre("Rock"),
            raw(json!({"type": "year", "value": "1999"})),
            raw(json!({"type": "bpm", "value": 120})),
        ],
        None,
    );
    assert_eq!(template.rules.len(), 2);
    assert_eq!(template.rules[1], RuleSpec::year("=", 1999));
    assert_eq!(template.rules[1].value, Some(json!(1999)));
}

#[test]
fn describe_lists_rules_and_tags() {
    let template = Template::new(
        "Evening",
        "",
        vec![
            RuleSpec::genre("Jazz"),
            RuleSpec::genre("Soul"),
            RuleSpec::year_between(1960, 1969),
            RuleSpec::folder("Vinyl"),
        ],
    )
    .with_advanced(BTreeMap::from([
        ("tempo".to_string(), json!("slow")),
        ("instrumental".to_string(), json!(true)),
    ]));

    assert_eq!(
        describe_template(&template),
        "Genres: Jazz, Soul. Years: between 1960 and 1969. Folders: Vinyl. \
         Settings: tempo slow, prefers instrumental tracks"
    );
}

#[test]
fn templates_deserialize_from_json() {
    let template: Template = serde_json::from_value(json!({
        "name": "80s Rock Classics",
        "rules": [
            {"type": "genre", "value": "rock"},
            {"type": "year", "operator": "between", "value": [1980, 1989]}
        ]
    }))
    .unwrap();
    let rules = compile_template(&template).unwrap();
    assert_eq!(rules[1], Rule::Year(YearMatch::Between(1980, 1989)));
    assert_eq!(rules[1].to_string(), "year in 1980..=1989");
}
