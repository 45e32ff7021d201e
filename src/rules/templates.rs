//! Built-in template catalog and helpers for composing templates.

use std::collections::BTreeMap;

use serde_json::Value;
use tracing::debug;

use super::{Rule, RuleSpec, Template, YearMatch, validate};
use crate::error::TemplateError;

fn tags(pairs: &[(&str, Value)]) -> BTreeMap<String, Value> {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.clone()))
        .collect()
}

/// Predefined templates followed by the ones carrying advanced tags.
pub fn builtin_templates() -> Vec<Template> {
    vec![
        Template::new(
            "80s Hits",
            "The big songs of the eighties",
            vec![RuleSpec::year_between(1980, 1989)],
        ),
        Template::new(
            "Electronic Music",
            "Techno, house, EDM and friends",
            vec![RuleSpec::genre("Electronic")],
        ),
        Template::new(
            "Rock & Metal",
            "Rock and metal staples",
            vec![RuleSpec::genre("Rock")],
        ),
        Template::new(
            "Hip-Hop Classics",
            "Hip-hop and rap classics",
            vec![RuleSpec::genre("Hip-Hop")],
        ),
        Template::new(
            "Acoustic Mix",
            "Acoustic and chillout tracks",
            vec![RuleSpec::genre("Acoustic")],
        ),
        Template::new(
            "Workout Mix",
            "High energy tracks for training",
            vec![RuleSpec::genre("Electronic"), RuleSpec::genre("Rock")],
        ),
        Template::new(
            "Oldies but Goldies",
            "Classics from the sixties and seventies",
            vec![RuleSpec::year_between(1960, 1979)],
        ),
        Template::new(
            "Recent Discoveries",
            "Recent releases",
            vec![RuleSpec::year(">", 2020)],
        ),
        Template::new(
            "Roadtrip Mix",
            "For long drives",
            vec![RuleSpec::genre("Rock"), RuleSpec::genre("Pop")],
        )
        .with_advanced(tags(&[
            ("tempo", "medium".into()),
            ("energy", "high".into()),
            ("mood", "positive".into()),
        ])),
        Template::new(
            "Focus & Concentration",
            "Music to work or study to",
            vec![
                RuleSpec::genre("Ambient"),
                RuleSpec::genre("Classical"),
                RuleSpec::genre("Electronic"),
            ],
        )
        .with_advanced(tags(&[
            ("tempo", "slow".into()),
            ("energy", "low".into()),
            ("mood", "neutral".into()),
            ("instrumental", true.into()),
        ])),
        Template::new(
            "Party Mix",
            "Songs that make people dance",
            vec![
                RuleSpec::genre("Pop"),
                RuleSpec::genre("Dance"),
                RuleSpec::genre("Electronic"),
            ],
        )
        .with_advanced(tags(&[
            ("tempo", "high".into()),
            ("energy", "high".into()),
            ("mood", "positive".into()),
            ("popularity", "high".into()),
        ])),
        Template::new(
            "Chill & Relax",
            "Soft music to unwind",
            vec![RuleSpec::genre("Ambient"), RuleSpec::genre("Chill")],
        )
        .with_advanced(tags(&[
            ("tempo", "slow".into()),
            ("energy", "low".into()),
            ("mood", "relaxed".into()),
            ("instrumental", true.into()),
        ])),
        Template::new(
            "French Hits",
            "The best of French-language music",
            vec![RuleSpec::folder("French")],
        )
        .with_advanced(tags(&[("language", "french".into())])),
    ]
}

/// Templates with a `genre` rule equal to `genre`, ignoring case.
pub fn find_templates_by_genre(templates: &[Template], genre: &str) -> Vec<Template> {
    let genre = genre.to_lowercase();
    templates
        .iter()
        .filter(|t| {
            t.rules.iter().any(|r| {
                r.kind == "genre"
                    && r.value
                        .as_ref()
                        .and_then(Value::as_str)
                        .is_some_and(|v| v.to_lowercase() == genre)
            })
        })
        .cloned()
        .collect()
}

/// Templates with a year rule that falls inside `start..=end`.
///
/// A `between` rule must fit entirely in the period. Single-year rules count
/// when their year is inside it, so `> 2020` is found by a 2015..=2030 search.
pub fn find_templates_by_period(templates: &[Template], start: i32, end: i32) -> Vec<Template> {
    let period = start..=end;
    templates
        .iter()
        .filter(|t| {
            t.rules.iter().any(|spec| match validate(spec) {
                Ok(Rule::Year(year)) => match year {
                    YearMatch::Between(min, max) => min >= start && max <= end,
                    YearMatch::After(y) | YearMatch::Before(y) | YearMatch::Equal(y) => {
                        period.contains(&y)
                    }
                },
                _ => false,
            })
        })
        .cloned()
        .collect()
}

/// Merge templates into one: distinct rules in first-seen order, advanced
/// tags merged with later templates winning.
pub fn combine_templates(
    templates: &[Template],
    name: Option<&str>,
) -> Result<Template, TemplateError> {
    if templates.is_empty() {
        return Err(TemplateError::NothingToCombine);
    }

    let mut rules: Vec<RuleSpec> = Vec::new();
    let mut advanced: BTreeMap<String, Value> = BTreeMap::new();
    for template in templates {
        for rule in &template.rules {
            if !rules.contains(rule) {
                rules.push(rule.clone());
            }
        }
        if let Some(tags) = &template.advanced {
            advanced.extend(tags.iter().map(|(k, v)| (k.clone(), v.clone())));
        }
    }

    let n = templates.len();
    Ok(Template {
        name: name
            .map(str::to_string)
            .unwrap_or_else(|| format!("Hybrid Mix ({n} templates)")),
        description: Some(format!("Combined from {n} templates")),
        rules,
        advanced: (!advanced.is_empty()).then_some(advanced),
    })
}

/// Build a template from user input, keeping only rules that validate.
/// Kept rules are normalized (explicit year operator, integer years).
pub fn create_template(
    name: impl Into<String>,
    description: impl Into<String>,
    rules: &[RuleSpec],
    advanced: Option<BTreeMap<String, Value>>,
) -> Template {
    let rules = rules
        .iter()
        .filter_map(|spec| match validate(spec) {
            Ok(rule) => Some(rule.to_spec()),
            Err(e) => {
                debug!(error = %e, "dropping invalid rule");
                None
            }
        })
        .collect();

    Template {
        name: name.into(),
        description: Some(description.into()),
        rules,
        advanced,
    }
}

/// Human-readable summary of a template's rules and advanced tags.
pub fn describe_template(template: &Template) -> String {
    let values = |kind: &str| -> Vec<String> {
        template
            .rules
            .iter()
            .filter(|r| r.kind == kind)
            .filter_map(|r| r.value.as_ref())
            .map(|v| match v {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            })
            .collect()
    };

    let mut parts = Vec::new();
    for (label, kind) in [("Genres", "genre"), ("Artists", "artist")] {
        let found = values(kind);
        if !found.is_empty() {
            parts.push(format!("{label}: {}", found.join(", ")));
        }
    }

    let years: Vec<String> = template
        .rules
        .iter()
        .filter(|r| r.kind == "year")
        .filter_map(|r| validate(r).ok())
        .filter_map(|rule| match rule {
            Rule::Year(YearMatch::Between(min, max)) => Some(format!("between {min} and {max}")),
            Rule::Year(YearMatch::After(y)) => Some(format!("after {y}")),
            Rule::Year(YearMatch::Before(y)) => Some(format!("before {y}")),
            Rule::Year(YearMatch::Equal(y)) => Some(y.to_string()),
            _ => None,
        })
        .collect();
    if !years.is_empty() {
        parts.push(format!("Years: {}", years.join(", ")));
    }

    let folders = values("folder");
    if !folders.is_empty() {
        parts.push(format!("Folders: {}", folders.join(", ")));
    }

    if let Some(advanced) = &template.advanced {
        let mut settings = Vec::new();
        for key in ["tempo", "energy", "mood"] {
            if let Some(v) = advanced.get(key).and_then(Value::as_str) {
                settings.push(format!("{key} {v}"));
            }
        }
        if advanced.get("instrumental").and_then(Value::as_bool) == Some(true) {
            settings.push("prefers instrumental tracks".to_string());
        }
        if !settings.is_empty() {
            parts.push(format!("Settings: {}", settings.join(", ")));
        }
    }

    parts.join(". ")
}
