//! Template rule engine.
//!
//! A [`Template`] is a user-authored list of [`RuleSpec`]s, the loose shape it
//! has in config files and save documents. Before filtering, every spec is
//! validated into a typed [`Rule`]; one bad rule rejects the whole template.

mod templates;

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::TemplateError;
use crate::library::Track;

pub use templates::{
    builtin_templates, combine_templates, create_template, describe_template,
    find_templates_by_genre, find_templates_by_period,
};

/// One filter rule as written by the user.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct RuleSpec {
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
    /// Only meaningful for `year` rules.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operator: Option<String>,
}

impl RuleSpec {
    pub fn genre(value: impl Into<String>) -> Self {
        Self::text("genre", value.into())
    }

    pub fn artist(value: impl Into<String>) -> Self {
        Self::text("artist", value.into())
    }

    pub fn folder(value: impl Into<String>) -> Self {
        Self::text("folder", value.into())
    }

    pub fn year(operator: &str, year: i32) -> Self {
        Self {
            kind: "year".to_string(),
            value: Some(Value::from(year)),
            operator: Some(operator.to_string()),
        }
    }

    pub fn year_between(min: i32, max: i32) -> Self {
        Self {
            kind: "year".to_string(),
            value: Some(Value::from(vec![min, max])),
            operator: Some("between".to_string()),
        }
    }

    fn text(kind: &str, value: String) -> Self {
        Self {
            kind: kind.to_string(),
            value: Some(Value::String(value)),
            operator: None,
        }
    }
}

/// A named rule set that produces one playlist.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct Template {
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub rules: Vec<RuleSpec>,
    /// Free-form tags (tempo, energy, mood...). Carried along, never evaluated.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub advanced: Option<BTreeMap<String, Value>>,
}

impl Template {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        rules: Vec<RuleSpec>,
    ) -> Self {
        Self {
            name: name.into(),
            description: Some(description.into()),
            rules,
            advanced: None,
        }
    }

    pub fn with_advanced(mut self, advanced: BTreeMap<String, Value>) -> Self {
        self.advanced = Some(advanced);
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum YearMatch {
    Equal(i32),
    Before(i32),
    After(i32),
    /// Inclusive on both ends.
    Between(i32, i32),
}

impl YearMatch {
    pub fn matches(self, year: i32) -> bool {
        match self {
            YearMatch::Equal(y) => year == y,
            YearMatch::Before(y) => year < y,
            YearMatch::After(y) => year > y,
            YearMatch::Between(min, max) => (min..=max).contains(&year),
        }
    }

    pub fn operator(self) -> &'static str {
        match self {
            YearMatch::Equal(_) => "=",
            YearMatch::Before(_) => "<",
            YearMatch::After(_) => ">",
            YearMatch::Between(..) => "between",
        }
    }
}

/// A validated rule. Text rules match case-insensitive substrings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rule {
    Genre(String),
    Artist(String),
    Folder(String),
    Year(YearMatch),
}

impl Rule {
    pub fn kind(&self) -> &'static str {
        match self {
            Rule::Genre(_) => "genre",
            Rule::Artist(_) => "artist",
            Rule::Folder(_) => "folder",
            Rule::Year(_) => "year",
        }
    }

    pub fn matches(&self, track: &Track) -> bool {
        match self {
            Rule::Genre(needle) => track.genres.iter().any(|g| contains_ci(g, needle)),
            Rule::Artist(needle) => contains_ci(&track.artist, needle),
            Rule::Folder(needle) => contains_ci(&track.folder.to_string_lossy(), needle),
            Rule::Year(m) => track.year.is_some_and(|y| m.matches(y)),
        }
    }

    /// Normalized spec: year values as integers and an explicit operator.
    pub fn to_spec(&self) -> RuleSpec {
        match self {
            Rule::Genre(v) => RuleSpec::genre(v.clone()),
            Rule::Artist(v) => RuleSpec::artist(v.clone()),
            Rule::Folder(v) => RuleSpec::folder(v.clone()),
            Rule::Year(m) => match *m {
                YearMatch::Between(min, max) => RuleSpec::year_between(min, max),
                YearMatch::Equal(y) | YearMatch::Before(y) | YearMatch::After(y) => {
                    RuleSpec::year(m.operator(), y)
                }
            },
        }
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rule::Genre(v) | Rule::Artist(v) | Rule::Folder(v) => {
                write!(f, "{} ~ {v:?}", self.kind())
            }
            Rule::Year(m) => match *m {
                YearMatch::Between(min, max) => write!(f, "year in {min}..={max}"),
                YearMatch::Equal(y) | YearMatch::Before(y) | YearMatch::After(y) => {
                    write!(f, "year {} {y}", m.operator())
                }
            },
        }
    }
}

/// Check a single rule spec and turn it into a [`Rule`].
///
/// Year values may be numbers or numeric strings; a year rule without an
/// operator compares for equality.
pub fn validate(spec: &RuleSpec) -> Result<Rule, TemplateError> {
    let missing = || TemplateError::MissingValue {
        kind: spec.kind.clone(),
    };

    match spec.kind.as_str() {
        "genre" | "artist" | "folder" => {
            let text = spec
                .value
                .as_ref()
                .and_then(Value::as_str)
                .filter(|s| !s.trim().is_empty())
                .ok_or_else(missing)?
                .to_string();
            Ok(match spec.kind.as_str() {
                "genre" => Rule::Genre(text),
                "artist" => Rule::Artist(text),
                _ => Rule::Folder(text),
            })
        }
        "year" => {
            let value = spec.value.as_ref().filter(|v| !v.is_null());
            let value = value.ok_or_else(missing)?;
            let operator = spec.operator.as_deref().unwrap_or("=");
            let matcher = match operator {
                "between" => {
                    let bounds = value
                        .as_array()
                        .filter(|pair| pair.len() == 2)
                        .and_then(|pair| Some((parse_year(&pair[0])?, parse_year(&pair[1])?)))
                        .ok_or_else(|| TemplateError::InvalidBetween {
                            value: value.to_string(),
                        })?;
                    YearMatch::Between(bounds.0, bounds.1)
                }
                "=" | "<" | ">" => {
                    let year = parse_year(value).ok_or_else(|| TemplateError::InvalidYear {
                        value: value.to_string(),
                    })?;
                    match operator {
                        "<" => YearMatch::Before(year),
                        ">" => YearMatch::After(year),
                        _ => YearMatch::Equal(year),
                    }
                }
                other => {
                    return Err(TemplateError::UnknownOperator {
                        operator: other.to_string(),
                    });
                }
            };
            Ok(Rule::Year(matcher))
        }
        other => Err(TemplateError::UnknownRuleType {
            kind: other.to_string(),
        }),
    }
}

fn contains_ci(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

fn parse_year(value: &Value) -> Option<i32> {
    match value {
        Value::Number(n) => match n.as_i64() {
            Some(y) => i32::try_from(y).ok(),
            None => {
                let y = n.as_f64().filter(|f| f.is_finite())?;
                i32::try_from(y.trunc() as i64).ok()
            }
        },
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Validate a whole template. Any invalid rule rejects the template.
pub fn compile_template(template: &Template) -> Result<Vec<Rule>, TemplateError> {
    if template.name.trim().is_empty() {
        return Err(TemplateError::MissingName);
    }
    if template.rules.is_empty() {
        return Err(TemplateError::NoRules {
            name: template.name.clone(),
        });
    }
    template.rules.iter().map(validate).collect()
}

/// Keep the tracks that satisfy every rule, in their original order.
pub fn apply_rules(tracks: &[Arc<Track>], rules: &[Rule]) -> Vec<Arc<Track>> {
    let mut remaining: Vec<Arc<Track>> = tracks.to_vec();
    for rule in rules {
        if remaining.is_empty() {
            break;
        }
        remaining.retain(|t| rule.matches(t));
    }
    remaining
}

#[cfg(test)]
mod tests;
