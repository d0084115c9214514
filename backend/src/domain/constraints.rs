//! Constraint catalogue and field rule tables.
//!
//! Each inbound payload has an explicit [`RuleSet`]: an ordered list of field
//! identifiers, each mapped to an ordered list of [`Rule`]s (a [`Constraint`]
//! plus the key of its violation message). The generic engine in
//! [`crate::domain::validation`] walks these tables; nothing is discovered at
//! runtime.

use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::Regex;
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde_json::{Value, json};

use crate::domain::ViolationKind;

/// Wire form of calendar dates (`yyyy/mm/dd`).
pub const DATE_FORMAT: &str = "%Y/%m/%d";

/// Zip codes: three ASCII digits, a hyphen, four ASCII digits.
pub const ZIP_CODE_PATTERN: &str = "[0-9]{3}-[0-9]{4}";

/// Parse a wire-format date. Month and day must be zero-padded.
///
/// # Examples
/// ```
/// use user_registry::domain::constraints::parse_wire_date;
///
/// assert!(parse_wire_date("1994/04/01").is_some());
/// assert!(parse_wire_date("1994-04-01").is_none());
/// assert!(parse_wire_date("1994/4/1").is_none());
/// ```
#[must_use]
pub fn parse_wire_date(raw: &str) -> Option<NaiveDate> {
    if raw.len() != 10 {
        return None;
    }
    NaiveDate::parse_from_str(raw, DATE_FORMAT)
        .ok()
        .filter(|date| format_wire_date(*date) == raw)
}

/// Format a date in wire form.
#[must_use]
pub fn format_wire_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

/// Borrowed view of one payload field, as seen by the rule engine.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FieldValue<'a> {
    /// Field omitted or `null`.
    Absent,
    /// Free text.
    Text(&'a str),
    /// Whole number.
    Integer(i64),
    /// Decimal number, already normalised by the payload.
    Decimal(Decimal),
    /// Raw wire-format date, not yet parsed.
    Date(&'a str),
    /// Collection with the given number of entries.
    List(usize),
    /// Nested object that is present.
    Object,
}

/// Compiled regular expression remembering its source.
#[derive(Debug, Clone)]
pub struct PatternRule {
    source: &'static str,
    regex: Regex,
}

impl PatternRule {
    /// Compile a whole-value pattern.
    ///
    /// # Panics
    /// Panics when `source` is not a valid regular expression; patterns are
    /// compile-time literals.
    #[must_use]
    pub fn new(source: &'static str) -> Self {
        let anchored = format!("^(?:{source})$");
        let regex = Regex::new(&anchored)
            .unwrap_or_else(|error| panic!("pattern {source} failed to compile: {error}"));
        Self { source, regex }
    }

    /// Pattern as declared in the rule table.
    #[must_use]
    pub fn source(&self) -> &'static str {
        self.source
    }

    /// Whether the whole value matches.
    #[must_use]
    pub fn is_match(&self, value: &str) -> bool {
        self.regex.is_match(value)
    }
}

/// A single field constraint.
#[derive(Debug, Clone)]
pub enum Constraint {
    /// Value must be present.
    Required,
    /// Text must contain a non-whitespace character.
    NotBlank,
    /// Text length, in characters, within bounds.
    Length { min: usize, max: usize },
    /// Integer lower bound.
    Min(i64),
    /// Integer upper bound.
    Max(i64),
    /// Decimal lower bound (inclusive).
    DecimalMin(Decimal),
    /// Decimal upper bound (inclusive).
    DecimalMax(Decimal),
    /// Maximum integer and fractional digits.
    Digits { integer: u32, fraction: u32 },
    /// Text must match the whole pattern.
    Pattern(PatternRule),
    /// Text must contain at least one non-digit; blank text passes.
    NotNumericOnly,
    /// Date text must parse as `yyyy/mm/dd`.
    DateFormat,
    /// Parsed date within inclusive bounds; unparseable or absent passes.
    DateInRange { min: NaiveDate, max: NaiveDate },
    /// Collection size within bounds.
    Count { min: usize, max: usize },
}

impl Constraint {
    /// Whether `value` satisfies the constraint.
    #[must_use]
    pub fn is_satisfied(&self, value: &FieldValue<'_>) -> bool {
        match (self, value) {
            (Self::Required, FieldValue::Absent) => false,
            (Self::NotBlank, FieldValue::Text(text)) => !text.trim().is_empty(),
            (Self::Length { min, max }, FieldValue::Text(text)) => {
                let length = text.chars().count();
                (*min..=*max).contains(&length)
            }
            (Self::Min(min), FieldValue::Integer(value)) => value >= min,
            (Self::Max(max), FieldValue::Integer(value)) => value <= max,
            (Self::DecimalMin(min), FieldValue::Decimal(value)) => value >= min,
            (Self::DecimalMax(max), FieldValue::Decimal(value)) => value <= max,
            (Self::Digits { integer, fraction }, FieldValue::Decimal(value)) => {
                integer_digits(*value) <= *integer && value.normalize().scale() <= *fraction
            }
            (Self::Pattern(pattern), FieldValue::Text(text)) => pattern.is_match(text),
            (Self::NotNumericOnly, FieldValue::Text(text)) => {
                let trimmed = text.trim();
                trimmed.is_empty() || trimmed.chars().any(|c| !c.is_ascii_digit())
            }
            (Self::DateFormat, FieldValue::Date(raw)) => parse_wire_date(raw).is_some(),
            (Self::DateInRange { min, max }, FieldValue::Date(raw)) => {
                parse_wire_date(raw).is_none_or(|date| (*min..=*max).contains(&date))
            }
            (Self::Count { min, max }, FieldValue::List(count)) => (*min..=*max).contains(count),
            _ => true,
        }
    }

    /// Classification weight of a failure of this constraint.
    #[must_use]
    pub fn kind(&self) -> ViolationKind {
        match self {
            Self::Required | Self::DateFormat => ViolationKind::Structural,
            _ => ViolationKind::Rule,
        }
    }

    /// Structured payload describing the constraint for error details.
    #[must_use]
    pub fn payload(&self, value: &FieldValue<'_>) -> Option<Value> {
        match self {
            Self::Length { min, max } | Self::Count { min, max } => {
                Some(json!({ "min": min, "max": max }))
            }
            Self::Min(min) => Some(json!({ "min": min })),
            Self::Max(max) => Some(json!({ "max": max })),
            Self::DecimalMin(min) => Some(json!({ "min": min.to_f64() })),
            Self::DecimalMax(max) => Some(json!({ "max": max.to_f64() })),
            Self::Digits { integer, fraction } => {
                Some(json!({ "integer": integer, "fraction": fraction }))
            }
            Self::Pattern(pattern) => Some(json!({ "pattern": pattern.source() })),
            Self::DateInRange { min, max } => Some(json!({
                "min": format_wire_date(*min),
                "max": format_wire_date(*max),
            })),
            Self::DateFormat => match value {
                FieldValue::Date(raw) => Some(json!({
                    "invalidValue": raw,
                    "expectedType": "yyyy/MM/dd",
                })),
                _ => None,
            },
            Self::Required | Self::NotBlank | Self::NotNumericOnly => None,
        }
    }
}

fn integer_digits(value: Decimal) -> u32 {
    let whole = value.trunc().abs();
    if whole.is_zero() {
        return 0;
    }
    let digits = whole.normalize().to_string().len();
    u32::try_from(digits).unwrap_or(u32::MAX)
}

/// A constraint plus the key of its violation message.
#[derive(Debug, Clone)]
pub struct Rule {
    constraint: Constraint,
    message_key: &'static str,
}

impl Rule {
    /// Pair a constraint with its message key.
    #[must_use]
    pub fn new(constraint: Constraint, message_key: &'static str) -> Self {
        Self {
            constraint,
            message_key,
        }
    }

    /// The constraint being checked.
    #[must_use]
    pub fn constraint(&self) -> &Constraint {
        &self.constraint
    }

    /// Message key resolved through a [`MessageLookup`].
    #[must_use]
    pub fn message_key(&self) -> &'static str {
        self.message_key
    }
}

/// Ordered rules for one field.
#[derive(Debug, Clone)]
pub struct FieldRules {
    field: &'static str,
    rules: Vec<Rule>,
}

impl FieldRules {
    /// Field identifier as it appears on the wire.
    #[must_use]
    pub fn field(&self) -> &'static str {
        self.field
    }

    /// Rules in evaluation order.
    #[must_use]
    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }
}

/// Ordered field rules for one payload shape.
#[derive(Debug, Clone, Default)]
pub struct RuleSet {
    fields: Vec<FieldRules>,
}

impl RuleSet {
    /// Append a field and its rules, keeping declaration order.
    #[must_use]
    pub fn field(mut self, field: &'static str, rules: Vec<Rule>) -> Self {
        self.fields.push(FieldRules { field, rules });
        self
    }

    /// Fields in declaration order.
    #[must_use]
    pub fn fields(&self) -> &[FieldRules] {
        &self.fields
    }
}

/// Resolves message keys to human-readable text.
pub trait MessageLookup: Send + Sync {
    /// Resolve `key`, returning `None` when the catalogue has no entry.
    fn lookup(&self, key: &str) -> Option<String>;

    /// Resolve `key`, falling back to the key itself.
    fn resolve(&self, key: &str) -> String {
        self.lookup(key).unwrap_or_else(|| key.to_owned())
    }
}

/// Built-in English messages.
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultMessages;

impl MessageLookup for DefaultMessages {
    fn lookup(&self, key: &str) -> Option<String> {
        let message = match key {
            "user.name.required" => "name is required",
            "user.name.notBlank" => "name must not be blank",
            "user.name.size" => "name must be between 1 and 200 characters",
            "user.name.notNumeric" => "name must not consist of digits only",
            "user.age.required" => "age is required",
            "user.age.min" => "age must be at least 0",
            "user.age.max" => "age must be at most 150",
            "user.birthday.required" => "birthday is required",
            "user.birthday.format" => "birthday must be formatted as yyyy/MM/dd",
            "user.birthday.range" => "birthday must be between 1900/01/01 and 2099/12/31",
            "user.height.digits" => "height must have at most 3 integer digits and 1 decimal",
            "user.height.min" => "height must be at least 0.0",
            "user.height.max" => "height must be at most 300.0",
            "user.zip.pattern" => "zipCode must match 000-0000",
            "user.zip.size" => "zipCode must be 8 characters",
            "user.career.count" => "careerHistories must contain between 1 and 50 entries",
            "career.title.required" => "title is required",
            "career.title.notBlank" => "title must not be blank",
            "career.title.size" => "title must be between 1 and 200 characters",
            "career.title.notNumeric" => "title must not consist of digits only",
            "career.period.required" => "period is required",
            "period.from.required" => "period.from is required",
            "period.from.format" => "period.from must be formatted as yyyy/MM/dd",
            "period.from.range" => "period.from must be between 1900/01/01 and 2099/12/31",
            "period.to.required" => "period.to is required",
            "period.to.format" => "period.to must be formatted as yyyy/MM/dd",
            "period.to.range" => "period.to must be between 1900/01/01 and 2099/12/31",
            "user.list.name.size" => "name must be between 1 and 200 characters",
            "user.list.name.pattern" => "name must not consist of digits only",
            "user.list.limit.min" => "limit must be at least 0",
            "user.list.limit.max" => "limit must be at most 100",
            "user.list.offset.min" => "offset must be at least 0",
            _ => return None,
        };
        Some(message.to_owned())
    }
}

fn calendar_date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day)
        .unwrap_or_else(|| panic!("invalid calendar bound {year}-{month}-{day}"))
}

fn date_in_range() -> Constraint {
    Constraint::DateInRange {
        min: calendar_date(1900, 1, 1),
        max: calendar_date(2099, 12, 31),
    }
}

fn text_rules(keys: [&'static str; 3]) -> Vec<Rule> {
    let [not_blank, size, not_numeric] = keys;
    vec![
        Rule::new(Constraint::NotBlank, not_blank),
        Rule::new(Constraint::Length { min: 1, max: 200 }, size),
        Rule::new(Constraint::NotNumericOnly, not_numeric),
    ]
}

fn with_required(required_key: &'static str, rules: Vec<Rule>) -> Vec<Rule> {
    let mut all = Vec::with_capacity(rules.len() + 1);
    all.push(Rule::new(Constraint::Required, required_key));
    all.extend(rules);
    all
}

fn age_rules() -> Vec<Rule> {
    vec![
        Rule::new(Constraint::Min(0), "user.age.min"),
        Rule::new(Constraint::Max(150), "user.age.max"),
    ]
}

fn date_rules(format_key: &'static str, range_key: &'static str) -> Vec<Rule> {
    vec![
        Rule::new(Constraint::DateFormat, format_key),
        Rule::new(date_in_range(), range_key),
    ]
}

fn height_rules() -> Vec<Rule> {
    vec![
        Rule::new(
            Constraint::Digits {
                integer: 3,
                fraction: 1,
            },
            "user.height.digits",
        ),
        Rule::new(Constraint::DecimalMin(Decimal::ZERO), "user.height.min"),
        Rule::new(Constraint::DecimalMax(Decimal::new(3000, 1)), "user.height.max"),
    ]
}

fn zip_code_rules() -> Vec<Rule> {
    vec![
        Rule::new(
            Constraint::Pattern(PatternRule::new(ZIP_CODE_PATTERN)),
            "user.zip.pattern",
        ),
        Rule::new(Constraint::Length { min: 8, max: 8 }, "user.zip.size"),
    ]
}

const USER_NAME_KEYS: [&str; 3] = ["user.name.notBlank", "user.name.size", "user.name.notNumeric"];
const TITLE_KEYS: [&str; 3] = [
    "career.title.notBlank",
    "career.title.size",
    "career.title.notNumeric",
];

/// Rules for `POST /users` bodies.
pub static USER_CREATE_RULES: LazyLock<RuleSet> = LazyLock::new(|| {
    RuleSet::default()
        .field(
            "name",
            with_required("user.name.required", text_rules(USER_NAME_KEYS)),
        )
        .field("age", with_required("user.age.required", age_rules()))
        .field(
            "birthday",
            with_required(
                "user.birthday.required",
                date_rules("user.birthday.format", "user.birthday.range"),
            ),
        )
        .field("height", height_rules())
        .field("zipCode", zip_code_rules())
        .field(
            "careerHistories",
            vec![Rule::new(
                Constraint::Count { min: 1, max: 50 },
                "user.career.count",
            )],
        )
});

/// Rules for career history entries inside create bodies.
pub static CAREER_HISTORY_CREATE_RULES: LazyLock<RuleSet> = LazyLock::new(|| {
    RuleSet::default()
        .field(
            "title",
            with_required("career.title.required", text_rules(TITLE_KEYS)),
        )
        .field(
            "period",
            vec![Rule::new(Constraint::Required, "career.period.required")],
        )
});

/// Rules for periods inside create bodies.
pub static PERIOD_CREATE_RULES: LazyLock<RuleSet> = LazyLock::new(|| {
    RuleSet::default()
        .field(
            "from",
            with_required(
                "period.from.required",
                date_rules("period.from.format", "period.from.range"),
            ),
        )
        .field(
            "to",
            with_required(
                "period.to.required",
                date_rules("period.to.format", "period.to.range"),
            ),
        )
});

/// Rules for `PUT /users/{id}` bodies; only supplied fields are checked.
pub static USER_UPDATE_RULES: LazyLock<RuleSet> = LazyLock::new(|| {
    RuleSet::default()
        .field("name", text_rules(USER_NAME_KEYS))
        .field("age", age_rules())
        .field(
            "birthday",
            date_rules("user.birthday.format", "user.birthday.range"),
        )
        .field("height", height_rules())
        .field("zipCode", zip_code_rules())
        .field("careerHistories", Vec::new())
});

/// Rules for career history entries inside update bodies.
pub static CAREER_HISTORY_UPDATE_RULES: LazyLock<RuleSet> = LazyLock::new(|| {
    RuleSet::default()
        .field("title", text_rules(TITLE_KEYS))
        .field("period", Vec::new())
});

/// Rules for periods inside update bodies.
pub static PERIOD_UPDATE_RULES: LazyLock<RuleSet> = LazyLock::new(|| {
    RuleSet::default()
        .field("from", date_rules("period.from.format", "period.from.range"))
        .field("to", date_rules("period.to.format", "period.to.range"))
});

/// Rules for `GET /users` query parameters.
pub static LIST_QUERY_RULES: LazyLock<RuleSet> = LazyLock::new(|| {
    RuleSet::default()
        .field(
            "name",
            vec![
                Rule::new(Constraint::Length { min: 1, max: 200 }, "user.list.name.size"),
                Rule::new(
                    Constraint::Pattern(PatternRule::new(".*[^0-9].*")),
                    "user.list.name.pattern",
                ),
            ],
        )
        .field(
            "limit",
            vec![
                Rule::new(Constraint::Min(0), "user.list.limit.min"),
                Rule::new(Constraint::Max(100), "user.list.limit.max"),
            ],
        )
        .field(
            "offset",
            vec![Rule::new(Constraint::Min(0), "user.list.offset.min")],
        )
});
