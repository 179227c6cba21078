//! Typed, bounded configuration property descriptors
//!
//! A [`Property`] names one configuration key, the type its raw string value
//! must parse into, optional bounds and a default. Descriptors never store
//! values; they validate and extract from a [`ConfigSet`] on demand.
//!
//! Blank and invalid are different things. A blank property (absent, or only
//! whitespace) is valid and falls back to the default. A non-blank property
//! that fails to parse, or falls outside its bounds, is invalid.

use super::ConfigSet;
use serde_json::Value;
use std::fmt;

/// The closed set of property value types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PropertyKind {
    Integer,
    Text,
    Boolean,
    Structured,
}

impl fmt::Display for PropertyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Integer => write!(f, "integer"),
            Self::Text => write!(f, "string"),
            Self::Boolean => write!(f, "boolean"),
            Self::Structured => write!(f, "structured"),
        }
    }
}

/// A resolved property value tagged with its kind
#[derive(Debug, Clone, PartialEq)]
pub enum PropertyValue {
    Integer(i64),
    Text(String),
    Boolean(bool),
    Structured(Value),
}

impl PropertyValue {
    pub fn kind(&self) -> PropertyKind {
        match self {
            Self::Integer(_) => PropertyKind::Integer,
            Self::Text(_) => PropertyKind::Text,
            Self::Boolean(_) => PropertyKind::Boolean,
            Self::Structured(_) => PropertyKind::Structured,
        }
    }
}

impl fmt::Display for PropertyValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Integer(v) => write!(f, "{}", v),
            Self::Text(v) => write!(f, "{}", v),
            Self::Boolean(v) => write!(f, "{}", v),
            Self::Structured(v) => write!(f, "{}", v),
        }
    }
}

/// A Rust type a property can resolve to
///
/// Implemented for the four members of [`PropertyKind`]: `i64`, `String`,
/// `bool` and `serde_json::Value`. Only integers are ordered, so only they
/// override the bounds hooks.
pub trait PropertyType: Clone + fmt::Debug + PartialEq + Send + Sync + Sized + 'static {
    /// The tag for this type
    const KIND: PropertyKind;

    /// The default used when a descriptor declares none
    fn type_default() -> Self;

    /// Parse a non-blank raw value
    fn parse(raw: &str) -> Result<Self, String>;

    /// Check the value against optional bounds
    fn within(&self, _min: Option<&Self>, _max: Option<&Self>) -> bool {
        true
    }

    /// Pin the value to optional bounds
    fn clamp_to(self, _min: Option<&Self>, _max: Option<&Self>) -> Self {
        self
    }

    /// Wrap the value in its tagged form
    fn into_value(self) -> PropertyValue;

    /// Erase the descriptor type so heterogeneous descriptors can be listed together
    fn erase(property: &Property<Self>) -> AnyProperty<'_>;
}

impl PropertyType for i64 {
    const KIND: PropertyKind = PropertyKind::Integer;

    fn type_default() -> Self {
        0
    }

    fn parse(raw: &str) -> Result<Self, String> {
        raw.trim().parse::<i64>().map_err(|e| e.to_string())
    }

    fn within(&self, min: Option<&Self>, max: Option<&Self>) -> bool {
        min.is_none_or(|min| self >= min) && max.is_none_or(|max| self <= max)
    }

    fn clamp_to(self, min: Option<&Self>, max: Option<&Self>) -> Self {
        let value = max.map_or(self, |max| self.min(*max));
        min.map_or(value, |min| value.max(*min))
    }

    fn into_value(self) -> PropertyValue {
        PropertyValue::Integer(self)
    }

    fn erase(property: &Property<Self>) -> AnyProperty<'_> {
        AnyProperty::Integer(property)
    }
}

impl PropertyType for String {
    const KIND: PropertyKind = PropertyKind::Text;

    fn type_default() -> Self {
        String::new()
    }

    fn parse(raw: &str) -> Result<Self, String> {
        Ok(raw.to_string())
    }

    fn into_value(self) -> PropertyValue {
        PropertyValue::Text(self)
    }

    fn erase(property: &Property<Self>) -> AnyProperty<'_> {
        AnyProperty::Text(property)
    }
}

impl PropertyType for bool {
    const KIND: PropertyKind = PropertyKind::Boolean;

    fn type_default() -> Self {
        false
    }

    fn parse(raw: &str) -> Result<Self, String> {
        match raw.trim().to_lowercase().as_str() {
            "true" => Ok(true),
            "false" => Ok(false),
            other => Err(format!("'{}' is not a boolean", other)),
        }
    }

    fn into_value(self) -> PropertyValue {
        PropertyValue::Boolean(self)
    }

    fn erase(property: &Property<Self>) -> AnyProperty<'_> {
        AnyProperty::Boolean(property)
    }
}

impl PropertyType for Value {
    const KIND: PropertyKind = PropertyKind::Structured;

    fn type_default() -> Self {
        Value::Object(serde_json::Map::new())
    }

    fn parse(raw: &str) -> Result<Self, String> {
        match serde_json::from_str::<Value>(raw).map_err(|e| e.to_string())? {
            value @ (Value::Object(_) | Value::Array(_)) => Ok(value),
            _ => Err("expected a JSON object or array".to_string()),
        }
    }

    fn into_value(self) -> PropertyValue {
        PropertyValue::Structured(self)
    }

    fn erase(property: &Property<Self>) -> AnyProperty<'_> {
        AnyProperty::Structured(property)
    }
}

/// Outcome of checking one property against a configuration set
enum Check<T> {
    Blank,
    Valid(T),
    Invalid(String),
}

/// An immutable, named, typed rule for validating and extracting one
/// configuration value
///
/// # Example
/// ```
/// use multistage_ingest::config::{ConfigSet, Property};
///
/// let max_keys = Property::<i64>::bounded("ms.s3.list.max.keys", 1, 1000, 1000);
///
/// let config = ConfigSet::from_pairs([("ms.s3.list.max.keys", "250")]);
/// assert_eq!(max_keys.value_or_default(&config), 250);
///
/// let config = ConfigSet::from_pairs([("ms.s3.list.max.keys", "5000")]);
/// assert!(!max_keys.is_valid(&config));
/// assert_eq!(max_keys.value_or_default(&config), 1000);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Property<T: PropertyType> {
    key: &'static str,
    default_value: T,
    min_value: Option<T>,
    max_value: Option<T>,
    secret: bool,
}

impl<T: PropertyType> Property<T> {
    /// Create an unbounded property with the type's default value
    pub fn new(key: &'static str) -> Self {
        Self::with_default(key, T::type_default())
    }

    /// Create an unbounded property with an explicit default
    pub fn with_default(key: &'static str, default_value: impl Into<T>) -> Self {
        Self {
            key,
            default_value: default_value.into(),
            min_value: None,
            max_value: None,
            secret: false,
        }
    }

    /// Mark the property as holding a credential, masking it in reports
    pub fn secret(mut self) -> Self {
        self.secret = true;
        self
    }

    /// The configuration key
    pub fn key(&self) -> &'static str {
        self.key
    }

    pub fn kind(&self) -> PropertyKind {
        T::KIND
    }

    pub fn default_value(&self) -> &T {
        &self.default_value
    }

    pub fn is_secret(&self) -> bool {
        self.secret
    }

    /// The raw, unvalidated value if present
    pub fn raw<'c>(&self, config: &'c ConfigSet) -> Option<&'c str> {
        config.get(self.key)
    }

    /// True when the key is absent or its value is empty or whitespace only
    pub fn is_blank(&self, config: &ConfigSet) -> bool {
        self.raw(config).is_none_or(|v| v.trim().is_empty())
    }

    /// True when the property is blank, or parses and satisfies its bounds
    ///
    /// Invalid values are logged, never raised.
    pub fn is_valid(&self, config: &ConfigSet) -> bool {
        match self.check(config) {
            Check::Blank | Check::Valid(_) => true,
            Check::Invalid(reason) => {
                self.log_invalid(config, &reason);
                false
            }
        }
    }

    /// True only when the property is present and valid
    pub fn is_valid_non_blank(&self, config: &ConfigSet) -> bool {
        !self.is_blank(config) && self.is_valid(config)
    }

    /// The parsed value when present and valid, otherwise the default
    ///
    /// Never fails. The clamp below only matters if a value slips past the
    /// bounds check; validated values pass through unchanged.
    pub fn value_or_default(&self, config: &ConfigSet) -> T {
        match self.check(config) {
            Check::Valid(value) => {
                value.clamp_to(self.min_value.as_ref(), self.max_value.as_ref())
            }
            Check::Blank => self.default_value.clone(),
            Check::Invalid(reason) => {
                self.log_invalid(config, &reason);
                self.default_value.clone()
            }
        }
    }

    /// Resolve to a tagged value, using the default when blank or invalid
    pub fn resolve(&self, config: &ConfigSet) -> PropertyValue {
        self.value_or_default(config).into_value()
    }

    /// Type-erased view of this descriptor
    pub fn as_any(&self) -> AnyProperty<'_> {
        T::erase(self)
    }

    fn check(&self, config: &ConfigSet) -> Check<T> {
        let raw = match self.raw(config) {
            Some(raw) if !raw.trim().is_empty() => raw,
            _ => return Check::Blank,
        };

        match T::parse(raw) {
            Ok(value) if value.within(self.min_value.as_ref(), self.max_value.as_ref()) => {
                Check::Valid(value)
            }
            Ok(_) => Check::Invalid("value is out of bounds".to_string()),
            Err(e) => Check::Invalid(e),
        }
    }

    fn log_invalid(&self, config: &ConfigSet, reason: &str) {
        let shown = match (self.secret, self.raw(config)) {
            (true, _) => "********",
            (false, Some(raw)) => raw,
            (false, None) => "",
        };
        log::error!(
            "Property {} ({}) has invalid value '{}': {}",
            self.key,
            T::KIND,
            shown,
            reason
        );
    }
}

impl Property<i64> {
    /// Create an integer property bounded to `[min_value, max_value]`
    ///
    /// # Panics
    /// Panics unless `min_value <= default_value <= max_value`. Descriptors are
    /// built once at startup, so a violation is a programming error.
    pub fn bounded(key: &'static str, min_value: i64, max_value: i64, default_value: i64) -> Self {
        assert!(
            min_value <= default_value && default_value <= max_value,
            "property {}: default {} must lie within [{}, {}]",
            key,
            default_value,
            min_value,
            max_value
        );
        Self {
            key,
            default_value,
            min_value: Some(min_value),
            max_value: Some(max_value),
            secret: false,
        }
    }

    /// Lower bound, `i64::MIN` when unbounded
    pub fn min_value(&self) -> i64 {
        self.min_value.unwrap_or(i64::MIN)
    }

    /// Upper bound, `i64::MAX` when unbounded
    pub fn max_value(&self) -> i64 {
        self.max_value.unwrap_or(i64::MAX)
    }
}

impl<T: PropertyType> fmt::Display for Property<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.key)
    }
}

/// A borrowed descriptor of any kind
///
/// Lets the catalog hand out lists of mixed descriptors, e.g. the essential
/// parameters each extraction key type reports on.
#[derive(Debug, Clone, Copy)]
pub enum AnyProperty<'a> {
    Integer(&'a Property<i64>),
    Text(&'a Property<String>),
    Boolean(&'a Property<bool>),
    Structured(&'a Property<Value>),
}

impl AnyProperty<'_> {
    pub fn key(&self) -> &'static str {
        match self {
            Self::Integer(p) => p.key(),
            Self::Text(p) => p.key(),
            Self::Boolean(p) => p.key(),
            Self::Structured(p) => p.key(),
        }
    }

    pub fn kind(&self) -> PropertyKind {
        match self {
            Self::Integer(_) => PropertyKind::Integer,
            Self::Text(_) => PropertyKind::Text,
            Self::Boolean(_) => PropertyKind::Boolean,
            Self::Structured(_) => PropertyKind::Structured,
        }
    }

    pub fn is_secret(&self) -> bool {
        match self {
            Self::Integer(p) => p.is_secret(),
            Self::Text(p) => p.is_secret(),
            Self::Boolean(p) => p.is_secret(),
            Self::Structured(p) => p.is_secret(),
        }
    }

    pub fn is_blank(&self, config: &ConfigSet) -> bool {
        match self {
            Self::Integer(p) => p.is_blank(config),
            Self::Text(p) => p.is_blank(config),
            Self::Boolean(p) => p.is_blank(config),
            Self::Structured(p) => p.is_blank(config),
        }
    }

    pub fn is_valid(&self, config: &ConfigSet) -> bool {
        match self {
            Self::Integer(p) => p.is_valid(config),
            Self::Text(p) => p.is_valid(config),
            Self::Boolean(p) => p.is_valid(config),
            Self::Structured(p) => p.is_valid(config),
        }
    }

    pub fn resolve(&self, config: &ConfigSet) -> PropertyValue {
        match self {
            Self::Integer(p) => p.resolve(config),
            Self::Text(p) => p.resolve(config),
            Self::Boolean(p) => p.resolve(config),
            Self::Structured(p) => p.resolve(config),
        }
    }

    pub fn default_value(&self) -> PropertyValue {
        match self {
            Self::Integer(p) => p.default_value().clone().into_value(),
            Self::Text(p) => p.default_value().clone().into_value(),
            Self::Boolean(p) => p.default_value().clone().into_value(),
            Self::Structured(p) => p.default_value().clone().into_value(),
        }
    }

    /// Integer bounds, if this is an integer descriptor
    pub fn bounds(&self) -> Option<(i64, i64)> {
        match self {
            Self::Integer(p) => Some((p.min_value(), p.max_value())),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn config(key: &str, value: &str) -> ConfigSet {
        ConfigSet::from_pairs([(key, value)])
    }

    #[test]
    fn test_absent_key_is_blank_for_every_kind() {
        let empty = ConfigSet::new();
        assert!(Property::<i64>::new("a").is_blank(&empty));
        assert!(Property::<String>::new("b").is_blank(&empty));
        assert!(Property::<bool>::new("c").is_blank(&empty));
        assert!(Property::<Value>::new("d").is_blank(&empty));
    }

    #[test]
    fn test_whitespace_is_blank_and_valid() {
        let prop = Property::<i64>::bounded("n", 0, 10, 5);
        let cfg = config("n", "   ");
        assert!(prop.is_blank(&cfg));
        assert!(prop.is_valid(&cfg));
        assert!(!prop.is_valid_non_blank(&cfg));
        assert_eq!(prop.value_or_default(&cfg), 5);
    }

    #[test]
    fn test_out_of_bounds_falls_back_to_default() {
        let prop = Property::<i64>::bounded("n", 0, 100, 0);
        let cfg = config("n", "150");
        assert!(!prop.is_blank(&cfg));
        assert!(!prop.is_valid(&cfg));
        assert!(!prop.is_valid_non_blank(&cfg));
        assert_eq!(prop.value_or_default(&cfg), 0);
    }

    #[test]
    fn test_in_bounds_passes_through() {
        let prop = Property::<i64>::bounded("n", 0, 100, 0);
        for (raw, expected) in [("0", 0), ("42", 42), ("100", 100), (" 7 ", 7)] {
            let cfg = config("n", raw);
            assert!(prop.is_valid_non_blank(&cfg), "{} should be valid", raw);
            assert_eq!(prop.value_or_default(&cfg), expected);
        }
    }

    #[test]
    fn test_numeric_result_always_in_bounds_or_default() {
        let prop = Property::<i64>::bounded("n", -10, 10, 3);
        for raw in ["-11", "-10", "0", "10", "11", "abc", "", "9999999999999999999"] {
            let value = prop.value_or_default(&config("n", raw));
            assert!(
                (-10..=10).contains(&value) || value == 3,
                "{} resolved to {}",
                raw,
                value
            );
        }
    }

    #[test]
    fn test_unparsable_integer_is_invalid() {
        let prop = Property::<i64>::with_default("n", 12);
        let cfg = config("n", "twelve");
        assert!(!prop.is_valid(&cfg));
        assert_eq!(prop.value_or_default(&cfg), 12);
    }

    #[test]
    fn test_value_or_default_is_idempotent() {
        let prop = Property::<Value>::new("params");
        let cfg = config("params", r#"{"region": "us-east-1"}"#);
        let first = prop.value_or_default(&cfg);
        let second = prop.value_or_default(&cfg);
        assert_eq!(first, second);
        assert_eq!(first, json!({"region": "us-east-1"}));
    }

    #[test]
    #[should_panic(expected = "must lie within")]
    fn test_default_outside_bounds_panics() {
        let _ = Property::<i64>::bounded("n", 1, 10, 0);
    }

    #[test]
    fn test_unbounded_integer_limits() {
        let prop = Property::<i64>::new("n");
        assert_eq!(prop.min_value(), i64::MIN);
        assert_eq!(prop.max_value(), i64::MAX);
        assert_eq!(*prop.default_value(), 0);
    }

    #[test]
    fn test_boolean_parsing() {
        let prop = Property::<bool>::with_default("flag", true);
        assert!(!prop.value_or_default(&config("flag", "FALSE")));
        assert!(prop.value_or_default(&config("flag", "true")));
        assert!(!prop.is_valid(&config("flag", "yes")));
        assert!(prop.value_or_default(&config("flag", "yes")));
    }

    #[test]
    fn test_structured_rejects_scalars() {
        let prop = Property::<Value>::new("params");
        assert!(!prop.is_valid(&config("params", "42")));
        assert!(!prop.is_valid(&config("params", "{not json")));
        assert!(prop.is_valid(&config("params", "[1, 2]")));
        assert_eq!(prop.value_or_default(&config("params", "42")), json!({}));
    }

    #[test]
    fn test_text_default() {
        let prop = Property::<String>::with_default("sep", ",");
        assert_eq!(prop.value_or_default(&ConfigSet::new()), ",");
        assert_eq!(prop.value_or_default(&config("sep", "|")), "|");
    }

    #[test]
    fn test_any_property() {
        let prop = Property::<i64>::bounded("n", 0, 100, 10);
        let any = prop.as_any();
        assert_eq!(any.key(), "n");
        assert_eq!(any.kind(), PropertyKind::Integer);
        assert_eq!(any.bounds(), Some((0, 100)));
        assert_eq!(any.default_value(), PropertyValue::Integer(10));
        assert_eq!(any.resolve(&config("n", "55")), PropertyValue::Integer(55));

        let text = Property::<String>::new("t").secret();
        assert!(text.as_any().is_secret());
        assert_eq!(text.as_any().bounds(), None);
    }
}
