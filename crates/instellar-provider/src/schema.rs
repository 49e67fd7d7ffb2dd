//! Declarative schemas and configuration validation
//!
//! A schema lists the attributes a resource accepts, which of them the user
//! must set, which are computed by Instellar, which are secret, and which can
//! change in place. Configuration documents are checked against it before any
//! remote call is made.

use crate::diagnostics::Diagnostics;
use regex::Regex;
use serde::{Serialize, Serializer};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::LazyLock;

/// Lowercase alphanumerics and dashes
pub static NAME_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z0-9\-]+$").expect("name pattern is a valid regex"));

/// Infrastructure providers Instellar can provision on
pub const CLOUD_PROVIDERS: &[&str] = &["aws", "hcloud", "digitalocean", "google", "azurerm"];

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AttributeType {
    String,
    Int64,
    Number,
    Bool,
    List(Box<AttributeType>),
}

impl AttributeType {
    pub fn list_of(element: AttributeType) -> Self {
        AttributeType::List(Box::new(element))
    }

    fn accepts(&self, value: &Value) -> bool {
        match self {
            AttributeType::String => value.is_string(),
            AttributeType::Int64 => value.is_i64() || value.is_u64(),
            AttributeType::Number => value.is_number(),
            AttributeType::Bool => value.is_boolean(),
            AttributeType::List(element) => value
                .as_array()
                .is_some_and(|items| items.iter().all(|item| element.accepts(item))),
        }
    }

    /// Convert a value the way the configuration language would, e.g. the
    /// string id of another resource into a number.
    fn coerce(&self, value: &mut Value) {
        let converted = match (self, &*value) {
            (AttributeType::Int64 | AttributeType::Number, Value::String(s)) => {
                let s = s.trim();
                s.parse::<i64>()
                    .map(Value::from)
                    .or_else(|_| s.parse::<u64>().map(Value::from))
                    .ok()
            }
            (AttributeType::Bool, Value::String(s)) => match s.as_str() {
                "true" => Some(Value::Bool(true)),
                "false" => Some(Value::Bool(false)),
                _ => None,
            },
            (AttributeType::String, Value::Number(n)) => Some(Value::String(n.to_string())),
            _ => None,
        };

        if let Some(converted) = converted {
            *value = converted;
            return;
        }

        if let (AttributeType::List(element), Value::Array(items)) = (self, value) {
            for item in items.iter_mut() {
                element.coerce(item);
            }
        }
    }
}

impl fmt::Display for AttributeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttributeType::String => write!(f, "string"),
            AttributeType::Int64 => write!(f, "number"),
            AttributeType::Number => write!(f, "number"),
            AttributeType::Bool => write!(f, "bool"),
            AttributeType::List(element) => write!(f, "list of {}", element),
        }
    }
}

/// String validation rule
#[derive(Debug, Clone)]
pub enum Validator {
    LengthBetween { min: usize, max: usize },
    RegexMatches { pattern: Regex, message: &'static str },
    OneOf(&'static [&'static str]),
    IntBetween { min: i64, max: i64 },
}

impl Validator {
    pub fn length_between(min: usize, max: usize) -> Self {
        Validator::LengthBetween { min, max }
    }

    pub fn regex_matches(pattern: &Regex, message: &'static str) -> Self {
        Validator::RegexMatches {
            pattern: pattern.clone(),
            message,
        }
    }

    pub fn one_of(values: &'static [&'static str]) -> Self {
        Validator::OneOf(values)
    }

    pub fn int_between(min: i64, max: i64) -> Self {
        Validator::IntBetween { min, max }
    }

    /// String rules apply to strings, integer rules to numbers
    fn validate(&self, value: &Value) -> Result<(), String> {
        match (self, value) {
            (Validator::IntBetween { min, max }, Value::Number(n)) => {
                if !n.as_i64().is_some_and(|i| i >= *min && i <= *max) {
                    return Err(format!("value must be between {} and {}, got: {}", min, max, n));
                }
                Ok(())
            }
            (Validator::IntBetween { .. }, _) => Ok(()),
            (_, Value::String(s)) => self.validate_str(s),
            _ => Ok(()),
        }
    }

    fn validate_str(&self, value: &str) -> Result<(), String> {
        match self {
            Validator::IntBetween { .. } => {}
            Validator::LengthBetween { min, max } => {
                let len = value.chars().count();
                if len < *min || len > *max {
                    return Err(format!(
                        "string length must be between {} and {}, got: {}",
                        min, max, len
                    ));
                }
            }
            Validator::RegexMatches { pattern, message } => {
                if !pattern.is_match(value) {
                    return Err(format!("{}, got: {}", message, value));
                }
            }
            Validator::OneOf(values) => {
                if !values.iter().any(|v| *v == value) {
                    return Err(format!(
                        "value must be one of: {}, got: \"{}\"",
                        values
                            .iter()
                            .map(|v| format!("\"{}\"", v))
                            .collect::<Vec<_>>()
                            .join(", "),
                        value
                    ));
                }
            }
        }
        Ok(())
    }
}

impl fmt::Display for Validator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Validator::LengthBetween { min, max } => {
                write!(f, "length between {} and {}", min, max)
            }
            Validator::RegexMatches { pattern, message } => {
                write!(f, "matches {} ({})", pattern.as_str(), message)
            }
            Validator::OneOf(values) => write!(f, "one of {}", values.join(", ")),
            Validator::IntBetween { min, max } => write!(f, "between {} and {}", min, max),
        }
    }
}

impl Serialize for Validator {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Attribute {
    pub description: &'static str,
    #[serde(rename = "type")]
    pub attribute_type: AttributeType,
    pub required: bool,
    pub optional: bool,
    pub computed: bool,
    pub sensitive: bool,
    /// Changes are sent to Instellar in place instead of replacing the entity
    pub updatable: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub validators: Vec<Validator>,
}

impl Attribute {
    fn new(attribute_type: AttributeType, description: &'static str) -> Self {
        Self {
            description,
            attribute_type,
            required: false,
            optional: false,
            computed: false,
            sensitive: false,
            updatable: false,
            validators: Vec::new(),
        }
    }

    pub fn required(attribute_type: AttributeType, description: &'static str) -> Self {
        Self {
            required: true,
            ..Self::new(attribute_type, description)
        }
    }

    pub fn optional(attribute_type: AttributeType, description: &'static str) -> Self {
        Self {
            optional: true,
            ..Self::new(attribute_type, description)
        }
    }

    pub fn computed(attribute_type: AttributeType, description: &'static str) -> Self {
        Self {
            computed: true,
            ..Self::new(attribute_type, description)
        }
    }

    pub fn sensitive(mut self) -> Self {
        self.sensitive = true;
        self
    }

    pub fn updatable(mut self) -> Self {
        self.updatable = true;
        self
    }

    pub fn with_validator(mut self, validator: Validator) -> Self {
        self.validators.push(validator);
        self
    }

    /// Set by Instellar only, never by configuration
    pub fn is_read_only(&self) -> bool {
        self.computed && !self.required && !self.optional
    }
}

/// Nested single object, e.g. a component's `credential`
#[derive(Debug, Clone, Serialize)]
pub struct Block {
    pub description: &'static str,
    pub required: bool,
    pub updatable: bool,
    pub attributes: BTreeMap<&'static str, Attribute>,
}

impl Block {
    pub fn new(description: &'static str) -> Self {
        Self {
            description,
            required: false,
            updatable: false,
            attributes: BTreeMap::new(),
        }
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn attribute(mut self, name: &'static str, attribute: Attribute) -> Self {
        self.attributes.insert(name, attribute);
        self
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Schema {
    pub description: &'static str,
    pub attributes: BTreeMap<&'static str, Attribute>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub blocks: BTreeMap<&'static str, Block>,
}

impl Schema {
    pub fn new(description: &'static str) -> Self {
        Self {
            description,
            attributes: BTreeMap::new(),
            blocks: BTreeMap::new(),
        }
    }

    pub fn attribute(mut self, name: &'static str, attribute: Attribute) -> Self {
        self.attributes.insert(name, attribute);
        self
    }

    pub fn block(mut self, name: &'static str, block: Block) -> Self {
        self.blocks.insert(name, block);
        self
    }

    /// Apply type conversions to a configuration document in place
    pub fn coerce(&self, config: &mut Value) {
        let Some(object) = config.as_object_mut() else {
            return;
        };
        coerce_attributes(&self.attributes, object);
        for (name, block) in &self.blocks {
            if let Some(Value::Object(nested)) = object.get_mut(*name) {
                coerce_attributes(&block.attributes, nested);
            }
        }
    }

    /// Check a configuration document against the schema
    pub fn validate_config(&self, config: &Value) -> Diagnostics {
        let mut diags = Diagnostics::new();

        let Some(object) = config.as_object() else {
            diags.add_error(
                "Invalid configuration",
                format!("Expected a configuration object, got: {}", config),
            );
            return diags;
        };

        for key in object.keys() {
            if !self.attributes.contains_key(key.as_str()) && !self.blocks.contains_key(key.as_str())
            {
                diags.add_attribute_error(
                    key.clone(),
                    "Unsupported argument",
                    format!("An argument named \"{}\" is not expected here.", key),
                );
            }
        }

        validate_attributes("", &self.attributes, object, &mut diags);

        for (name, block) in &self.blocks {
            match object.get(*name) {
                None | Some(Value::Null) => {
                    if block.required {
                        diags.add_attribute_error(
                            *name,
                            "Missing required block",
                            format!("A block named \"{}\" is required here.", name),
                        );
                    }
                }
                Some(Value::Object(nested)) => {
                    for key in nested.keys() {
                        if !block.attributes.contains_key(key.as_str()) {
                            diags.add_attribute_error(
                                format!("{}.{}", name, key),
                                "Unsupported argument",
                                format!("An argument named \"{}\" is not expected here.", key),
                            );
                        }
                    }
                    validate_attributes(&format!("{}.", name), &block.attributes, nested, &mut diags);
                }
                Some(other) => {
                    diags.add_attribute_error(
                        *name,
                        "Incorrect block value type",
                        format!("Block \"{}\" must be an object, got: {}", name, other),
                    );
                }
            }
        }

        diags
    }

    /// Configured attributes whose change cannot be applied in place
    ///
    /// Compares `config` with the `prior` state and returns the paths of
    /// user settable attributes that differ and are not updatable. Computed
    /// attributes and attributes left unset in the configuration are skipped.
    pub fn replaced_attributes(&self, prior: &Value, config: &Value) -> Vec<String> {
        let mut replaced = Vec::new();

        for (name, attribute) in &self.attributes {
            if attribute.is_read_only() || attribute.updatable {
                continue;
            }
            if differs(config.get(*name), prior.get(*name)) {
                replaced.push(name.to_string());
            }
        }

        for (name, block) in &self.blocks {
            if block.updatable {
                continue;
            }
            let configured = config.get(*name).and_then(Value::as_object);
            let Some(configured) = configured else {
                continue;
            };
            let stored = prior.get(*name);
            for attribute_name in block.attributes.keys() {
                let before = stored.and_then(|s| s.get(*attribute_name));
                if differs(configured.get(*attribute_name), before) {
                    replaced.push(format!("{}.{}", name, attribute_name));
                }
            }
        }

        replaced
    }
}

fn differs(configured: Option<&Value>, stored: Option<&Value>) -> bool {
    match configured {
        None | Some(Value::Null) => false,
        Some(value) => stored != Some(value),
    }
}

fn coerce_attributes(attributes: &BTreeMap<&'static str, Attribute>, object: &mut Map<String, Value>) {
    for (name, attribute) in attributes {
        if let Some(value) = object.get_mut(*name) {
            attribute.attribute_type.coerce(value);
        }
    }
}

fn validate_attributes(
    prefix: &str,
    attributes: &BTreeMap<&'static str, Attribute>,
    object: &Map<String, Value>,
    diags: &mut Diagnostics,
) {
    for (name, attribute) in attributes {
        let path = format!("{}{}", prefix, name);
        let value = object.get(*name).filter(|v| !v.is_null());

        let Some(value) = value else {
            if attribute.required {
                diags.add_attribute_error(
                    path.clone(),
                    "Missing required argument",
                    format!("The argument \"{}\" is required, but no definition was found.", path),
                );
            }
            continue;
        };

        if attribute.is_read_only() {
            diags.add_attribute_error(
                path,
                "Invalid Configuration for Read-Only Attribute",
                "Cannot set value for this attribute as the provider has marked it as read-only. \
                 Remove the configuration line setting the value.",
            );
            continue;
        }

        if !attribute.attribute_type.accepts(value) {
            diags.add_attribute_error(
                path.clone(),
                "Incorrect attribute value type",
                format!(
                    "Inappropriate value for attribute \"{}\": {} required.",
                    path, attribute.attribute_type
                ),
            );
            continue;
        }

        let elements: Vec<(String, &Value)> = match value.as_array() {
            Some(items) => items
                .iter()
                .enumerate()
                .map(|(index, item)| (format!("{}.{}", path, index), item))
                .collect(),
            None => vec![(path.clone(), value)],
        };

        for (path, element) in elements {
            for validator in &attribute.validators {
                if let Err(message) = validator.validate(element) {
                    diags.add_attribute_error(
                        path.clone(),
                        "Invalid Attribute Value",
                        format!("Attribute {} {}", path, message),
                    );
                }
            }
        }
    }
}
