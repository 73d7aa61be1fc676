use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

pub const LOCATION_SCORE_MIN: u8 = 1;
pub const LOCATION_SCORE_MAX: u8 = 10;

/// Field names in the order the prediction service feeds them to the models.
pub const FEATURE_FIELDS: [&str; 11] = [
    "price",
    "size",
    "rooms",
    "bathroom",
    "parking",
    "furnished",
    "elevator",
    "balcony",
    "floor",
    "age",
    "location_score",
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApartmentFeatures {
    pub price: f64,
    pub size: f64,
    pub rooms: u32,
    pub bathroom: u32,
    #[serde(with = "flag")]
    pub parking: bool,
    #[serde(with = "flag")]
    pub furnished: bool,
    #[serde(with = "flag")]
    pub elevator: bool,
    #[serde(with = "flag")]
    pub balcony: bool,
    pub floor: u32,
    pub age: f64,
    pub location_score: u8,
}

impl Default for ApartmentFeatures {
    fn default() -> Self {
        Self {
            price: 1000.0,
            size: 80.0,
            rooms: 2,
            bathroom: 1,
            parking: true,
            furnished: true,
            elevator: true,
            balcony: true,
            floor: 2,
            age: 5.0,
            location_score: 7,
        }
    }
}

impl ApartmentFeatures {
    /// Checks the invariants a typed value can still break.
    pub fn validate(&self) -> Result<(), ValidationError> {
        for (field, value) in [("price", self.price), ("size", self.size), ("age", self.age)] {
            if value.is_nan() {
                return Err(ValidationError::NotANumber(field.to_string()));
            }
            if !value.is_finite() || value < 0.0 {
                return Err(ValidationError::OutOfRange(field.to_string()));
            }
        }
        if !(LOCATION_SCORE_MIN..=LOCATION_SCORE_MAX).contains(&self.location_score) {
            return Err(ValidationError::OutOfRange("location_score".to_string()));
        }
        Ok(())
    }

    /// Builds features from raw form input. Missing fields keep their default.
    pub fn from_form(form: &ApartmentForm) -> Result<Self, ValidationError> {
        let mut features = Self::default();

        for (field, raw) in &form.fields {
            let value = parse_number(field, raw)?;
            match field.as_str() {
                "price" => features.price = non_negative(field, value)?,
                "size" => features.size = non_negative(field, value)?,
                "age" => features.age = non_negative(field, value)?,
                "rooms" => features.rooms = whole(field, value)?,
                "bathroom" => features.bathroom = whole(field, value)?,
                "floor" => features.floor = whole(field, value)?,
                "parking" => features.parking = switch(field, value)?,
                "furnished" => features.furnished = switch(field, value)?,
                "elevator" => features.elevator = switch(field, value)?,
                "balcony" => features.balcony = switch(field, value)?,
                "location_score" => {
                    let score = whole(field, value)?;
                    if !(LOCATION_SCORE_MIN as u32..=LOCATION_SCORE_MAX as u32).contains(&score) {
                        return Err(ValidationError::OutOfRange(field.clone()));
                    }
                    features.location_score = score as u8;
                }
                _ => return Err(ValidationError::OutOfRange(field.clone())),
            }
        }

        features.validate()?;
        Ok(features)
    }
}

/// Raw text input keyed by feature name, as typed into the prediction form.
#[derive(Debug, Clone, Default)]
pub struct ApartmentForm {
    fields: HashMap<String, String>,
}

impl ApartmentForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, field: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.fields.insert(field.into(), value.into());
        self
    }

    pub fn with(mut self, field: impl Into<String>, value: impl Into<String>) -> Self {
        self.set(field, value);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

fn parse_number(field: &str, raw: &str) -> Result<f64, ValidationError> {
    match raw.trim().parse::<f64>() {
        Ok(v) if !v.is_nan() => Ok(v),
        _ => Err(ValidationError::NotANumber(field.to_string())),
    }
}

fn non_negative(field: &str, value: f64) -> Result<f64, ValidationError> {
    if value.is_finite() && value >= 0.0 {
        Ok(value)
    } else {
        Err(ValidationError::OutOfRange(field.to_string()))
    }
}

fn whole(field: &str, value: f64) -> Result<u32, ValidationError> {
    let value = non_negative(field, value)?;
    if value.fract() != 0.0 || value > u32::MAX as f64 {
        return Err(ValidationError::OutOfRange(field.to_string()));
    }
    Ok(value as u32)
}

fn switch(field: &str, value: f64) -> Result<bool, ValidationError> {
    match whole(field, value)? {
        0 => Ok(false),
        1 => Ok(true),
        _ => Err(ValidationError::OutOfRange(field.to_string())),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelChoice {
    #[default]
    RandomForest,
    Knn,
    NaiveBayes,
}

impl ModelChoice {
    pub const ALL: [ModelChoice; 3] = [Self::RandomForest, Self::Knn, Self::NaiveBayes];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::RandomForest => "random_forest",
            Self::Knn => "knn",
            Self::NaiveBayes => "naive_bayes",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Self::RandomForest => "Random Forest",
            Self::Knn => "KNN",
            Self::NaiveBayes => "Naive Bayes",
        }
    }
}

impl fmt::Display for ModelChoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ModelChoice {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|m| m.as_str() == s.trim())
            .ok_or_else(|| ValidationError::UnknownModel(s.to_string()))
    }
}

/// Boolean flags travel as `0`/`1` integers; `true`/`false` is accepted on read.
pub(crate) mod flag {
    use serde::de::{self, Deserializer, Visitor};
    use serde::Serializer;
    use std::fmt;

    pub fn serialize<S: Serializer>(value: &bool, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(u8::from(*value))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
        struct FlagVisitor;

        impl<'de> Visitor<'de> for FlagVisitor {
            type Value = bool;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("0, 1 or a boolean")
            }

            fn visit_bool<E: de::Error>(self, v: bool) -> Result<bool, E> {
                Ok(v)
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> Result<bool, E> {
                match v {
                    0 => Ok(false),
                    1 => Ok(true),
                    other => Err(E::custom(format!("flag out of range: {}", other))),
                }
            }

            fn visit_i64<E: de::Error>(self, v: i64) -> Result<bool, E> {
                if v < 0 {
                    return Err(E::custom(format!("flag out of range: {}", v)));
                }
                self.visit_u64(v as u64)
            }

            fn visit_f64<E: de::Error>(self, v: f64) -> Result<bool, E> {
                if v == 0.0 {
                    Ok(false)
                } else if v == 1.0 {
                    Ok(true)
                } else {
                    Err(E::custom(format!("flag out of range: {}", v)))
                }
            }
        }

        deserializer.deserialize_any(FlagVisitor)
    }
}
