use paignion_data::{Amount, ItemDef};
use serde::Deserialize;

use super::UsedWith;

/// Errors raised while building an [`Item`].
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ItemError {
    #[error("Name missing for item")]
    MissingName,
    #[error("Description missing for item `{name}`")]
    MissingDescription { name: String },
    #[error("Negative or zero amount for item `{name}`")]
    NonPositiveAmount { name: String },
    #[error("Invalid amount `{value}` for item `{name}`")]
    InvalidAmount { value: String, name: String },
    #[error("Fractional amount `{value}` for item `{name}`")]
    FractionalAmount { value: String, name: String },
    #[error("used_with items should be a list for item `{name}`")]
    UsedWithNotAList { name: String },
    #[error("used_with item `{entry}` has incorrect type for item `{name}`")]
    UsedWithWrongType { entry: String, name: String },
}

/// An `amount` exactly as written in the metadata.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum RawAmount {
    Int(i64),
    Float(f64),
    Text(String),
}

impl RawAmount {
    /// Narrow to an [`Amount`] for the item called `name`.
    ///
    /// Whole-number floats such as `3.0` are accepted, `.inf` and the string
    /// `"inf"` mean unlimited, and numeric strings are read as integers.
    ///
    /// # Errors
    /// Returns [`ItemError`] for zero, negative, fractional or unreadable values.
    pub fn resolve(&self, name: &str) -> Result<Amount, ItemError> {
        match self {
            RawAmount::Int(n) => count(*n, name),
            RawAmount::Float(f) if f.is_infinite() && f.is_sign_positive() => Ok(Amount::Unlimited),
            RawAmount::Float(f) if !f.is_finite() => Err(ItemError::InvalidAmount {
                value: f.to_string(),
                name: name.to_string(),
            }),
            RawAmount::Float(f) if f.fract() != 0.0 => Err(ItemError::FractionalAmount {
                value: f.to_string(),
                name: name.to_string(),
            }),
            RawAmount::Float(f) if *f <= 0.0 => Err(ItemError::NonPositiveAmount { name: name.to_string() }),
            // Whole and positive; reject anything past the integer range instead of saturating.
            RawAmount::Float(f) if *f < 9.0e18 => Ok(Amount::Count(*f as u64)),
            RawAmount::Float(f) => Err(ItemError::InvalidAmount {
                value: f.to_string(),
                name: name.to_string(),
            }),
            RawAmount::Text(s) if s.trim() == Amount::UNLIMITED => Ok(Amount::Unlimited),
            RawAmount::Text(s) => match s.trim().parse::<i64>() {
                Ok(n) => count(n, name),
                Err(_) => Err(ItemError::InvalidAmount {
                    value: s.clone(),
                    name: name.to_string(),
                }),
            },
        }
    }
}

fn count(n: i64, name: &str) -> Result<Amount, ItemError> {
    u64::try_from(n)
        .ok()
        .filter(|n| *n > 0)
        .map(Amount::Count)
        .ok_or_else(|| ItemError::NonPositiveAmount { name: name.to_string() })
}

/// Unvalidated item fields, as read from room metadata.
#[derive(Debug, Clone, Default)]
pub struct ItemFields {
    pub name: Option<String>,
    /// Already rendered to HTML.
    pub description: Option<String>,
    pub amount: Option<RawAmount>,
    pub visible: Option<bool>,
    pub effect: Option<String>,
    pub used_with: Vec<UsedWith>,
}

/// A validated item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Item {
    name: String,
    description: Option<String>,
    amount: Amount,
    visible: bool,
    effect: Option<String>,
    used_with: Vec<UsedWith>,
}

impl Item {
    /// Validate `fields`, applying defaults for absent fields.
    ///
    /// Hidden items (`visible: false`) may omit their description.
    ///
    /// # Errors
    /// Returns [`ItemError`] for a missing name or description, or an unusable amount.
    pub fn new(fields: ItemFields) -> Result<Self, ItemError> {
        let name = fields.name.filter(|n| !n.is_empty()).ok_or(ItemError::MissingName)?;
        let visible = fields.visible.unwrap_or(true);
        let description = fields.description.filter(|d| !d.trim().is_empty());
        if visible && description.is_none() {
            return Err(ItemError::MissingDescription { name });
        }
        let amount = match &fields.amount {
            Some(raw) => raw.resolve(&name)?,
            None => Amount::default(),
        };

        Ok(Self {
            name,
            description,
            amount,
            visible,
            effect: fields.effect,
            used_with: fields.used_with,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn amount(&self) -> Amount {
        self.amount
    }

    pub fn used_with(&self) -> &[UsedWith] {
        &self.used_with
    }

    pub fn dump(&self) -> ItemDef {
        ItemDef {
            name: self.name.clone(),
            description: self.description.clone(),
            amount: self.amount,
            visible: self.visible,
            effect: self.effect.clone(),
            used_with: self.used_with.iter().map(UsedWith::dump).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn named(name: &str) -> ItemFields {
        ItemFields {
            name: Some(name.into()),
            description: Some("<p>A coin.</p>".into()),
            ..ItemFields::default()
        }
    }

    #[test]
    fn defaults_apply() {
        let def = Item::new(named("coin")).unwrap().dump();
        assert_eq!(def.amount, Amount::Count(1));
        assert!(def.visible);
        assert_eq!(def.effect, None);
        assert!(def.used_with.is_empty());
    }

    #[test]
    fn name_is_mandatory() {
        let mut fields = named("");
        assert_eq!(Item::new(fields.clone()).unwrap_err(), ItemError::MissingName);
        fields.name = None;
        assert_eq!(Item::new(fields).unwrap_err().to_string(), "Name missing for item");
    }

    #[test]
    fn hidden_items_may_omit_description() {
        let mut fields = named("draft");
        fields.description = None;
        fields.visible = Some(false);
        let def = Item::new(fields.clone()).unwrap().dump();
        assert_eq!(def.description, None);
        assert!(!def.visible);

        fields.visible = Some(true);
        assert_eq!(
            Item::new(fields).unwrap_err().to_string(),
            "Description missing for item `draft`"
        );
    }

    #[test]
    fn amounts_resolve() {
        let cases = [
            (RawAmount::Int(5), Amount::Count(5)),
            (RawAmount::Float(3.0), Amount::Count(3)),
            (RawAmount::Float(f64::INFINITY), Amount::Unlimited),
            (RawAmount::Text("inf".into()), Amount::Unlimited),
            (RawAmount::Text(" 12 ".into()), Amount::Count(12)),
        ];
        for (raw, expected) in cases {
            assert_eq!(raw.resolve("coin").unwrap(), expected, "{raw:?}");
        }
    }

    #[test]
    fn bad_amounts_are_rejected() {
        assert_eq!(
            RawAmount::Int(0).resolve("coin").unwrap_err().to_string(),
            "Negative or zero amount for item `coin`"
        );
        assert!(matches!(
            RawAmount::Int(-3).resolve("coin"),
            Err(ItemError::NonPositiveAmount { .. })
        ));
        assert!(matches!(
            RawAmount::Float(2.5).resolve("coin"),
            Err(ItemError::FractionalAmount { .. })
        ));
        assert!(matches!(
            RawAmount::Float(f64::NAN).resolve("coin"),
            Err(ItemError::InvalidAmount { .. })
        ));
        assert_eq!(
            RawAmount::Text("lots".into()).resolve("coin").unwrap_err().to_string(),
            "Invalid amount `lots` for item `coin`"
        );
    }

    #[test]
    fn amount_errors_surface_from_new() {
        let mut fields = named("coin");
        fields.amount = Some(RawAmount::Int(-1));
        assert!(matches!(Item::new(fields), Err(ItemError::NonPositiveAmount { .. })));
    }

    #[test]
    fn yaml_amounts_pick_the_right_variant() {
        let parse = |s: &str| serde_yaml::from_str::<RawAmount>(s).unwrap();
        assert_eq!(parse("7"), RawAmount::Int(7));
        assert_eq!(parse("7.5"), RawAmount::Float(7.5));
        assert_eq!(parse("inf"), RawAmount::Text("inf".into()));
    }
}
