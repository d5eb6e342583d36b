use paignion_data::UsedWithDef;

use crate::action::{ActionCompiler, ActionError};

/// Errors raised while building a [`UsedWith`].
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum UsedWithError {
    #[error("Name missing for used_with item")]
    MissingName,
    #[error("Effect message missing for used_with item `{name}`")]
    MissingEffectMessage { name: String },
    #[error("Actions should be a list for used_with item `{name}`")]
    ActionsNotAList { name: String },
    #[error("Action `{entry}` has incorrect type for used_with item `{name}`")]
    ActionWrongType { entry: String, name: String },
    #[error("Invalid action for used_with item `{name}`")]
    Action {
        name: String,
        #[source]
        source: ActionError,
    },
}

/// Unvalidated used-with fields, as read from room metadata.
#[derive(Debug, Clone, Default)]
pub struct UsedWithFields {
    pub name: Option<String>,
    /// Already rendered to HTML.
    pub effect_message: Option<String>,
    pub consumes_subject: Option<bool>,
    pub consumes_object: Option<bool>,
    /// Raw action-language source, one call per entry.
    pub actions: Vec<String>,
}

/// Interaction between the owning item and the item called `name`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UsedWith {
    name: String,
    effect_message: String,
    consumes_subject: bool,
    consumes_object: bool,
    actions: String,
}

impl UsedWith {
    /// Validate `fields` and compile its actions.
    ///
    /// # Errors
    /// Returns [`UsedWithError`] for a missing name or effect message, or when
    /// any action fails to compile.
    pub fn new(fields: UsedWithFields, compiler: &ActionCompiler) -> Result<Self, UsedWithError> {
        let name = fields.name.filter(|n| !n.is_empty()).ok_or(UsedWithError::MissingName)?;
        let Some(effect_message) = fields.effect_message.filter(|m| !m.trim().is_empty()) else {
            return Err(UsedWithError::MissingEffectMessage { name });
        };
        let actions = match compiler.compile_actions(&fields.actions) {
            Ok(actions) => actions,
            Err(source) => return Err(UsedWithError::Action { name, source }),
        };

        Ok(Self {
            name,
            effect_message,
            consumes_subject: fields.consumes_subject.unwrap_or(false),
            consumes_object: fields.consumes_object.unwrap_or(false),
            actions,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Concatenated compiled statements.
    pub fn actions(&self) -> &str {
        &self.actions
    }

    pub fn dump(&self) -> UsedWithDef {
        UsedWithDef {
            name: self.name.clone(),
            effect_message: self.effect_message.clone(),
            consumes_subject: self.consumes_subject,
            consumes_object: self.consumes_object,
            actions: self.actions.clone(),
        }
    }
}
