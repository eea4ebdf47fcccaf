// src/core/form.rs

use crate::models::{ArgKind, Configuration, OverrideEntry};
use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum FormError {
    #[error("Unknown argument '{0}'.")]
    UnknownArgument(String),
    #[error("Argument '{name}' only accepts 'true' or 'false', got '{value}'.")]
    NotBoolean { name: String, value: String },
}

/// How a field compares to its declaration. Presentation only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldState {
    Empty,
    Default,
    Modified,
}

/// One editable argument, initialised from its stored entry.
#[derive(Debug, Clone)]
pub struct ArgField {
    name: String,
    kind: ArgKind,
    default: String,
    description: String,
    value: String,
}

impl ArgField {
    pub fn from_entry(entry: &OverrideEntry) -> Self {
        let declaration = &entry.declaration;
        Self {
            name: declaration.name.clone(),
            kind: declaration.kind(),
            default: declaration.default_value().to_string(),
            description: declaration.description_text().to_string(),
            value: entry.effective_value().to_string(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> ArgKind {
        self.kind
    }

    pub fn default(&self) -> &str {
        &self.default
    }

    /// Hint shown in an empty text field.
    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn current_value(&self) -> &str {
        &self.value
    }

    /// Replaces the value and reports the resulting state.
    pub fn set_value(&mut self, value: impl Into<String>) -> Result<FieldState, FormError> {
        let value = value.into();
        if self.kind == ArgKind::Boolean && value != "true" && value != "false" {
            return Err(FormError::NotBoolean {
                name: self.name.clone(),
                value,
            });
        }
        self.value = value;
        Ok(self.state())
    }

    pub fn reset(&mut self) {
        self.value = self.default.clone();
    }

    pub fn state(&self) -> FieldState {
        if self.value.is_empty() {
            FieldState::Empty
        } else if self.value == self.default {
            FieldState::Default
        } else {
            FieldState::Modified
        }
    }
}

/// The fields for every argument of a configuration, in stored order.
#[derive(Debug, Clone, Default)]
pub struct ArgForm {
    fields: Vec<ArgField>,
}

impl ArgForm {
    pub fn from_config(config: &Configuration) -> Self {
        Self {
            fields: config.args.values().map(ArgField::from_entry).collect(),
        }
    }

    pub fn fields(&self) -> &[ArgField] {
        &self.fields
    }

    pub fn get(&self, name: &str) -> Option<&ArgField> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut ArgField> {
        self.fields.iter_mut().find(|f| f.name == name)
    }

    /// Sets the value of the named field.
    pub fn set(&mut self, name: &str, value: &str) -> Result<FieldState, FormError> {
        self.get_mut(name)
            .ok_or_else(|| FormError::UnknownArgument(name.to_string()))?
            .set_value(value)
    }

    /// The current value of a field, if the form has one with that name.
    pub fn value_of(&self, name: &str) -> Option<&str> {
        self.get(name).map(ArgField::current_value)
    }

    pub fn modified_count(&self) -> usize {
        self.fields
            .iter()
            .filter(|f| f.state() == FieldState::Modified)
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{launch_parser::parse_launch_str, override_store::reconcile};

    fn form_for(xml: &str) -> (Configuration, ArgForm) {
        let mut config = Configuration::default();
        reconcile(&mut config, parse_launch_str(xml).unwrap());
        let form = ArgForm::from_config(&config);
        (config, form)
    }

    #[test]
    fn test_fields_follow_declarations() {
        let (_, form) = form_for(
            r#"<launch><arg name="a" default="1" description="rate"/><arg name="b" default="true"/></launch>"#,
        );
        let a = form.get("a").unwrap();
        assert_eq!(a.kind(), ArgKind::Text);
        assert_eq!(a.description(), "rate");
        assert_eq!(a.current_value(), "1");
        assert_eq!(form.get("b").unwrap().kind(), ArgKind::Boolean);
    }

    #[test]
    fn test_field_starts_from_override() {
        let (mut config, _) = form_for(r#"<launch><arg name="a" default="1"/></launch>"#);
        config.args.get_mut("a").unwrap().value = Some("9".to_string());
        let form = ArgForm::from_config(&config);
        assert_eq!(form.value_of("a"), Some("9"));
        assert_eq!(form.get("a").unwrap().state(), FieldState::Modified);
    }

    #[test]
    fn test_field_states() {
        let (_, mut form) = form_for(r#"<launch><arg name="a" default="1"/></launch>"#);
        assert_eq!(form.get("a").unwrap().state(), FieldState::Default);
        assert_eq!(form.set("a", "").unwrap(), FieldState::Empty);
        assert_eq!(form.set("a", "2").unwrap(), FieldState::Modified);
        assert_eq!(form.modified_count(), 1);
        form.get_mut("a").unwrap().reset();
        assert_eq!(form.get("a").unwrap().state(), FieldState::Default);
    }

    #[test]
    fn test_boolean_field_rejects_other_values() {
        let (_, mut form) = form_for(r#"<launch><arg name="b" default="false"/></launch>"#);
        assert_eq!(form.set("b", "true").unwrap(), FieldState::Modified);
        assert_eq!(
            form.set("b", "yes").unwrap_err(),
            FormError::NotBoolean {
                name: "b".to_string(),
                value: "yes".to_string()
            }
        );
        assert_eq!(form.value_of("b"), Some("true"));
    }

    #[test]
    fn test_unknown_field() {
        let (_, mut form) = form_for(r#"<launch/>"#);
        assert!(form.fields().is_empty());
        assert_eq!(
            form.set("nope", "1").unwrap_err(),
            FormError::UnknownArgument("nope".to_string())
        );
    }
}
