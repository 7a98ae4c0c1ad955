//! Binding of raw request data onto typed action arguments.

use std::str::FromStr;

use serde::de::DeserializeOwned;

use crate::context::{BindingContext, RequestScope};
use crate::model_state::ModelState;
use crate::negotiation::BodyFormat;
use crate::translator::{ValidationProblem, ValidationProblemTranslator};
use crate::validate::Validate;

pub const EMPTY_BODY_MESSAGE: &str = "A non-empty request body is required.";
pub const INVALID_XML_ENCODING_MESSAGE: &str = "The XML body is not valid UTF-8.";
pub const UNBOUND_ARGUMENTS_MESSAGE: &str = "One or more action arguments could not be bound.";

/// Collects the arguments of one action invocation.
///
/// Every `bind_*` call accounts for one declared parameter. A parameter that
/// produced a value (including an absent optional bound to `None`) counts as
/// bound; anything else records an error under the parameter's key.
#[derive(Debug, Clone)]
pub struct ActionBinder {
    declared_parameters: usize,
    bound_arguments: usize,
    state: ModelState,
    unsupported_media_type: Option<String>,
}

impl ActionBinder {
    #[must_use]
    pub fn new(declared_parameters: usize) -> Self {
        Self {
            declared_parameters,
            bound_arguments: 0,
            state: ModelState::new(),
            unsupported_media_type: None,
        }
    }

    #[must_use]
    pub fn state(&self) -> &ModelState {
        &self.state
    }

    #[must_use]
    pub fn binding_context(&self) -> BindingContext {
        BindingContext::BindingTime {
            bound_arguments: self.bound_arguments,
            declared_parameters: self.declared_parameters,
        }
    }

    /// Deserialize a body as JSON or XML according to its `Content-Type`.
    ///
    /// A body in any other media type, or a non-empty body without a
    /// `Content-Type`, is not read; [`finish`](Self::finish) then answers 415.
    pub fn bind_body<T: DeserializeOwned>(
        &mut self,
        name: &str,
        content_type: Option<&str>,
        body: &[u8],
    ) -> Option<T> {
        let format = match content_type {
            Some(content_type) => BodyFormat::from_content_type(content_type),
            None if is_blank(body) => Some(BodyFormat::Json),
            None => None,
        };
        match format {
            Some(BodyFormat::Json) => self.bind_json(name, body),
            Some(BodyFormat::Xml) => self.bind_xml(name, body),
            None => {
                tracing::debug!(content_type, "No input formatter for request body");
                self.unsupported_media_type = Some(content_type.unwrap_or_default().to_owned());
                None
            }
        }
    }

    /// Deserialize an XML body into `T`. The document element name is not
    /// checked; its children map onto the fields of `T`.
    pub fn bind_xml<T: DeserializeOwned>(&mut self, name: &str, body: &[u8]) -> Option<T> {
        if is_blank(body) {
            self.state.add_error(name, EMPTY_BODY_MESSAGE);
            return None;
        }
        let Ok(text) = std::str::from_utf8(body) else {
            self.state.add_error(name, INVALID_XML_ENCODING_MESSAGE);
            return None;
        };
        match quick_xml::de::from_str::<T>(text) {
            Ok(value) => {
                self.bound_arguments += 1;
                Some(value)
            }
            Err(err) => {
                self.record_parse_error(name, &err.to_string());
                None
            }
        }
    }

    /// Deserialize a JSON body into `T`.
    pub fn bind_json<T: DeserializeOwned>(&mut self, name: &str, body: &[u8]) -> Option<T> {
        if is_blank(body) {
            self.state.add_error(name, EMPTY_BODY_MESSAGE);
            return None;
        }
        match serde_json::from_slice::<T>(body) {
            Ok(value) => {
                self.bound_arguments += 1;
                Some(value)
            }
            Err(err) => {
                self.record_parse_error(name, &err.to_string());
                None
            }
        }
    }

    fn record_parse_error(&mut self, name: &str, message: &str) {
        let key = missing_field(message).unwrap_or(name);
        self.state.add_error(key, message);
    }

    /// Parse a required scalar such as a route or query value.
    pub fn bind_value<T: FromStr>(&mut self, name: &str, raw: Option<&str>) -> Option<T> {
        let Some(raw) = raw else {
            self.state
                .add_error(name, format!("The {name} field is required."));
            return None;
        };
        self.state.set_attempted_value(name, raw);
        if let Ok(value) = raw.parse::<T>() {
            self.bound_arguments += 1;
            Some(value)
        } else {
            self.state
                .add_error(name, format!("The value '{raw}' is not valid for {name}."));
            None
        }
    }

    /// Parse an optional scalar. An absent value binds successfully as `None`.
    pub fn bind_optional_value<T: FromStr>(
        &mut self,
        name: &str,
        raw: Option<&str>,
    ) -> Option<Option<T>> {
        match raw {
            None => {
                self.bound_arguments += 1;
                Some(None)
            }
            Some(raw) => self.bind_value(name, Some(raw)).map(Some),
        }
    }

    /// Record a parameter that could not be read at all (for example an
    /// unreadable body).
    pub fn reject(&mut self, name: &str, message: impl Into<String>) {
        self.state.add_error(name, message);
    }

    /// Run business rules over a bound model.
    pub fn validate<T: Validate + ?Sized>(&mut self, model: &T) {
        model.validate(&mut self.state);
    }

    /// Finish binding: hand back the arguments, or the translated problem if
    /// anything failed.
    ///
    /// # Errors
    /// Returns a 415 [`ValidationProblem`] when a body was sent in a media
    /// type nothing reads, otherwise a 400 or 422 one when the model state
    /// holds errors or `args` is `None`.
    pub fn finish<T>(
        mut self,
        args: Option<T>,
        translator: &ValidationProblemTranslator,
        scope: &RequestScope,
    ) -> Result<T, ValidationProblem> {
        if let Some(content_type) = self.unsupported_media_type.take() {
            let problem = ValidationProblem::unsupported_media_type(
                &content_type,
                &scope.context(self.binding_context()),
            )
            .negotiate(scope.accept.as_deref());
            return Err(problem);
        }
        match args {
            Some(args) if self.state.is_valid() => Ok(args),
            args => {
                if args.is_none() && self.state.is_valid() {
                    tracing::warn!(
                        path = scope.path.as_str(),
                        "Action arguments missing without a recorded binding error"
                    );
                    self.state.add_error("", UNBOUND_ARGUMENTS_MESSAGE);
                }
                let problem = translator
                    .translate(&self.state, &scope.context(self.binding_context()))
                    .negotiate(scope.accept.as_deref());
                Err(problem)
            }
        }
    }
}

fn is_blank(body: &[u8]) -> bool {
    body.iter().all(u8::is_ascii_whitespace)
}

/// Field name from a serde "missing field `x`" message.
fn missing_field(message: &str) -> Option<&str> {
    message
        .strip_prefix("missing field `")
        .and_then(|rest| rest.split_once('`'))
        .map(|(field, _)| field)
}
