//! RFC 7807 Problem Details for HTTP APIs (pure data model, no HTTP framework dependencies)

use std::collections::BTreeMap;

use http::StatusCode;
use quick_xml::Writer;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

#[cfg(feature = "utoipa")]
use utoipa::ToSchema;

/// Content type for JSON Problem Details.
pub const APPLICATION_PROBLEM_JSON: &str = "application/problem+json";

/// Content type for XML Problem Details.
pub const APPLICATION_PROBLEM_XML: &str = "application/problem+xml";

/// Namespace of the XML problem document (RFC 7807, appendix A).
pub const PROBLEM_XML_NAMESPACE: &str = "urn:ietf:rfc:7807";

/// Problem type used when no more specific type applies.
pub const ABOUT_BLANK: &str = "about:blank";

/// Field name -> ordered error messages.
pub type FieldErrors = BTreeMap<String, Vec<String>>;

#[derive(Debug, thiserror::Error)]
pub enum ProblemRenderError {
    #[error("failed to write problem as xml: {0}")]
    Xml(String),
    #[error("failed to write problem as json: {0}")]
    Json(#[from] serde_json::Error),
}

#[allow(clippy::trivially_copy_pass_by_ref)] // serde requires &T signature
fn serialize_status_code<S>(status: &StatusCode, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_u16(status.as_u16())
}

fn deserialize_status_code<'de, D>(deserializer: D) -> Result<StatusCode, D::Error>
where
    D: Deserializer<'de>,
{
    let code = u16::deserialize(deserializer)?;
    StatusCode::from_u16(code).map_err(serde::de::Error::custom)
}

/// RFC 7807 Problem Details, with the `errors` and `traceId` extension members.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "utoipa", derive(ToSchema))]
#[cfg_attr(
    feature = "utoipa",
    schema(
        title = "ProblemDetails",
        description = "RFC 7807 Problem Details for HTTP APIs"
    )
)]
#[must_use]
pub struct ProblemDetails {
    /// A URI reference that identifies the problem type.
    #[serde(rename = "type")]
    pub type_url: String,
    /// A short, human-readable summary of the problem type.
    pub title: String,
    /// The HTTP status code for this occurrence of the problem.
    #[serde(
        serialize_with = "serialize_status_code",
        deserialize_with = "deserialize_status_code"
    )]
    #[cfg_attr(feature = "utoipa", schema(value_type = u16))]
    pub status: StatusCode,
    /// A human-readable explanation specific to this occurrence of the problem.
    pub detail: String,
    /// The request path that triggered the problem.
    pub instance: String,
    /// Field-level messages, present for validation problems only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub errors: Option<FieldErrors>,
    /// Request correlation id.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trace_id: Option<String>,
}

impl ProblemDetails {
    /// Create a new problem with the given status, title, and detail.
    pub fn new(status: StatusCode, title: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            type_url: ABOUT_BLANK.to_owned(),
            title: title.into(),
            status,
            detail: detail.into(),
            instance: String::new(),
            errors: None,
            trace_id: None,
        }
    }

    pub fn with_type(mut self, type_url: impl Into<String>) -> Self {
        self.type_url = type_url.into();
        self
    }

    pub fn with_instance(mut self, uri: impl Into<String>) -> Self {
        self.instance = uri.into();
        self
    }

    pub fn with_trace_id(mut self, id: impl Into<String>) -> Self {
        self.trace_id = Some(id.into());
        self
    }

    pub fn with_errors(mut self, errors: FieldErrors) -> Self {
        self.errors = Some(errors);
        self
    }

    /// Serialize as `application/problem+json`.
    ///
    /// # Errors
    /// Returns [`ProblemRenderError::Json`] if serialization fails.
    pub fn to_json_vec(&self) -> Result<Vec<u8>, ProblemRenderError> {
        Ok(serde_json::to_vec(self)?)
    }

    /// Serialize as `application/problem+xml`.
    ///
    /// Field names become `name` attributes rather than element names, since
    /// keys such as `authors[0].name` are not valid XML names.
    ///
    /// # Errors
    /// Returns [`ProblemRenderError::Xml`] if the writer fails.
    pub fn to_xml_vec(&self) -> Result<Vec<u8>, ProblemRenderError> {
        let mut writer = Writer::new(Vec::new());
        writer
            .write_event(Event::Decl(BytesDecl::new("1.0", Some("utf-8"), None)))
            .map_err(xml_error)?;
        writer
            .write_event(Event::Start(
                BytesStart::new("problem").with_attributes([("xmlns", PROBLEM_XML_NAMESPACE)]),
            ))
            .map_err(xml_error)?;

        write_text_element(&mut writer, "type", &self.type_url)?;
        write_text_element(&mut writer, "title", &self.title)?;
        write_text_element(&mut writer, "status", &self.status.as_u16().to_string())?;
        write_text_element(&mut writer, "detail", &self.detail)?;
        write_text_element(&mut writer, "instance", &self.instance)?;
        if let Some(trace_id) = &self.trace_id {
            write_text_element(&mut writer, "traceId", trace_id)?;
        }

        if let Some(errors) = &self.errors {
            writer
                .write_event(Event::Start(BytesStart::new("errors")))
                .map_err(xml_error)?;
            for (field, messages) in errors {
                writer
                    .write_event(Event::Start(
                        BytesStart::new("field").with_attributes([("name", field.as_str())]),
                    ))
                    .map_err(xml_error)?;
                for message in messages {
                    write_text_element(&mut writer, "message", message)?;
                }
                writer
                    .write_event(Event::End(BytesEnd::new("field")))
                    .map_err(xml_error)?;
            }
            writer
                .write_event(Event::End(BytesEnd::new("errors")))
                .map_err(xml_error)?;
        }

        writer
            .write_event(Event::End(BytesEnd::new("problem")))
            .map_err(xml_error)?;
        Ok(writer.into_inner())
    }
}

fn write_text_element(
    writer: &mut Writer<Vec<u8>>,
    name: &str,
    text: &str,
) -> Result<(), ProblemRenderError> {
    writer
        .write_event(Event::Start(BytesStart::new(name)))
        .map_err(xml_error)?;
    writer
        .write_event(Event::Text(BytesText::new(text)))
        .map_err(xml_error)?;
    writer
        .write_event(Event::End(BytesEnd::new(name)))
        .map_err(xml_error)?;
    Ok(())
}

#[allow(clippy::needless_pass_by_value)] // used as a map_err adapter
fn xml_error(err: impl std::fmt::Display) -> ProblemRenderError {
    ProblemRenderError::Xml(err.to_string())
}

/// Axum integration: make `ProblemDetails` directly usable as a JSON response
#[cfg(feature = "axum")]
impl axum::response::IntoResponse for ProblemDetails {
    fn into_response(self) -> axum::response::Response {
        use axum::http::HeaderValue;

        let status = self.status;
        let mut resp = axum::Json(self).into_response();
        *resp.status_mut() = status;
        resp.headers_mut().insert(
            axum::http::header::CONTENT_TYPE,
            HeaderValue::from_static(APPLICATION_PROBLEM_JSON),
        );
        resp
    }
}
