//! `Accept` header negotiation for problem and success bodies.

use axum::response::{IntoResponse, Response};
use http::{StatusCode, header};
use mime::Mime;
use serde::Serialize;

use courselib_errors::{APPLICATION_PROBLEM_JSON, APPLICATION_PROBLEM_XML, ProblemDetails};

use crate::fault::Fault;

const APPLICATION_XML_UTF8: &str = "application/xml; charset=utf-8";

/// One entry of an `Accept` header.
#[derive(Debug, Clone, PartialEq)]
pub struct MediaRange {
    pub mime: Mime,
    pub quality: f32,
}

impl MediaRange {
    /// Whether this range admits `offered`.
    ///
    /// Structured syntax suffixes count, so `application/json` admits
    /// `application/problem+json`. `text/xml` and `application/xml` are
    /// treated as the same family.
    #[must_use]
    pub fn admits(&self, offered: &Mime) -> bool {
        let range = &self.mime;
        if range.type_() == mime::STAR {
            return true;
        }
        let subtype_matches = (range.subtype() == offered.subtype()
            && range.suffix() == offered.suffix())
            || (range.suffix().is_none()
                && offered.suffix().is_some_and(|suffix| suffix == range.subtype()));

        if range.subtype() == mime::XML {
            return subtype_matches;
        }
        if range.type_() != offered.type_() {
            return false;
        }
        range.subtype() == mime::STAR || subtype_matches
    }

    /// 0 for `*/*`, 1 for `type/*`, 2 for a concrete type.
    fn specificity(&self) -> u8 {
        if self.mime.type_() == mime::STAR {
            0
        } else if self.mime.subtype() == mime::STAR {
            1
        } else {
            2
        }
    }
}

/// Parse an `Accept` value, dropping malformed entries, ordered by
/// descending quality. Ties keep header order. `q=0` entries are kept
/// because they exclude the types they name.
#[must_use]
pub fn parse_accept(header_value: &str) -> Vec<MediaRange> {
    let mut ranges: Vec<MediaRange> = header_value
        .split(',')
        .filter_map(|part| {
            let mime: Mime = part.trim().parse().ok()?;
            let quality = mime
                .get_param("q")
                .map_or(Some(1.0), |q| q.as_str().parse::<f32>().ok())?
                .clamp(0.0, 1.0);
            Some(MediaRange { mime, quality })
        })
        .collect();
    ranges.sort_by(|a, b| b.quality.total_cmp(&a.quality));
    ranges
}

/// Quality the client gives `offered`: that of the most specific range
/// admitting it, so `application/json;q=0` overrides `*/*;q=0.5`.
fn quality_of(ranges: &[MediaRange], offered: &Mime) -> Option<f32> {
    let mut best: Option<&MediaRange> = None;
    for range in ranges.iter().filter(|range| range.admits(offered)) {
        if best.is_none_or(|b| range.specificity() > b.specificity()) {
            best = Some(range);
        }
    }
    best.map(|range| range.quality)
}

/// Pick the acceptable offer with the highest quality. Ties go to the
/// earlier entry of `offered`.
fn select<'a, T: Copy>(ranges: &[MediaRange], offered: &'a [(Mime, T)]) -> Option<&'a T> {
    let mut chosen: Option<(f32, &'a T)> = None;
    for (mime, value) in offered {
        let Some(quality) = quality_of(ranges, mime).filter(|q| *q > 0.0) else {
            continue;
        };
        if chosen.is_none_or(|(best, _)| quality > best) {
            chosen = Some((quality, value));
        }
    }
    chosen.map(|(_, value)| value)
}

/// Wire format of a problem body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProblemFormat {
    Json,
    Xml,
}

impl ProblemFormat {
    /// XML only when the client ranks it above JSON; JSON for ties and for
    /// headers that admit neither format.
    #[must_use]
    pub fn negotiate(accept: Option<&str>) -> Self {
        let Some(accept) = accept else {
            return Self::Json;
        };
        let offered = [
            (mime::APPLICATION_JSON, Self::Json),
            (parse_mime(APPLICATION_PROBLEM_JSON), Self::Json),
            (parse_mime(APPLICATION_PROBLEM_XML), Self::Xml),
        ];
        select(&parse_accept(accept), &offered)
            .copied()
            .unwrap_or(Self::Json)
    }

    #[must_use]
    pub fn content_type(self) -> &'static str {
        match self {
            Self::Json => APPLICATION_PROBLEM_JSON,
            Self::Xml => APPLICATION_PROBLEM_XML,
        }
    }

    /// Write `problem` in this format. Falls back to JSON if XML rendering fails.
    #[must_use]
    pub fn render(self, problem: &ProblemDetails) -> Response {
        let body = match self {
            Self::Json => problem.to_json_vec(),
            Self::Xml => problem.to_xml_vec(),
        };
        match body {
            Ok(bytes) => (
                problem.status,
                [(header::CONTENT_TYPE, self.content_type())],
                bytes,
            )
                .into_response(),
            Err(err) => {
                tracing::error!(error = %err, "Failed to render problem details");
                problem.clone().into_response()
            }
        }
    }
}

fn parse_mime(content_type: &str) -> Mime {
    content_type
        .parse()
        .unwrap_or(mime::APPLICATION_OCTET_STREAM)
}

/// Wire format of a success body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Json,
    Xml,
}

impl OutputFormat {
    /// `None` means nothing the client accepts can be produced and the
    /// caller should answer 406. With `return_not_acceptable` off the
    /// result falls back to JSON instead.
    #[must_use]
    pub fn negotiate(accept: Option<&str>, return_not_acceptable: bool) -> Option<Self> {
        let ranges = accept.map(parse_accept).unwrap_or_default();
        if ranges.is_empty() {
            return Some(Self::Json);
        }
        let offered = [
            (mime::APPLICATION_JSON, Self::Json),
            (mime::TEXT_XML, Self::Xml),
            (parse_mime("application/xml"), Self::Xml),
        ];
        match select(&ranges, &offered) {
            Some(format) => Some(*format),
            None if return_not_acceptable => None,
            None => Some(Self::Json),
        }
    }

    /// Serialize `value`; XML documents use `root` as the document element.
    #[must_use]
    pub fn render<T: Serialize>(self, status: StatusCode, root: &str, value: &T) -> Response {
        match self {
            Self::Json => (status, axum::Json(value)).into_response(),
            Self::Xml => match quick_xml::se::to_string_with_root(root, value) {
                Ok(xml) => (status, [(header::CONTENT_TYPE, APPLICATION_XML_UTF8)], xml)
                    .into_response(),
                Err(err) => Fault::from(anyhow::anyhow!("failed to write {root} as xml: {err}"))
                    .into_response(),
            },
        }
    }
}

/// Format of a request body, read from its `Content-Type`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyFormat {
    Json,
    Xml,
}

impl BodyFormat {
    /// `None` when no input formatter reads `content_type`.
    #[must_use]
    pub fn from_content_type(content_type: &str) -> Option<Self> {
        let mime: Mime = content_type.trim().parse().ok()?;
        let is = |name: mime::Name<'_>| {
            mime.subtype() == name || mime.suffix().is_some_and(|suffix| suffix == name)
        };

        if mime.type_() == mime::APPLICATION && is(mime::JSON) {
            Some(Self::Json)
        } else if (mime.type_() == mime::APPLICATION || mime.type_() == mime::TEXT) && is(mime::XML)
        {
            Some(Self::Xml)
        } else {
            None
        }
    }
}
