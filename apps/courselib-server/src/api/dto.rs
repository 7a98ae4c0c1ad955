use courselib_pipeline::ModelState;
use courselib_pipeline::validate::{Validate, max_length, required_text};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::catalog::Course;

pub const TITLE_MAX_CHARS: usize = 100;
pub const DESCRIPTION_MAX_CHARS: usize = 1500;

pub const TITLE_REQUIRED: &str = "Title must not be empty";
pub const TITLE_TOO_LONG: &str = "The title shouldn't have more than 100 characters.";
pub const DESCRIPTION_TOO_LONG: &str = "The description shouldn't have more than 1500 characters.";
pub const TITLE_EQUALS_DESCRIPTION: &str =
    "The provided description should be different from the title.";

/// Course as returned to clients.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CourseDto {
    pub id: Uuid,
    pub author_id: Uuid,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl From<Course> for CourseDto {
    fn from(course: Course) -> Self {
        Self {
            id: course.id,
            author_id: course.author_id,
            title: course.title,
            description: course.description,
        }
    }
}

/// Body of `POST /api/authors/{authorId}/courses`.
///
/// XML bodies may use the PascalCase element names (`<Title>`).
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CourseForCreationDto {
    #[serde(alias = "Title")]
    pub title: String,
    #[serde(default, alias = "Description")]
    pub description: Option<String>,
}

impl Validate for CourseForCreationDto {
    fn validate(&self, state: &mut ModelState) {
        course_rules(
            state,
            "CourseForCreationDto",
            &self.title,
            self.description.as_deref(),
        );
    }
}

/// Partial update; absent fields keep their stored value.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CoursePatchDto {
    #[serde(alias = "Title")]
    pub title: Option<String>,
    #[serde(alias = "Description")]
    pub description: Option<String>,
}

/// A stored course with a patch applied, validated before it is saved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CourseForUpdateDto {
    pub title: String,
    pub description: Option<String>,
}

impl CourseForUpdateDto {
    #[must_use]
    pub fn patched(course: &Course, patch: CoursePatchDto) -> Self {
        Self {
            title: patch.title.unwrap_or_else(|| course.title.clone()),
            description: patch.description.or_else(|| course.description.clone()),
        }
    }
}

impl Validate for CourseForUpdateDto {
    fn validate(&self, state: &mut ModelState) {
        course_rules(
            state,
            "CourseForUpdateDto",
            &self.title,
            self.description.as_deref(),
        );
    }
}

fn course_rules(state: &mut ModelState, model_key: &str, title: &str, description: Option<&str>) {
    required_text(state, "title", title, TITLE_REQUIRED);
    max_length(state, "title", title, TITLE_MAX_CHARS, TITLE_TOO_LONG);
    if let Some(description) = description {
        max_length(
            state,
            "description",
            description,
            DESCRIPTION_MAX_CHARS,
            DESCRIPTION_TOO_LONG,
        );
        if description == title {
            state.add_error(model_key, TITLE_EQUALS_DESCRIPTION);
        }
    }
}
