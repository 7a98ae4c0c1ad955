//! In-memory author and course store backing the demo routes.

use dashmap::DashMap;
use uuid::Uuid;

/// Author present in every freshly created catalog.
pub const DEMO_AUTHOR_ID: Uuid = Uuid::from_u128(0xd288_88e9_2ba9_473a_a40f_e38c_b54f_9b35);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Course {
    pub id: Uuid,
    pub author_id: Uuid,
    pub title: String,
    pub description: Option<String>,
}

#[derive(Debug, Default)]
pub struct CourseCatalog {
    authors: DashMap<Uuid, String>,
    courses: DashMap<Uuid, Course>,
}

impl CourseCatalog {
    #[must_use]
    pub fn with_demo_authors() -> Self {
        let catalog = Self::default();
        catalog.add_author(DEMO_AUTHOR_ID, "Berry Griffin Beak Eldritch");
        catalog
    }

    pub fn add_author(&self, id: Uuid, name: impl Into<String>) {
        self.authors.insert(id, name.into());
    }

    #[must_use]
    pub fn author_exists(&self, id: Uuid) -> bool {
        self.authors.contains_key(&id)
    }

    pub fn add_course(&self, author_id: Uuid, title: String, description: Option<String>) -> Course {
        let course = Course {
            id: Uuid::new_v4(),
            author_id,
            title,
            description,
        };
        self.courses.insert(course.id, course.clone());
        course
    }

    /// Course `course_id`, provided it belongs to `author_id`.
    #[must_use]
    pub fn course_for_author(&self, author_id: Uuid, course_id: Uuid) -> Option<Course> {
        self.courses
            .get(&course_id)
            .filter(|c| c.author_id == author_id)
            .map(|c| c.value().clone())
    }

    pub fn update_course(&self, course: Course) {
        self.courses.insert(course.id, course);
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn demo_author_is_seeded() {
        let catalog = CourseCatalog::with_demo_authors();
        assert!(catalog.author_exists(DEMO_AUTHOR_ID));
        assert!(!catalog.author_exists(Uuid::new_v4()));
    }

    #[test]
    fn courses_are_scoped_to_their_author() {
        let catalog = CourseCatalog::with_demo_authors();
        let course = catalog.add_course(DEMO_AUTHOR_ID, "Rust".to_owned(), None);

        assert_eq!(
            catalog.course_for_author(DEMO_AUTHOR_ID, course.id),
            Some(course.clone())
        );
        assert_eq!(catalog.course_for_author(Uuid::new_v4(), course.id), None);
    }

    #[test]
    fn update_replaces_stored_course() {
        let catalog = CourseCatalog::with_demo_authors();
        let mut course = catalog.add_course(DEMO_AUTHOR_ID, "Rust".to_owned(), None);
        course.title = "Rust 2024".to_owned();
        catalog.update_course(course.clone());

        assert_eq!(
            catalog
                .course_for_author(DEMO_AUTHOR_ID, course.id)
                .map(|c| c.title),
            Some("Rust 2024".to_owned())
        );
    }
}
