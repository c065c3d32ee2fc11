//! In-memory course store
//!
//! The store is an explicit object shared through `Arc`; nothing is global.
//! Records live in a `tokio::sync::RwLock<Vec<Course>>` and reset when the
//! process exits.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::Mutex;
use tokio::sync::RwLock;

use super::model::Course;
use crate::utils::error::CourseError;

/// Upper bound (exclusive) of generated course ids
pub const ID_SPACE: u32 = 1_000_000;

/// Random id source seeded once for the lifetime of the store
#[derive(Debug)]
pub struct IdGenerator {
    rng: Mutex<StdRng>,
}

impl IdGenerator {
    /// Seed from OS entropy
    pub fn from_entropy() -> Self {
        Self {
            rng: Mutex::new(StdRng::from_entropy()),
        }
    }

    /// Deterministic generator for tests
    pub fn from_seed(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }

    /// Draw the next candidate id
    pub fn next_id(&self) -> String {
        // A poisoned RNG is still a valid RNG
        let mut rng = self.rng.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        rng.gen_range(0..ID_SPACE).to_string()
    }
}

/// Thread-safe in-memory collection of courses
#[derive(Debug)]
pub struct CourseStore {
    courses: RwLock<Vec<Course>>,
    ids: IdGenerator,
}

impl Default for CourseStore {
    fn default() -> Self {
        Self::new()
    }
}

impl CourseStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::with_generator(IdGenerator::from_entropy(), Vec::new())
    }

    /// Create a store pre-filled with [`Course::demo_catalog`]
    pub fn with_demo_data() -> Self {
        Self::with_generator(IdGenerator::from_entropy(), Course::demo_catalog())
    }

    /// Create a store with an explicit id generator and initial records
    pub fn with_generator(ids: IdGenerator, courses: Vec<Course>) -> Self {
        Self {
            courses: RwLock::new(courses),
            ids,
        }
    }

    /// All records, in storage order
    pub async fn list(&self) -> Vec<Course> {
        self.courses.read().await.clone()
    }

    pub async fn len(&self) -> usize {
        self.courses.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.courses.read().await.is_empty()
    }

    /// Look up a record by id
    pub async fn get(&self, id: &str) -> Option<Course> {
        self.courses
            .read()
            .await
            .iter()
            .find(|c| c.course_id == id)
            .cloned()
    }

    /// Insert a new record under a freshly generated id
    ///
    /// Any id on the incoming record is ignored. Names must be non-empty and
    /// unique.
    pub async fn create(&self, mut course: Course) -> Result<Course, CourseError> {
        if course.is_empty() {
            return Err(CourseError::EmptyName);
        }

        let mut courses = self.courses.write().await;

        if courses.iter().any(|c| c.course_name == course.course_name) {
            return Err(CourseError::Duplicate(course.course_name));
        }

        course.course_id = loop {
            let candidate = self.ids.next_id();
            if !courses.iter().any(|c| c.course_id == candidate) {
                break candidate;
            }
        };

        tracing::debug!(id = %course.course_id, name = %course.course_name, "Course created");
        courses.push(course.clone());
        Ok(course)
    }

    /// Replace the record with `id` in place, keeping its id and position
    pub async fn update(&self, id: &str, mut course: Course) -> Result<Course, CourseError> {
        let mut courses = self.courses.write().await;

        let slot = courses
            .iter_mut()
            .find(|c| c.course_id == id)
            .ok_or_else(|| CourseError::NotFound(id.to_string()))?;

        course.course_id = id.to_string();
        *slot = course.clone();

        tracing::debug!(id = %id, "Course updated");
        Ok(course)
    }

    /// Remove the record with `id`
    pub async fn delete(&self, id: &str) -> Result<Course, CourseError> {
        let mut courses = self.courses.write().await;

        let index = courses
            .iter()
            .position(|c| c.course_id == id)
            .ok_or_else(|| CourseError::NotFound(id.to_string()))?;

        tracing::debug!(id = %id, "Course deleted");
        Ok(courses.remove(index))
    }

    /// Remove every record, returning how many were dropped
    pub async fn clear(&self) -> usize {
        let mut courses = self.courses.write().await;
        let removed = courses.len();
        courses.clear();
        removed
    }
}
