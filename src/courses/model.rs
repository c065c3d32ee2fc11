//! Course records served by the API

use serde::{Deserialize, Serialize};

/// A course record
///
/// Missing JSON fields decode to zero values. The capitalised field names
/// are accepted on input for older clients.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Course {
    #[serde(rename = "courseid", alias = "CourseId")]
    pub course_id: String,

    #[serde(rename = "coursename", alias = "CourseName")]
    pub course_name: String,

    #[serde(rename = "courseprice", alias = "CoursePrice")]
    pub course_price: i64,

    #[serde(alias = "Author")]
    pub author: Option<Author>,
}

/// Course author
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Author {
    #[serde(alias = "Fullname")]
    pub fullname: String,

    #[serde(alias = "Website")]
    pub website: String,
}

impl Course {
    /// Create a course without an id; the store assigns one on insert
    pub fn new(course_name: impl Into<String>, course_price: i64) -> Self {
        Self {
            course_name: course_name.into(),
            course_price,
            ..Default::default()
        }
    }

    /// Attach an author
    pub fn with_author(mut self, fullname: impl Into<String>, website: impl Into<String>) -> Self {
        self.author = Some(Author {
            fullname: fullname.into(),
            website: website.into(),
        });
        self
    }

    /// A course without a name counts as empty
    pub fn is_empty(&self) -> bool {
        self.course_name.is_empty()
    }

    /// Records loaded into a fresh store when demo data is enabled
    pub fn demo_catalog() -> Vec<Course> {
        vec![
            Course {
                course_id: "2".to_string(),
                ..Course::new("ProtoBuf", 140).with_author("LCO", "lco.dev")
            },
            Course {
                course_id: "4".to_string(),
                ..Course::new("gRPC", 240).with_author("Sam", "smaranharihar.dev")
            },
        ]
    }
}
