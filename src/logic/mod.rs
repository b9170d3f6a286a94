pub mod enrollment;
pub mod validate;

pub use enrollment::{EnrollmentChange, EnrollmentError, EnrollmentPolicy, DEFAULT_MAX_STUDENTS_PER_COURSE};
pub use validate::{non_null, normalize_name, unique_ids, ValidationError};
