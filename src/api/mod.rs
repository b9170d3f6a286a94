pub mod enrollment_handlers;
pub mod handlers;
pub mod routes;
pub mod student_handlers;

pub use enrollment_handlers::*;
pub use handlers::*;
pub use routes::*;
pub use student_handlers::*;
