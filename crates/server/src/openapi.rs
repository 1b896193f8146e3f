use utoipa::OpenApi;
use utoipa::ToSchema;

#[derive(ToSchema)]
pub struct HealthResponse { pub status: String }

#[derive(ToSchema)]
pub struct ErrorResponse { pub error: String }

#[derive(ToSchema)]
pub struct MessageDoc { pub message: String }

#[derive(ToSchema)]
pub struct CreateSchoolRequest {
    pub name: String,
    /// Positive maximum number of students
    pub capacity: i32,
}

#[derive(ToSchema)]
pub struct CreateStudentRequest {
    /// Client-supplied token, at most 9 characters
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    pub school_id: i32,
}

#[derive(ToSchema)]
pub struct StudentDoc {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    pub school_id: i32,
}

#[derive(ToSchema)]
pub struct SchoolDoc {
    pub id: i32,
    pub name: String,
    pub capacity: i32,
    pub student_count: i64,
    /// Omitted on create and search responses
    pub students: Option<Vec<StudentDoc>>,
}

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::routes::health,
        crate::routes::schools::create,
        crate::routes::schools::delete,
        crate::routes::schools::list,
        crate::routes::schools::get,
        crate::routes::schools::search,
        crate::routes::students::create,
        crate::routes::students::delete,
        crate::routes::students::list,
        crate::routes::students::get,
        crate::routes::students::search,
    ),
    components(
        schemas(
            HealthResponse,
            ErrorResponse,
            MessageDoc,
            CreateSchoolRequest,
            CreateStudentRequest,
            StudentDoc,
            SchoolDoc,
        )
    ),
    tags(
        (name = "health"),
        (name = "schools"),
        (name = "students")
    )
)]
pub struct ApiDoc;
