use crate::{
    routes::{
        index::get_index_route,
        sse::sse_feed,
        student_form::{
            get_edit_student_form, get_new_student_form, post_edit_student, post_new_student,
        },
        students::{delete_student, get_students, internal_get_students},
    },
    state::PhotoRollState,
};
use axum::{Router, extract::DefaultBodyLimit, routing::get};
use tower_http::{
    compression::CompressionLayer, limit::RequestBodyLimitLayer, services::ServeDir,
    trace::TraceLayer,
};

pub mod index;
pub mod sse;
pub mod student_form;
pub mod students;

///uploads bigger than this get a 413
pub const MAX_UPLOAD_BYTES: usize = 16 * 1024 * 1024;

pub fn router(state: PhotoRollState) -> Router {
    let files = ServeDir::new(state.images().root());

    Router::new()
        .route("/", get(get_index_route))
        .route("/admin/", get(get_index_route))
        .route("/admin/student/", get(get_students))
        .route("/admin/student", axum::routing::delete(delete_student))
        .route(
            "/admin/student/new",
            get(get_new_student_form).post(post_new_student),
        )
        .route(
            "/admin/student/edit",
            get(get_edit_student_form).post(post_edit_student),
        )
        .route("/internal/students", get(internal_get_students))
        .route("/sse_feed", get(sse_feed))
        .nest_service("/files", files)
        .layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(MAX_UPLOAD_BYTES))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
