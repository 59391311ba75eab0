use crate::{
    data::{
        DataType, IntIdForm,
        student::{MAX_NAME_LEN, NewStudent, Student},
    },
    error::{FieldTooLongSnafu, MissingStudentSnafu, MultipartSnafu, PhotoRollError, PhotoRollResult},
    maud_conveniences::{AlertKind, alert, form_element, form_submit_button, simple_form_element, title},
    routes::sse::SseEvent,
    state::PhotoRollState,
    uploads::{PhotoUpload, thumbnail_name},
};
use axum::{
    extract::{Multipart, Query, State},
    response::{IntoResponse, Redirect, Response},
};
use maud::{Markup, html};
use snafu::{OptionExt, ResultExt, ensure};

///what came in on the create/edit form
#[derive(Debug, Default)]
pub struct StudentSubmission {
    pub name: Option<String>,
    pub upload: Option<PhotoUpload>,
    pub delete_photo: bool,
}

impl StudentSubmission {
    pub async fn from_multipart(mut multipart: Multipart) -> PhotoRollResult<Self> {
        let mut submission = Self::default();

        while let Some(field) = multipart.next_field().await.context(MultipartSnafu)? {
            let field_name = field.name().map(ToString::to_string);

            match field_name.as_deref() {
                Some("name") => {
                    let text = field.text().await.context(MultipartSnafu)?;
                    let text = text.trim();
                    submission.name = (!text.is_empty()).then(|| text.to_string());
                }
                Some("photo") => {
                    let file_name = field.file_name().map(ToString::to_string);
                    let bytes = field.bytes().await.context(MultipartSnafu)?;

                    //browsers send an empty part when no file was picked
                    if let Some(file_name) = file_name.filter(|f| !f.is_empty()) {
                        if !bytes.is_empty() {
                            submission.upload = Some(PhotoUpload { file_name, bytes });
                        }
                    }
                }
                Some("delete_photo") => {
                    submission.delete_photo = true;
                }
                _ => {
                    trace!(?field_name, "Ignoring unknown form field");
                }
            }
        }

        Ok(submission)
    }

    fn validated_name(&self) -> PhotoRollResult<Option<String>> {
        if let Some(name) = &self.name {
            ensure!(
                name.chars().count() <= MAX_NAME_LEN,
                FieldTooLongSnafu {
                    field: "Name",
                    max: MAX_NAME_LEN
                }
            );
        }
        Ok(self.name.clone())
    }
}

fn student_form(action: &str, existing: Option<&Student>, error: Option<&PhotoRollError>) -> Markup {
    let existing_name = existing.and_then(|s| s.name.as_deref());
    let existing_photo = existing.and_then(Student::photo_path);

    html! {
        @if let Some(error) = error {
            (alert(AlertKind::Error, error.to_string()))
        }

        form method="post" action=(action) enctype="multipart/form-data" class="p-4" {
            (simple_form_element("name", "Name", false, None, existing_name))

            (form_element("photo", "Image", html! {
                @if let Some(photo_path) = existing_photo {
                    div class="mb-2" {
                        img src={"/files/" (thumbnail_name(photo_path))};
                    }
                    div class="mb-2 flex items-center" {
                        input type="checkbox" name="delete_photo" id="delete_photo" class="mr-2 leading-tight";
                        label for="delete_photo" class="text-gray-300 cursor-pointer" {"Delete"}
                    }
                }
                input type="file" name="photo" id="photo" accept=".gif,.jpg,.jpeg,.png,.tiff" class="block w-full text-sm text-gray-300 file:mr-4 file:py-2 file:px-4 file:rounded file:border-0 file:text-sm file:font-semibold file:bg-violet-50 file:text-violet-700 hover:file:bg-violet-100";
            }))

            (form_submit_button(Some("Save")))
        }
    }
}

fn form_page(state: &PhotoRollState, heading: &str, form: Markup) -> Markup {
    state.render(html! {
        div class="bg-gray-800 shadow-md rounded px-8 pt-6 pb-8 mb-4 w-full max-w-md" {
            (title(heading))
            (form)
            a href="/admin/student/" class="text-gray-400 underline" {"Cancel"}
        }
    })
}

fn rejected(state: &PhotoRollState, heading: &str, form: Markup, error: &PhotoRollError) -> Response {
    (error.status_code(), form_page(state, heading, form)).into_response()
}

pub async fn get_new_student_form(State(state): State<PhotoRollState>) -> Markup {
    form_page(&state, "Create", student_form("/admin/student/new", None, None))
}

pub async fn post_new_student(
    State(state): State<PhotoRollState>,
    multipart: Multipart,
) -> PhotoRollResult<Response> {
    let submission = StudentSubmission::from_multipart(multipart).await?;

    match create_student(&state, submission).await {
        Ok(id) => {
            info!(?id, "Created student");
            Ok(Redirect::to("/admin/student/?notice=created").into_response())
        }
        Err(e) if e.is_bad_input() => {
            let form = student_form("/admin/student/new", None, Some(&e));
            Ok(rejected(&state, "Create", form, &e))
        }
        Err(e) => Err(e),
    }
}

async fn create_student(state: &PhotoRollState, submission: StudentSubmission) -> PhotoRollResult<i64> {
    let name = submission.validated_name()?;
    let photo_path = match submission.upload {
        Some(upload) => Some(state.images().save(upload).await?),
        None => None,
    };

    let result = Student::insert_into_database(
        NewStudent {
            name,
            photo_path: photo_path.clone(),
        },
        &mut *state.get_connection().await?,
    )
    .await;

    if result.is_err() {
        if let Some(photo_path) = &photo_path {
            state.images().remove(photo_path).await;
        }
    } else {
        state.send_sse_event(SseEvent::CrudStudent);
    }

    result
}

pub async fn get_edit_student_form(
    State(state): State<PhotoRollState>,
    Query(IntIdForm { id }): Query<IntIdForm>,
) -> PhotoRollResult<Markup> {
    let student = Student::get_from_db_by_id(id, &mut *state.get_connection().await?)
        .await?
        .context(MissingStudentSnafu { id })?;

    Ok(form_page(
        &state,
        "Edit",
        student_form(&format!("/admin/student/edit?id={id}"), Some(&student), None),
    ))
}

pub async fn post_edit_student(
    State(state): State<PhotoRollState>,
    Query(IntIdForm { id }): Query<IntIdForm>,
    multipart: Multipart,
) -> PhotoRollResult<Response> {
    let existing = Student::get_from_db_by_id(id, &mut *state.get_connection().await?)
        .await?
        .context(MissingStudentSnafu { id })?;
    let submission = StudentSubmission::from_multipart(multipart).await?;

    match update_student(&state, &existing, submission).await {
        Ok(()) => {
            info!(?id, "Saved student");
            Ok(Redirect::to("/admin/student/?notice=saved").into_response())
        }
        Err(e) if e.is_bad_input() => {
            let form = student_form(&format!("/admin/student/edit?id={id}"), Some(&existing), Some(&e));
            Ok(rejected(&state, "Edit", form, &e))
        }
        Err(e) => Err(e),
    }
}

async fn update_student(
    state: &PhotoRollState,
    existing: &Student,
    submission: StudentSubmission,
) -> PhotoRollResult<()> {
    let name = submission.validated_name()?;
    let old_photo = existing.photo_path();

    //ticking delete wins over a new upload
    let stored = match submission.upload {
        Some(upload) if !submission.delete_photo => Some(state.images().save(upload).await?),
        _ => None,
    };
    let photo_path = if submission.delete_photo {
        None
    } else {
        stored.clone().or_else(|| existing.photo_path.clone())
    };
    //same name means the new upload already overwrote the old one
    let replaced = stored.is_some() && stored.as_deref() == old_photo;

    let result = Student::update_in_database(
        existing.id,
        NewStudent { name, photo_path },
        &mut *state.get_connection().await?,
    )
    .await;

    if let Err(e) = result {
        if let Some(stored) = stored.as_deref().filter(|_| !replaced) {
            state.images().remove(stored).await;
        }
        return Err(e);
    }

    if let Some(old_photo) = old_photo.filter(|_| (submission.delete_photo || stored.is_some()) && !replaced) {
        state.images().remove(old_photo).await;
    }
    state.send_sse_event(SseEvent::CrudStudent);

    Ok(())
}
