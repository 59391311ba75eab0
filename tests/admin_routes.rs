mod common;

use axum::http::{StatusCode, header::LOCATION};
use common::{body_string, gif_bytes, multipart_body, png_bytes, start_in, test_app};
use image::GenericImageView;
use photoroll::data::{
    DataType,
    student::{SAMPLE_ANIMALS, Student},
};

async fn id_of(state: &photoroll::state::PhotoRollState, name: &str) -> i64 {
    Student::get_all(state)
        .await
        .unwrap()
        .into_iter()
        .find(|s| s.name.as_deref() == Some(name))
        .unwrap()
        .id
}

#[tokio::test]
async fn first_start_seeds_five_animals() {
    let app = test_app().await;

    let students = Student::get_all(&app.state).await.unwrap();
    assert_eq!(students.len(), 5);

    let mut names: Vec<_> = students.iter().map(|s| s.display_name().to_string()).collect();
    names.sort();
    assert_eq!(names, SAMPLE_ANIMALS);

    for student in &students {
        assert_eq!(
            student.photo_path.as_deref(),
            Some(format!("{}.jpg", student.display_name().to_lowercase()).as_str())
        );
    }

    assert!(app.dir.path().join("files").is_dir());
}

#[tokio::test]
async fn restarting_does_not_reseed() {
    let dir = tempfile::tempdir().unwrap();

    let (state, _) = start_in(dir.path()).await;
    let lion = id_of(&state, "Lion").await;
    state.delete_student(lion).await.unwrap();
    state.sensible_shutdown().await;

    let (state, _) = start_in(dir.path()).await;
    assert_eq!(Student::count(&state).await.unwrap(), 4);
}

#[tokio::test]
async fn list_shows_thumbnails() {
    let app = test_app().await;

    let response = app.get("/admin/student/").await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_string(response).await;
    assert!(body.contains("List (5)"), "{body}");
    for animal in SAMPLE_ANIMALS {
        let thumb = format!(
            r#"<img src="/files/{}_thumb.jpg">"#,
            animal.to_lowercase()
        );
        assert!(body.contains(&thumb), "missing {thumb}");
    }
}

#[tokio::test]
async fn list_photo_column_is_empty_without_photo() {
    let app = test_app().await;
    let rhino = id_of(&app.state, "Rhino").await;

    let response = app
        .post_multipart(
            &format!("/admin/student/edit?id={rhino}"),
            multipart_body(&[("name", "Rhino"), ("delete_photo", "y")], None),
        )
        .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);

    let body = body_string(app.get("/internal/students").await).await;
    assert!(!body.contains("rhino_thumb.jpg"));
    assert!(body.contains("lion_thumb.jpg"));
}

#[tokio::test]
async fn ticking_delete_removes_photo_files() {
    let app = test_app().await;
    std::fs::write(app.upload_path("rhino.jpg"), b"original").unwrap();
    std::fs::write(app.upload_path("rhino_thumb.jpg"), b"thumbnail").unwrap();
    let rhino = id_of(&app.state, "Rhino").await;

    let response = app
        .post_multipart(
            &format!("/admin/student/edit?id={rhino}"),
            multipart_body(&[("name", "Rhino"), ("delete_photo", "y")], None),
        )
        .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);

    assert!(!app.upload_path("rhino.jpg").exists());
    assert!(!app.upload_path("rhino_thumb.jpg").exists());

    let student = Student::get_from_db_by_id(rhino, &mut *app.state.get_connection().await.unwrap())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(student.photo_path, None);
}

#[tokio::test]
async fn ticking_delete_ignores_new_upload() {
    let app = test_app().await;
    std::fs::write(app.upload_path("rhino.jpg"), b"original").unwrap();
    std::fs::write(app.upload_path("rhino_thumb.jpg"), b"thumbnail").unwrap();
    let rhino = id_of(&app.state, "Rhino").await;

    let response = app
        .post_multipart(
            &format!("/admin/student/edit?id={rhino}"),
            multipart_body(
                &[("name", "Rhino"), ("delete_photo", "y")],
                Some(("rhino-new.png", png_bytes(30, 30).as_slice())),
            ),
        )
        .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);

    assert!(!app.upload_path("rhino.jpg").exists());
    assert!(!app.upload_path("rhino_thumb.jpg").exists());
    assert!(!app.upload_path("rhino-new.png").exists());
    assert!(!app.upload_path("rhino-new_thumb.png").exists());

    let student = Student::get_from_db_by_id(rhino, &mut *app.state.get_connection().await.unwrap())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(student.photo_path, None);
}

#[tokio::test]
async fn replacing_with_gif_of_same_stem_keeps_new_jpeg() {
    let app = test_app().await;
    std::fs::write(app.upload_path("elephant.jpg"), b"old").unwrap();
    std::fs::write(app.upload_path("elephant_thumb.jpg"), b"old thumb").unwrap();
    let elephant = id_of(&app.state, "Elephant").await;

    let response = app
        .post_multipart(
            &format!("/admin/student/edit?id={elephant}"),
            multipart_body(
                &[("name", "Elephant")],
                Some(("elephant.gif", gif_bytes(60, 40).as_slice())),
            ),
        )
        .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);

    let original = std::fs::read(app.upload_path("elephant.jpg")).unwrap();
    assert_eq!(image::guess_format(&original).unwrap(), image::ImageFormat::Jpeg);
    assert_eq!(image::load_from_memory(&original).unwrap().dimensions(), (60, 40));

    let thumb = image::open(app.upload_path("elephant_thumb.jpg")).unwrap();
    assert_eq!(thumb.dimensions(), (100, 100));
    assert!(!app.upload_path("elephant.gif").exists());

    let student = Student::get_from_db_by_id(elephant, &mut *app.state.get_connection().await.unwrap())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(student.photo_path.as_deref(), Some("elephant.jpg"));
}

#[tokio::test]
async fn sse_feed_streams_events() {
    let app = test_app().await;

    let response = app.get("/sse_feed").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(
        response.headers()["content-type"]
            .to_str()
            .unwrap()
            .starts_with("text/event-stream")
    );
}

#[tokio::test]
async fn unknown_notice_still_shows_list() {
    let app = test_app().await;

    let response = app.get("/admin/student/?notice=foo").await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_string(response).await;
    assert!(body.contains("List (5)"));
    assert!(!body.contains("role=\"alert\""));
}

#[tokio::test]
async fn list_sorts_and_notices() {
    let app = test_app().await;

    let body = body_string(
        app.get("/admin/student/?sort=name&desc=true&page=0&notice=created")
            .await,
    )
    .await;
    assert!(body.contains("Record was successfully created."));

    let rhino = body.find("rhino_thumb.jpg").unwrap();
    let buffalo = body.find("buffalo_thumb.jpg").unwrap();
    assert!(rhino < buffalo);
}

#[tokio::test]
async fn deleting_removes_photo_and_thumbnail() {
    let app = test_app().await;
    std::fs::write(app.upload_path("buffalo.jpg"), b"original").unwrap();
    std::fs::write(app.upload_path("buffalo_thumb.jpg"), b"thumbnail").unwrap();
    let buffalo = id_of(&app.state, "Buffalo").await;

    let response = app.delete(&format!("/admin/student?id={buffalo}")).await;
    assert_eq!(response.status(), StatusCode::OK);

    assert!(!app.upload_path("buffalo.jpg").exists());
    assert!(!app.upload_path("buffalo_thumb.jpg").exists());
    assert_eq!(Student::count(&app.state).await.unwrap(), 4);
}

#[tokio::test]
async fn deleting_with_missing_photo_still_succeeds() {
    let app = test_app().await;
    let leopard = id_of(&app.state, "Leopard").await;
    assert!(!app.upload_path("leopard.jpg").exists());

    let response = app.delete(&format!("/admin/student?id={leopard}")).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(Student::count(&app.state).await.unwrap(), 4);
}

#[tokio::test]
async fn deleting_unknown_student_is_not_found() {
    let app = test_app().await;

    let response = app.delete("/admin/student?id=9999").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(Student::count(&app.state).await.unwrap(), 5);
}

#[tokio::test]
async fn creating_with_photo_saves_thumbnail() {
    let app = test_app().await;

    let response = app
        .post_multipart(
            "/admin/student/new",
            multipart_body(&[("name", "Zebra")], Some(("zebra.png", png_bytes(300, 150).as_slice()))),
        )
        .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(
        response.headers()[LOCATION],
        "/admin/student/?notice=created"
    );

    let zebra = id_of(&app.state, "Zebra").await;
    let student = Student::get_from_db_by_id(zebra, &mut *app.state.get_connection().await.unwrap())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(student.photo_path.as_deref(), Some("zebra.png"));

    let thumb = image::open(app.upload_path("zebra_thumb.png")).unwrap();
    assert_eq!(thumb.dimensions(), (100, 100));

    let served = app.get("/files/zebra_thumb.png").await;
    assert_eq!(served.status(), StatusCode::OK);
}

#[tokio::test]
async fn creating_without_photo_or_name() {
    let app = test_app().await;

    let response = app
        .post_multipart("/admin/student/new", multipart_body(&[("name", "")], None))
        .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);

    let students = Student::get_all(&app.state).await.unwrap();
    let newest = students.last().unwrap();
    assert_eq!(students.len(), 6);
    assert_eq!(newest.name, None);
    assert_eq!(newest.photo_path, None);
}

#[tokio::test]
async fn creating_with_bad_extension_rerenders_form() {
    let app = test_app().await;

    let response = app
        .post_multipart(
            "/admin/student/new",
            multipart_body(&[("name", "Gnu")], Some(("gnu.bmp", png_bytes(10, 10).as_slice()))),
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = body_string(response).await;
    assert!(body.contains("Invalid file extension"), "{body}");
    assert!(body.contains("<form"));
    assert_eq!(Student::count(&app.state).await.unwrap(), 5);
}

#[tokio::test]
async fn creating_with_long_name_is_rejected() {
    let app = test_app().await;
    let name = "x".repeat(65);

    let response = app
        .post_multipart("/admin/student/new", multipart_body(&[("name", name.as_str())], None))
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(Student::count(&app.state).await.unwrap(), 5);
}

#[tokio::test]
async fn editing_replaces_photo() {
    let app = test_app().await;
    std::fs::write(app.upload_path("elephant.jpg"), b"old").unwrap();
    std::fs::write(app.upload_path("elephant_thumb.jpg"), b"old thumb").unwrap();
    let elephant = id_of(&app.state, "Elephant").await;

    let response = app
        .post_multipart(
            &format!("/admin/student/edit?id={elephant}"),
            multipart_body(
                &[("name", "Big Elephant")],
                Some(("elephant-new.png", png_bytes(50, 80).as_slice())),
            ),
        )
        .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(response.headers()[LOCATION], "/admin/student/?notice=saved");

    assert!(!app.upload_path("elephant.jpg").exists());
    assert!(!app.upload_path("elephant_thumb.jpg").exists());
    assert!(app.upload_path("elephant-new.png").exists());
    assert!(app.upload_path("elephant-new_thumb.png").exists());

    let student = Student::get_from_db_by_id(elephant, &mut *app.state.get_connection().await.unwrap())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(student.name.as_deref(), Some("Big Elephant"));
    assert_eq!(student.photo_path.as_deref(), Some("elephant-new.png"));
}

#[tokio::test]
async fn editing_without_upload_keeps_photo() {
    let app = test_app().await;
    let lion = id_of(&app.state, "Lion").await;

    let response = app
        .post_multipart(
            &format!("/admin/student/edit?id={lion}"),
            multipart_body(&[("name", "Lion King")], None),
        )
        .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);

    let student = Student::get_from_db_by_id(lion, &mut *app.state.get_connection().await.unwrap())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(student.name.as_deref(), Some("Lion King"));
    assert_eq!(student.photo_path.as_deref(), Some("lion.jpg"));
}

#[tokio::test]
async fn edit_form_shows_current_photo() {
    let app = test_app().await;
    let lion = id_of(&app.state, "Lion").await;

    let response = app.get(&format!("/admin/student/edit?id={lion}")).await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_string(response).await;
    assert!(body.contains(r#"value="Lion""#));
    assert!(body.contains("/files/lion_thumb.jpg"));
    assert!(body.contains(r#"name="delete_photo""#));
}

#[tokio::test]
async fn editing_unknown_student_is_not_found() {
    let app = test_app().await;

    assert_eq!(
        app.get("/admin/student/edit?id=4242").await.status(),
        StatusCode::NOT_FOUND
    );
    assert_eq!(
        app.post_multipart(
            "/admin/student/edit?id=4242",
            multipart_body(&[("name", "Ghost")], None)
        )
        .await
        .status(),
        StatusCode::NOT_FOUND
    );
}

#[tokio::test]
async fn index_links_to_students() {
    let app = test_app().await;

    let body = body_string(app.get("/").await).await;
    assert!(body.contains("/admin/student/"));
    assert!(body.contains("5 students on record."));
}
