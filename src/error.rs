use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use maud::html;
use snafu::Snafu;
use std::{net::AddrParseError, path::PathBuf};

pub type PhotoRollResult<T> = Result<T, PhotoRollError>;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum PhotoRollError {
    #[snafu(display("Error opening database at {}", path.display()))]
    OpenDatabase { source: sqlx::Error, path: PathBuf },
    #[snafu(display("Error getting db connection"))]
    GetDatabaseConnection { source: sqlx::Error },
    #[snafu(display("Error making SQL query"))]
    MakeQuery { source: sqlx::Error },
    #[snafu(display("Error commiting SQL transaction"))]
    CommitTransaction { source: sqlx::Error },
    #[snafu(display("Error migrating DB schema"))]
    MigrateError { source: sqlx::migrate::MigrateError },
    #[snafu(display("Unable to retrieve env var `{}`", name))]
    BadEnvVar {
        source: dotenvy::Error,
        name: &'static str,
    },
    #[snafu(display("Unable to parse server address {:?}", original))]
    ParseServerAddress {
        source: AddrParseError,
        original: String,
    },
    #[snafu(display("Unable to create upload directory {}", path.display()))]
    CreateUploadDir {
        source: std::io::Error,
        path: PathBuf,
    },
    #[snafu(display("Unable to write {}", path.display()))]
    WriteUpload {
        source: std::io::Error,
        path: PathBuf,
    },
    #[snafu(display("Error with multipart form input"))]
    Multipart {
        source: axum::extract::multipart::MultipartError,
    },
    #[snafu(display("Unable to find student with ID: {}", id))]
    MissingStudent { id: i64 },
    #[snafu(display("{} cannot be longer than {} characters", field, max))]
    FieldTooLong { field: &'static str, max: usize },
    #[snafu(display("Invalid file name {:?}", original))]
    InvalidFileName { original: String },
    #[snafu(display("Invalid file extension: {:?}", extension))]
    DisallowedExtension { extension: String },
    #[snafu(display("Uploaded file is not an image"))]
    NotAnImage,
    #[snafu(display("Invalid image: {}", source))]
    InvalidImage { source: image::ImageError },
    #[snafu(display("Error encoding image {}", path.display()))]
    EncodeImage {
        source: image::ImageError,
        path: PathBuf,
    },
    #[snafu(display("Image processing task failed"))]
    ImageTask { source: tokio::task::JoinError },
}

impl PhotoRollError {
    ///whether this was caused by what the user sent, and so should be shown back to them on the form
    pub const fn is_bad_input(&self) -> bool {
        matches!(
            self,
            Self::FieldTooLong { .. }
                | Self::InvalidFileName { .. }
                | Self::DisallowedExtension { .. }
                | Self::NotAnImage
                | Self::InvalidImage { .. }
        )
    }

    pub fn status_code(&self) -> StatusCode {
        const ISE: StatusCode = StatusCode::INTERNAL_SERVER_ERROR; //internal server error
        const NF: StatusCode = StatusCode::NOT_FOUND; //not found
        const BI: StatusCode = StatusCode::BAD_REQUEST; //bad input

        match self {
            Self::OpenDatabase { .. } | Self::GetDatabaseConnection { .. } => ISE,
            Self::MigrateError { .. } | Self::CommitTransaction { .. } => ISE,
            Self::MakeQuery { source } => match source {
                sqlx::Error::RowNotFound => NF,
                _ => ISE,
            },
            Self::BadEnvVar { .. } | Self::ParseServerAddress { .. } => ISE,
            Self::CreateUploadDir { .. } | Self::WriteUpload { .. } => ISE,
            Self::Multipart { source } => source.status(),
            Self::MissingStudent { .. } => NF,
            Self::FieldTooLong { .. }
            | Self::InvalidFileName { .. }
            | Self::DisallowedExtension { .. }
            | Self::NotAnImage
            | Self::InvalidImage { .. } => BI,
            Self::EncodeImage { .. } | Self::ImageTask { .. } => ISE,
        }
    }
}

impl IntoResponse for PhotoRollError {
    fn into_response(self) -> Response {
        let status_code = self.status_code();

        if status_code.is_server_error() {
            error!(?self, "Error!");
        } else {
            warn!(?self, "Request failed");
        }

        let body = html! {
            div class="bg-red-100 border border-red-400 text-red-700 px-4 py-3 rounded relative mb-4" role="alert" {
                strong class="font-bold" {"Error: "}
                span {(self.to_string())}
            }
        };
        (status_code, Html(body.into_string())).into_response()
    }
}
