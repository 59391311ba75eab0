use crate::{
    data::{AfterDelete, student::Student},
    error::{
        CreateUploadDirSnafu, DisallowedExtensionSnafu, EncodeImageSnafu, FieldTooLongSnafu,
        ImageTaskSnafu, InvalidFileNameSnafu, InvalidImageSnafu, NotAnImageSnafu,
        PhotoRollResult, WriteUploadSnafu,
    },
};
use axum::body::Bytes;
use image::{DynamicImage, ImageFormat, imageops::FilterType};
use snafu::{OptionExt, ResultExt, ensure};
use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

pub const ALLOWED_EXTENSIONS: [&str; 5] = ["gif", "jpg", "jpeg", "png", "tiff"];
pub const THUMBNAIL_WIDTH: u32 = 100;
pub const THUMBNAIL_HEIGHT: u32 = 100;
pub const MAX_PHOTO_PATH_LEN: usize = 128;

///splits off the extension (including the dot), ignoring leading dots in the file's base name
pub fn split_extension(file_name: &str) -> (&str, &str) {
    let base_start = file_name.rfind(['/', '\\']).map_or(0, |i| i + 1);
    let base = &file_name[base_start..];
    let leading_dots = base.len() - base.trim_start_matches('.').len();

    match base[leading_dots..].rfind('.') {
        Some(dot) => file_name.split_at(base_start + leading_dots + dot),
        None => (file_name, ""),
    }
}

///`lion.jpg` -> `lion_thumb.jpg`
pub fn thumbnail_name(file_name: &str) -> String {
    let (stem, extension) = split_extension(file_name);
    format!("{stem}_thumb{extension}")
}

///reduces an uploaded file name to something safe to put on disk and in a URL
pub fn sanitise_file_name(original: &str) -> Option<String> {
    let spaced = original.replace(['/', '\\'], " ");
    let joined = spaced.split_whitespace().collect::<Vec<_>>().join("_");
    let filtered: String = joined
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-'))
        .collect();
    let trimmed = filtered.trim_matches(['.', '_']);

    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

#[derive(Debug)]
pub struct PhotoUpload {
    pub file_name: String,
    pub bytes: Bytes,
}

///stored photos + their thumbnails, all flat inside one directory
#[derive(Clone, Debug)]
pub struct ImageStore {
    root: Arc<PathBuf>,
}

impl ImageStore {
    pub async fn new(root: PathBuf) -> PhotoRollResult<Self> {
        tokio::fs::create_dir_all(&root)
            .await
            .context(CreateUploadDirSnafu { path: root.clone() })?;

        Ok(Self {
            root: Arc::new(root),
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn path_of(&self, file_name: &str) -> PathBuf {
        self.root.join(file_name)
    }

    ///validates and writes the upload and its thumbnail, returning the name it was stored under
    pub async fn save(&self, PhotoUpload { file_name, bytes }: PhotoUpload) -> PhotoRollResult<String> {
        let sanitised = sanitise_file_name(&file_name).context(InvalidFileNameSnafu {
            original: file_name.clone(),
        })?;

        let extension = split_extension(&sanitised)
            .1
            .trim_start_matches('.')
            .to_ascii_lowercase();
        ensure!(
            ALLOWED_EXTENSIONS.contains(&extension.as_str()),
            DisallowedExtensionSnafu { extension }
        );
        ensure!(infer::is_image(&bytes), NotAnImageSnafu);

        let root = self.root.clone();
        let stored_name =
            tokio::task::spawn_blocking(move || write_with_thumbnail(&root, &sanitised, &bytes))
                .await
                .context(ImageTaskSnafu)??;

        info!(?stored_name, "Saved photo");
        Ok(stored_name)
    }

    ///removes the photo and its thumbnail, ignoring anything that goes wrong
    pub async fn remove(&self, photo_path: &str) {
        for path in [
            self.path_of(photo_path),
            self.path_of(&thumbnail_name(photo_path)),
        ] {
            if let Err(e) = tokio::fs::remove_file(&path).await {
                debug!(?e, ?path, "Unable to remove photo, ignoring");
            }
        }
    }
}

impl AfterDelete<Student> for ImageStore {
    async fn after_delete(&self, removed: &Student) {
        if let Some(photo_path) = removed.photo_path() {
            self.remove(photo_path).await;
        }
    }
}

fn write_with_thumbnail(root: &Path, file_name: &str, bytes: &[u8]) -> PhotoRollResult<String> {
    let format = image::guess_format(bytes).context(InvalidImageSnafu)?;
    let image = image::load_from_memory_with_format(bytes, format).context(InvalidImageSnafu)?;

    //only PNGs and JPEGs are kept as-is, everything else becomes a JPEG
    let (stored_name, save_format) = match format {
        ImageFormat::Png | ImageFormat::Jpeg => (file_name.to_string(), format),
        _ => (
            format!("{}.jpg", split_extension(file_name).0),
            ImageFormat::Jpeg,
        ),
    };
    ensure!(
        stored_name.len() <= MAX_PHOTO_PATH_LEN,
        FieldTooLongSnafu {
            field: "Photo",
            max: MAX_PHOTO_PATH_LEN
        }
    );

    let path = root.join(&stored_name);
    if save_format == format {
        std::fs::write(&path, bytes).context(WriteUploadSnafu { path })?;
    } else {
        save_image(&image, &path, save_format)?;
    }

    let thumbnail = image.resize_to_fill(THUMBNAIL_WIDTH, THUMBNAIL_HEIGHT, FilterType::Lanczos3);
    save_image(&thumbnail, &root.join(thumbnail_name(&stored_name)), save_format)?;

    Ok(stored_name)
}

fn save_image(image: &DynamicImage, path: &Path, format: ImageFormat) -> PhotoRollResult<()> {
    let result = if format == ImageFormat::Jpeg {
        //jpeg has no alpha channel
        DynamicImage::from(image.to_rgb8()).save_with_format(path, format)
    } else {
        image.save_with_format(path, format)
    };

    result.context(EncodeImageSnafu { path })
}
