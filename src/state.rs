use crate::{
    config::RuntimeConfiguration,
    data::{AfterDelete, DataType, student::Student},
    error::{GetDatabaseConnectionSnafu, MigrateSnafu, MissingStudentSnafu, OpenDatabaseSnafu, PhotoRollResult},
    maud_conveniences::render_nav,
    routes::sse::SseEvent,
    uploads::ImageStore,
};
use maud::{DOCTYPE, Markup, html};
use snafu::{OptionExt, ResultExt};
use sqlx::{
    Pool, Sqlite,
    pool::PoolConnection,
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
};
use std::ops::Deref;
use tokio::sync::broadcast::{Receiver, Sender, channel};

#[derive(Clone, Debug)]
pub struct PhotoRollState {
    pool: Pool<Sqlite>,
    config: RuntimeConfiguration,
    images: ImageStore,
    sse_events_sender: Sender<SseEvent>,
}

impl PhotoRollState {
    pub async fn new(options: SqlitePoolOptions, config: RuntimeConfiguration) -> PhotoRollResult<Self> {
        let server_config = config.server_config();
        let db_file = server_config.db_file.clone();

        //only a brand new database gets the sample rows
        let first_run = !tokio::fs::try_exists(&db_file).await.unwrap_or(false);

        let pool = options
            .connect_with(
                SqliteConnectOptions::new()
                    .filename(&db_file)
                    .create_if_missing(true),
            )
            .await
            .context(OpenDatabaseSnafu { path: db_file })?;

        sqlx::migrate!().run(&pool).await.context(MigrateSnafu)?;

        if first_run {
            Student::seed(&pool).await?;
        }

        let images = ImageStore::new(server_config.upload_dir.clone()).await?;
        let (tx, _rx) = channel(16);

        Ok(Self {
            pool,
            config,
            images,
            sse_events_sender: tx,
        })
    }

    pub fn render(&self, markup: Markup) -> Markup {
        let server_config = self.config.server_config();
        let site_name = &server_config.site_name;

        html! {
            (DOCTYPE)
            html {
                head {
                    meta charset="UTF-8" {}
                    meta name="viewport" content="width=device-width, initial-scale=1.0" {}
                    script src="https://unpkg.com/htmx.org@2.0.4" integrity="sha384-HGfztofotfshcF7+8n44JQL2oJmowVChPTg48S+jvZoztPfvwD79OC/LTtG6dMp+" crossorigin="anonymous" {}
                    script src="https://unpkg.com/htmx-ext-sse@2.2.3" integrity="sha384-Y4gc0CK6Kg+hmulDc6rZPJu0tqvk7EWlih0Oh+2OkAi1ZDlCbBDCQEE2uVk472Ky" crossorigin="anonymous" {}
                    script src="https://cdn.jsdelivr.net/npm/@tailwindcss/browser@4" {}
                    title { (site_name) }
                }
                body hx-ext="sse" class="bg-gray-900 min-h-screen flex flex-col items-center text-white" {
                    (render_nav(site_name))
                    (markup)
                }
            }
        }
    }

    pub const fn config(&self) -> &RuntimeConfiguration {
        &self.config
    }

    pub const fn images(&self) -> &ImageStore {
        &self.images
    }

    pub async fn get_connection(&self) -> PhotoRollResult<PoolConnection<Sqlite>> {
        self.pool
            .acquire()
            .await
            .context(GetDatabaseConnectionSnafu)
    }

    ///deletes the row, then lets the image store clean up after it
    pub async fn delete_student(&self, id: i64) -> PhotoRollResult<Student> {
        let removed = Student::remove_from_database(id, &mut *self.get_connection().await?)
            .await?
            .context(MissingStudentSnafu { id })?;

        self.images.after_delete(&removed).await;
        self.send_sse_event(SseEvent::CrudStudent);

        info!(?removed, "Deleted student");
        Ok(removed)
    }

    pub fn subscribe_to_sse_feed(&self) -> Receiver<SseEvent> {
        self.sse_events_sender.subscribe()
    }

    pub fn send_sse_event(&self, event: SseEvent) {
        let _ = self.sse_events_sender.send(event);
    }

    pub async fn sensible_shutdown(&self) {
        self.pool.close().await;
    }
}

impl Deref for PhotoRollState {
    type Target = Pool<Sqlite>;

    fn deref(&self) -> &Self::Target {
        &self.pool
    }
}
