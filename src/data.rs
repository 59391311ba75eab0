use crate::error::PhotoRollResult;
use serde::Deserialize;
use sqlx::{Pool, Sqlite, SqliteConnection};

pub mod student;

#[derive(Deserialize, Debug, Clone, Copy)]
pub struct IntIdForm {
    pub id: i64,
}

pub trait DataType: Sized {
    type Id;
    type FormForId;
    type FormForAdding;

    async fn get_from_db_by_id(id: Self::Id, conn: &mut SqliteConnection) -> PhotoRollResult<Option<Self>>;
    async fn get_all(pool: &Pool<Sqlite>) -> PhotoRollResult<Vec<Self>>;
    async fn insert_into_database(
        to_be_added: Self::FormForAdding,
        conn: &mut SqliteConnection,
    ) -> PhotoRollResult<Self::Id>;
    ///replaces every non-id field, errors if the row doesn't exist
    async fn update_in_database(
        id: Self::Id,
        replacement: Self::FormForAdding,
        conn: &mut SqliteConnection,
    ) -> PhotoRollResult<()>;
    ///returns what was in the row before it went, if it existed
    async fn remove_from_database(id: Self::Id, conn: &mut SqliteConnection) -> PhotoRollResult<Option<Self>>;
}

///called once a row is gone, with the values it had
pub trait AfterDelete<T> {
    async fn after_delete(&self, removed: &T);
}
