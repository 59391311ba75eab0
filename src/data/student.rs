use crate::{
    data::{DataType, IntIdForm},
    error::{CommitTransactionSnafu, GetDatabaseConnectionSnafu, MakeQuerySnafu, MissingStudentSnafu, PhotoRollResult},
};
use serde::Deserialize;
use snafu::{ResultExt, ensure};
use sqlx::{FromRow, Pool, Sqlite, SqliteConnection};

pub const SAMPLE_ANIMALS: [&str; 5] = ["Buffalo", "Elephant", "Leopard", "Lion", "Rhino"];
pub const MAX_NAME_LEN: usize = 64;
pub const PAGE_SIZE: u32 = 20;

#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct Student {
    pub id: i64,
    pub name: Option<String>,
    pub photo_path: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewStudent {
    pub name: Option<String>,
    pub photo_path: Option<String>,
}

impl Student {
    pub fn photo_path(&self) -> Option<&str> {
        self.photo_path.as_deref().filter(|p| !p.is_empty())
    }

    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or("")
    }
}

#[derive(Deserialize, Debug, Default, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SortColumn {
    #[default]
    Id,
    Name,
    PhotoPath,
}

impl SortColumn {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Id => "id",
            Self::Name => "name",
            Self::PhotoPath => "photo_path",
        }
    }
}

#[derive(Deserialize, Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ListQuery {
    #[serde(default)]
    pub sort: SortColumn,
    #[serde(default)]
    pub desc: bool,
    #[serde(default)]
    pub page: u32,
}

impl ListQuery {
    ///clicking the column we're already sorted by flips the direction
    #[must_use]
    pub fn sorted_by(self, sort: SortColumn) -> Self {
        Self {
            sort,
            desc: self.sort == sort && !self.desc,
            page: 0,
        }
    }

    #[must_use]
    pub const fn on_page(self, page: u32) -> Self {
        Self { page, ..self }
    }

    pub fn to_query_string(self) -> String {
        format!(
            "sort={}&desc={}&page={}",
            self.sort.as_str(),
            self.desc,
            self.page
        )
    }
}

impl DataType for Student {
    type Id = i64;
    type FormForId = IntIdForm;
    type FormForAdding = NewStudent;

    async fn get_from_db_by_id(id: Self::Id, conn: &mut SqliteConnection) -> PhotoRollResult<Option<Self>> {
        sqlx::query_as::<_, Self>("SELECT id, name, photo_path FROM students WHERE id = ?")
            .bind(id)
            .fetch_optional(conn)
            .await
            .context(MakeQuerySnafu)
    }

    async fn get_all(pool: &Pool<Sqlite>) -> PhotoRollResult<Vec<Self>> {
        sqlx::query_as::<_, Self>("SELECT id, name, photo_path FROM students ORDER BY id")
            .fetch_all(pool)
            .await
            .context(MakeQuerySnafu)
    }

    async fn insert_into_database(
        NewStudent { name, photo_path }: Self::FormForAdding,
        conn: &mut SqliteConnection,
    ) -> PhotoRollResult<Self::Id> {
        sqlx::query_scalar::<_, i64>(
            "INSERT INTO students (name, photo_path) VALUES (?, ?) RETURNING id",
        )
        .bind(name)
        .bind(photo_path)
        .fetch_one(conn)
        .await
        .context(MakeQuerySnafu)
    }

    async fn update_in_database(
        id: Self::Id,
        NewStudent { name, photo_path }: Self::FormForAdding,
        conn: &mut SqliteConnection,
    ) -> PhotoRollResult<()> {
        let updated = sqlx::query("UPDATE students SET name = ?, photo_path = ? WHERE id = ?")
            .bind(name)
            .bind(photo_path)
            .bind(id)
            .execute(conn)
            .await
            .context(MakeQuerySnafu)?
            .rows_affected();

        ensure!(updated > 0, MissingStudentSnafu { id });
        Ok(())
    }

    async fn remove_from_database(id: Self::Id, conn: &mut SqliteConnection) -> PhotoRollResult<Option<Self>> {
        sqlx::query_as::<_, Self>(
            "DELETE FROM students WHERE id = ? RETURNING id, name, photo_path",
        )
        .bind(id)
        .fetch_optional(conn)
        .await
        .context(MakeQuerySnafu)
    }
}

impl Student {
    pub async fn get_page(query: ListQuery, pool: &Pool<Sqlite>) -> PhotoRollResult<Vec<Self>> {
        let direction = if query.desc { "DESC" } else { "ASC" };
        //column + direction come from enums, never from the request directly
        let sql = format!(
            "SELECT id, name, photo_path FROM students ORDER BY {} {direction}, id {direction} LIMIT ? OFFSET ?",
            query.sort.as_str()
        );

        sqlx::query_as::<_, Self>(&sql)
            .bind(i64::from(PAGE_SIZE))
            .bind(i64::from(query.page) * i64::from(PAGE_SIZE))
            .fetch_all(pool)
            .await
            .context(MakeQuerySnafu)
    }

    pub async fn count(pool: &Pool<Sqlite>) -> PhotoRollResult<u32> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM students")
            .fetch_one(pool)
            .await
            .context(MakeQuerySnafu)?;
        Ok(u32::try_from(count).unwrap_or(u32::MAX))
    }

    ///fills a fresh database with the sample animals, all-or-nothing
    pub async fn seed(pool: &Pool<Sqlite>) -> PhotoRollResult<()> {
        let mut transaction = pool.begin().await.context(GetDatabaseConnectionSnafu)?;

        for name in SAMPLE_ANIMALS {
            Self::insert_into_database(
                NewStudent {
                    name: Some(name.to_string()),
                    photo_path: Some(format!("{}.jpg", name.to_lowercase())),
                },
                &mut *transaction,
            )
            .await?;
        }

        transaction.commit().await.context(CommitTransactionSnafu)?;
        info!(count = SAMPLE_ANIMALS.len(), "Seeded sample students");
        Ok(())
    }
}
