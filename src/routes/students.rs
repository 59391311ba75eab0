use crate::{
    data::{
        IntIdForm,
        student::{ListQuery, PAGE_SIZE, SortColumn, Student},
    },
    error::PhotoRollResult,
    maud_conveniences::{AlertKind, alert, photo_cell, render_table, title},
    state::PhotoRollState,
};
use axum::extract::{Query, State};
use maud::{Markup, Render, html};
use serde::Deserialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Notice {
    Created,
    Saved,
}

impl Render for Notice {
    fn render(&self) -> Markup {
        alert(
            AlertKind::Success,
            match self {
                Self::Created => "Record was successfully created.",
                Self::Saved => "Record was successfully saved.",
            },
        )
    }
}

impl Notice {
    pub fn from_query_value(value: &str) -> Option<Self> {
        match value {
            "created" => Some(Self::Created),
            "saved" => Some(Self::Saved),
            _ => None,
        }
    }
}

///stale or hand-edited notices are ignored rather than failing the page
#[derive(Deserialize, Debug, Default)]
pub struct NoticeQuery {
    #[serde(default)]
    pub notice: Option<String>,
}

impl NoticeQuery {
    pub fn notice(&self) -> Option<Notice> {
        self.notice.as_deref().and_then(Notice::from_query_value)
    }
}

pub async fn get_students(
    State(state): State<PhotoRollState>,
    Query(list): Query<ListQuery>,
    Query(notice_query): Query<NoticeQuery>,
) -> PhotoRollResult<Markup> {
    let notice = notice_query.notice();
    let table = student_table(&state, list).await?;

    Ok(state.render(html! {
        div class="mx-auto bg-gray-800 p-8 rounded shadow-md max-w-4xl w-full flex flex-col space-y-4" {
            @if let Some(notice) = notice {
                (notice)
            }
            div sse-connect="/sse_feed" {
                (table)
            }
        }
    }))
}

pub async fn internal_get_students(
    State(state): State<PhotoRollState>,
    Query(list): Query<ListQuery>,
) -> PhotoRollResult<Markup> {
    student_table(&state, list).await
}

pub async fn delete_student(
    State(state): State<PhotoRollState>,
    Query(IntIdForm { id }): Query<IntIdForm>,
) -> PhotoRollResult<Markup> {
    state.delete_student(id).await?;
    Ok(html! {})
}

fn sort_header(list: ListQuery, column: SortColumn, label: &'static str) -> Markup {
    let arrow = match (list.sort == column, list.desc) {
        (true, false) => " ▲",
        (true, true) => " ▼",
        (false, _) => "",
    };

    html! {
        a href={"/admin/student/?" (list.sorted_by(column).to_query_string())} class="hover:text-white underline" {
            (label) (arrow)
        }
    }
}

async fn student_table(state: &PhotoRollState, list: ListQuery) -> PhotoRollResult<Markup> {
    let count = Student::count(state).await?;
    let students = Student::get_page(list, state).await?;
    let pages = count.div_ceil(PAGE_SIZE).max(1);

    let rows = students
        .into_iter()
        .map(|student| {
            [
                html! {
                    div class="flex flex-row space-x-2" {
                        a href={"/admin/student/edit?id=" (student.id)} class="bg-blue-600 hover:bg-blue-800 font-bold py-1 px-2 rounded" {"Edit"}
                        button hx-delete={"/admin/student?id=" (student.id)} hx-confirm="Are you sure you want to delete this record?" hx-target="closest tr" hx-swap="outerHTML" class="bg-red-600 hover:bg-red-800 font-bold py-1 px-2 rounded" {
                            "Delete"
                        }
                    }
                },
                html! {(student.display_name())},
                photo_cell(student.photo_path()),
            ]
        })
        .collect();

    Ok(html! {
        div id="students" hx-get={"/internal/students?" (list.to_query_string())} hx-trigger="sse:crud_student" hx-swap="outerHTML" {
            div class="flex flex-row items-center justify-between" {
                (title(html! {"List (" (count) ")"}))
                a href="/admin/student/new" class="bg-blue-600 hover:bg-blue-800 font-bold py-2 px-4 rounded" {"Create"}
            }

            (render_table(
                [
                    html! {},
                    sort_header(list, SortColumn::Name, "Name"),
                    sort_header(list, SortColumn::PhotoPath, "Photo"),
                ],
                rows,
            ))

            div class="flex flex-row items-center justify-center space-x-4 mt-4" {
                @if list.page > 0 {
                    a href={"/admin/student/?" (list.on_page(list.page - 1).to_query_string())} class="underline" {"« Prev"}
                }
                span class="text-gray-400" {"Page " (list.page.saturating_add(1)) " of " (pages)}
                @if list.page.saturating_add(1) < pages {
                    a href={"/admin/student/?" (list.on_page(list.page + 1).to_query_string())} class="underline" {"Next »"}
                }
            }
        }
    })
}
