use crate::{
    data::student::Student, error::PhotoRollResult, maud_conveniences::title,
    state::PhotoRollState,
};
use axum::extract::State;
use maud::{Markup, html};

pub async fn get_index_route(State(state): State<PhotoRollState>) -> PhotoRollResult<Markup> {
    let count = Student::count(&state).await?;
    let site_name = state.config().server_config().site_name.clone();

    Ok(state.render(html! {
        div class="bg-gray-800 p-8 rounded shadow-md max-w-md w-full" {
            (title(site_name))
            p class="mb-6 text-gray-300" {(count) " students on record."}

            div class="flex flex-row space-x-4 justify-center" {
                a href="/admin/student/" class="bg-slate-600 hover:bg-slate-800 font-bold py-2 px-4 rounded" {
                    "学生管理"
                }
            }
        }
    }))
}
