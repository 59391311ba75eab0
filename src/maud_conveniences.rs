use crate::uploads::thumbnail_name;
use maud::{Markup, Render, html};

pub fn render_table<const N: usize>(titles: [Markup; N], items: Vec<[Markup; N]>) -> Markup {
    html! {
        div class="overflow-x-auto" {
            table class="min-w-full bg-gray-800 rounded shadow-md" {
                thead class="bg-gray-700" {
                    tr {
                        @for title in titles {
                            th class="py-2 px-4 text-left font-semibold text-gray-300" {(title)}
                        }
                    }
                }
                tbody {
                    @for row in items {
                        tr {
                            @for col in row {
                                td class="py-2 px-4 border-b border-gray-600 text-gray-200" {(col)}
                            }
                        }
                    }
                }
            }
        }
    }
}

pub fn render_nav(site_name: &str) -> Markup {
    html! {
        nav class="w-full bg-gray-800 shadow-md mb-8" {
            div class="container mx-auto flex flex-row items-center space-x-6 px-4 py-3" {
                a href="/admin/" class="text-xl font-semibold" {(site_name)}
                a href="/admin/student/" class="text-gray-300 hover:text-white" {"学生管理"}
            }
        }
    }
}

pub fn title(s: impl Render) -> Markup {
    html! {
        h1 class="text-2xl font-semibold mb-4" {(s)}
    }
}

///the list view's photo column: the thumbnail if there's a photo, nothing if not
pub fn photo_cell(photo_path: Option<&str>) -> Markup {
    html! {
        @if let Some(photo_path) = photo_path.filter(|p| !p.is_empty()) {
            img src={"/files/" (thumbnail_name(photo_path))};
        }
    }
}

pub fn form_element(id: &'static str, label: &'static str, element: Markup) -> Markup {
    html! {
        div class="mb-4" {
            label for=(id) class="block text-gray-300 text-sm font-bold mb-2" {(label)}
            (element)
        }
    }
}

pub fn simple_form_element(
    id: &'static str,
    label: &'static str,
    required: bool,
    ty: Option<&'static str>,
    value: Option<&str>,
) -> Markup {
    form_element(
        id,
        label,
        html! {
            input required[required] type=(ty.unwrap_or("text")) id=(id) name=(id) value=[value] class="shadow appearance-none border rounded w-full py-2 px-3 leading-tight focus:outline-none focus:shadow-outline bg-gray-700 border-gray-600";
        },
    )
}

pub fn form_submit_button(text: Option<&str>) -> Markup {
    html! {
        div class="flex items-center justify-between" {
            button type="submit" class="bg-blue-500 hover:bg-blue-700 font-bold py-2 px-4 rounded focus:outline-none focus:shadow-outline" {
                (text.unwrap_or("Save"))
            }
        }
    }
}

pub fn alert(kind: AlertKind, message: impl Render) -> Markup {
    let classes = match kind {
        AlertKind::Success => "bg-green-100 border border-green-400 text-green-700 px-4 py-3 rounded relative mb-4",
        AlertKind::Error => "bg-red-100 border border-red-400 text-red-700 px-4 py-3 rounded relative mb-4",
    };

    html! {
        div class=(classes) role="alert" {
            span {(message)}
        }
    }
}

#[derive(Copy, Clone, Debug)]
pub enum AlertKind {
    Success,
    Error,
}
