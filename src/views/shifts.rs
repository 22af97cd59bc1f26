use maud::{html, Markup};

use crate::{
    services::{
        desk::ShiftDesk,
        form::ShiftForm,
        table::{ShiftRow, COLUMNS},
    },
    structs::{
        shifts::{Gender, MapStaff, Status},
        ui::Snackbar,
    },
    utils::url::encode_segment,
    views::layout,
};

pub fn page(desk: &ShiftDesk, snackbar: Option<&Snackbar>, rows: &[ShiftRow], signed_in_as: Option<&str>) -> Markup {
    layout::base(
        "Shift Management",
        signed_in_as,
        html! {
            div class="toolbar" {
                form class="inline" method="post" action="/form/toggle" {
                    button class="button" type="submit" {
                        @if desk.is_form_visible() { "Hide Form" } @else { "Add Shift" }
                    }
                }
                form class="inline" method="post" action="/refresh" {
                    button class="button button-secondary" type="submit" { "Refresh" }
                }
            }
            @if desk.is_form_visible() {
                (shift_form(desk.form()))
            }
            (shift_table(rows))
            @if desk.is_dialog_open() {
                (delete_dialog())
            }
            (layout::snackbar(snackbar))
        },
    )
}

fn text_field(form: &ShiftForm, name: &str, label: &str, kind: &str, value: &str, required: bool, wide: bool) -> Markup {
    html! {
        label class=[wide.then_some("wide")] {
            (label)
            input type=(kind) name=(name) value=(value) required[required] aria-label=(label);
            @if let Some(error) = form.error_for(name) {
                span class="error" { (error) }
            }
        }
    }
}

fn select_field<'a>(
    form: &ShiftForm,
    name: &str,
    label: &str,
    value: &str,
    options: impl IntoIterator<Item = (&'a str, &'a str)>,
    required: bool,
) -> Markup {
    let options: Vec<(&str, &str)> = options.into_iter().collect();
    // 舊資料的非正式值也要列出，否則送出時會被第一個選項蓋掉
    let unlisted = !value.is_empty() && !options.iter().any(|(option_value, _)| *option_value == value);

    html! {
        label {
            (label)
            select name=(name) required[required] aria-label=(label) {
                @if required {
                    option value="" selected[value.is_empty()] disabled { "Select…" }
                }
                @for (option_value, option_label) in &options {
                    option value=(option_value) selected[*option_value == value] { (option_label) }
                }
                @if unlisted {
                    option value=(value) selected { (value) }
                }
            }
            @if let Some(error) = form.error_for(name) {
                span class="error" { (error) }
            }
        }
    }
}

pub fn shift_form(form: &ShiftForm) -> Markup {
    let values = form.values();
    let submit_class = if form.is_editing() {
        "button submit button-secondary"
    } else {
        "button submit"
    };

    html! {
        section class="paper shift-form" {
            h2 { (form.title()) }
            form method="post" action="/shifts" {
                div class="fields" {
                    (text_field(form, "location", "Location", "text", &values.location, true, true))
                    (text_field(form, "date", "Date", "date", &values.date, true, false))
                    (text_field(form, "start_time", "Start Time", "time", &values.start_time, true, false))
                    (text_field(form, "end_time", "End Time", "time", &values.end_time, true, false))
                    (select_field(
                        form,
                        "map_staff",
                        "Map Staff",
                        &values.map_staff,
                        MapStaff::ALL.iter().map(|option| (option.as_str(), option.as_str())),
                        false,
                    ))
                    (select_field(
                        form,
                        "gender",
                        "Gender",
                        &values.gender,
                        Gender::OPTIONS.iter().map(|option| (option.as_str(), option.label())),
                        false,
                    ))
                    (text_field(form, "message", "Original Message", "text", &values.message, false, true))
                    (text_field(form, "coordinator", "Coordinator", "text", &values.coordinator, false, false))
                    (text_field(form, "assigned", "Assigned To", "text", &values.assigned, false, false))
                    (select_field(
                        form,
                        "status",
                        "Status",
                        &values.status,
                        Status::OPTIONS.iter().map(|option| (option.as_str(), option.as_str())),
                        true,
                    ))
                }
                button class=(submit_class) type="submit" {
                    (form.submit_label())
                }
            }
        }
    }
}

pub fn shift_table(rows: &[ShiftRow]) -> Markup {
    html! {
        div class="paper" {
            table class="shifts" {
                thead {
                    tr {
                        @for column in COLUMNS {
                            th { (column) }
                        }
                    }
                }
                tbody {
                    @for row in rows {
                        tr class=[row.pending.then_some("pending")] {
                            td { (row.number) }
                            td { (row.location) }
                            td { (row.date) }
                            td { (row.start_time) }
                            td { (row.end_time) }
                            td { (row.map_staff) }
                            td { (row.gender) }
                            td { (row.message) }
                            td { (row.date_received) }
                            td { (row.time_received) }
                            td { (row.coordinator) }
                            td { (row.assigned) }
                            td { (row.status) }
                            td {
                                @if row.pending {
                                    "Saving…"
                                } @else {
                                    form class="inline" method="post" action={ "/shifts/" (encode_segment(row.id.as_str())) "/edit" } {
                                        button class="button button-text" type="submit" title="Edit" { "Edit" }
                                    }
                                    form class="inline" method="post" action={ "/shifts/" (encode_segment(row.id.as_str())) "/delete" } {
                                        button class="button button-danger" type="submit" title="Delete" { "Delete" }
                                    }
                                }
                            }
                        }
                    }
                }
            }
        }
    }
}

fn delete_dialog() -> Markup {
    html! {
        div class="dialog-backdrop" {
            div class="dialog" role="dialog" aria-labelledby="delete-title" {
                h3 id="delete-title" { "Confirm Delete" }
                p { "Are you sure you want to delete this shift?" }
                div class="dialog-actions" {
                    form class="inline" method="post" action="/delete/cancel" {
                        button class="button button-text" type="submit" { "Cancel" }
                    }
                    form class="inline" method="post" action="/delete/confirm" {
                        button class="button button-secondary" type="submit" autofocus { "OK" }
                    }
                }
            }
        }
    }
}
