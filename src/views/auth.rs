use maud::{html, Markup};

use crate::views::layout;

pub fn logout_page(signed_in_as: Option<&str>) -> Markup {
    layout::base(
        "Logout",
        signed_in_as,
        html! {
            div class="paper centered" {
                h2 { "Logout" }
                p { "Are you sure you want to log out?" }
                form method="post" action="/logout" {
                    button class="button" type="submit" { "Yes, Log Out" }
                }
            }
        },
    )
}

/// 註冊、驗證、登入這類只有幾個欄位的小表單
pub struct HelperForm<'a> {
    pub title: &'a str,
    pub action: &'a str,
    pub submit_label: &'a str,
    /// (name, type, placeholder, value)
    pub inputs: Vec<(&'a str, &'a str, &'a str, &'a str)>,
    pub message: Option<&'a str>,
}

pub fn helper_page(form: HelperForm<'_>, signed_in_as: Option<&str>) -> Markup {
    layout::base(
        form.title,
        signed_in_as,
        html! {
            div class="paper centered" {
                h2 { (form.title) }
                form class="helper-form" method="post" action=(form.action) {
                    @for (name, kind, placeholder, value) in &form.inputs {
                        input type=(kind) name=(name) placeholder=(placeholder) value=(value) required;
                    }
                    button class="button" type="submit" { (form.submit_label) }
                }
                p { (form.message.unwrap_or_default()) }
                (helper_links())
            }
        },
    )
}

pub fn message_page(title: &str, message: &str, signed_in_as: Option<&str>) -> Markup {
    layout::base(
        title,
        signed_in_as,
        html! {
            div class="paper centered" {
                h2 { (title) }
                p { (message) }
                (helper_links())
            }
        },
    )
}

fn helper_links() -> Markup {
    html! {
        p {
            a href="/signup" { "Sign Up" } " · "
            a href="/signup/confirm" { "Confirm" } " · "
            a href="/signin" { "Sign In" } " · "
            a href="/" { "Shifts" }
        }
    }
}
