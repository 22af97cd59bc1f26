use maud::{html, Markup, DOCTYPE};

use crate::structs::ui::Snackbar;

/// 共用的頁面外框
pub fn base(title: &str, signed_in_as: Option<&str>, content: Markup) -> Markup {
    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="utf-8";
                meta name="viewport" content="width=device-width, initial-scale=1";
                title { (title) }
                link rel="stylesheet" href="/assets/site.css";
            }
            body {
                header class="app-bar" {
                    a class="brand" href="/" { "Shift Management" }
                    @if let Some(name) = signed_in_as {
                        span class="user" { (name) }
                        a class="button button-outline" href="/logout" { "Log Out" }
                    }
                }
                main class="container" {
                    (content)
                }
            }
        }
    }
}

/// 右下角提示，CSS 動畫在 3 秒後淡出
pub fn snackbar(snackbar: Option<&Snackbar>) -> Markup {
    html! {
        @if let Some(snackbar) = snackbar {
            div class={ "snackbar snackbar-" (snackbar.severity.as_str()) } role="alert" {
                (snackbar.message)
            }
        }
    }
}

pub fn not_found() -> Markup {
    base(
        "404 Not Found",
        None,
        html! {
            div class="paper centered" {
                h1 { "404" }
                p { "Page not found" }
                a href="/" { "Go back home" }
            }
        },
    )
}
