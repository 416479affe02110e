//! Report categories, sub-reasons and the numbered menus built from them.
//!
//! Both dialogues present the same five top-level categories. Reporters and
//! moderators see slightly different sub-reason menus for verbal abuse: users
//! name the group targeted by hate speech, moderators only need to know that
//! it is hate speech.

mod model;

pub use model::{
    Category, CategoryFlags, FraudKind, HarassmentKind, HateTarget, ReportReason, SensitiveKind,
    VerbalAbuseKind, select,
};

use std::fmt::Write;

/// Renders `header` followed by `(n) label` lines, one per option.
#[must_use]
pub fn numbered_menu<'a>(header: &str, labels: impl IntoIterator<Item = &'a str>) -> String {
    let mut menu = String::from(header);
    for (i, label) in labels.into_iter().enumerate() {
        let _ = write!(menu, "\n({}) {label}", i + 1);
    }
    menu.push('\n');
    menu
}

/// The five top-level categories as a numbered list.
#[must_use]
pub fn category_menu(header: &str) -> String {
    numbered_menu(header, Category::ALL.iter().map(|c| c.label()))
}
