//! Pager links.

use serde::{Deserialize, Serialize};

use crate::grid::PageState;

/// Pager display styles.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum PagerStyle {
    /// Prev, page numbers, Next.
    #[default]
    Full,
    /// Prev/Next only.
    Mini,
}

/// One pager entry.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct PagerLink {
    pub label: String,
    /// `None` for the current page and disabled ends.
    pub href: Option<String>,
    pub class: &'static str,
}

/// Builds pager links carrying `page` (one-based) and `per-page`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Pager {
    #[serde(default)]
    pub style: PagerStyle,

    /// Page buttons shown around the current page.
    #[serde(default = "default_max_buttons")]
    pub max_buttons: u32,
}

fn default_max_buttons() -> u32 {
    10
}

impl Default for Pager {
    fn default() -> Self {
        Self {
            style: PagerStyle::Full,
            max_buttons: default_max_buttons(),
        }
    }
}

impl Pager {
    /// Links for a page state; empty when everything fits on one page.
    pub fn links(&self, state: &PageState) -> Vec<PagerLink> {
        if state.page_count <= 1 {
            return Vec::new();
        }

        let href = |page: u32| format!("?page={}&per-page={}", page + 1, state.page_size);
        let mut links = Vec::new();

        links.push(PagerLink {
            label: "«".to_string(),
            href: state.has_prev().then(|| href(state.page - 1)),
            class: if state.has_prev() { "prev" } else { "prev disabled" },
        });

        if self.style == PagerStyle::Full {
            let (first, last) = self.button_range(state);
            for page in first..=last {
                let current = page == state.page;
                links.push(PagerLink {
                    label: (page + 1).to_string(),
                    href: (!current).then(|| href(page)),
                    class: if current { "active" } else { "" },
                });
            }
        }

        links.push(PagerLink {
            label: "»".to_string(),
            href: state.has_next().then(|| href(state.page + 1)),
            class: if state.has_next() { "next" } else { "next disabled" },
        });

        links
    }

    /// Zero-based inclusive range of page buttons, centered on the current
    /// page where possible.
    fn button_range(&self, state: &PageState) -> (u32, u32) {
        let buttons = self.max_buttons.max(1).min(state.page_count);
        let first = state
            .page
            .saturating_sub(buttons / 2)
            .min(state.page_count - buttons);
        (first, first + buttons - 1)
    }
}
