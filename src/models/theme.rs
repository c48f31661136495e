use crate::models::request::{SurpriseTheme, Theme, ThemeTab};

const DEFAULT_STYLE: &str = "a beautiful, creative style.";
const RANDOM_THEME: &str = "a completely random and surprising theme.";

/// Composes the theme sentence sent to the backend, which does the real
/// prompt engineering on top of it.
pub fn theme_prompt(theme: &Theme) -> String {
    let text = theme.text_prompt.trim();

    match theme.effective_tab() {
        ThemeTab::Image if theme.inspiration_count() > 0 => {
            if text.is_empty() {
                "A style inspired by the uploaded images.".to_string()
            } else {
                format!(
                    "A style inspired by the uploaded images, with a focus on: \"{}\"",
                    text
                )
            }
        }
        ThemeTab::Surprise if SurpriseTheme::is_selected(theme.surprise_theme) => {
            match theme.surprise_theme {
                Some(preset) if preset != SurpriseTheme::TrulyRandom => {
                    format!("a {} theme.", preset)
                }
                _ => RANDOM_THEME.to_string(),
            }
        }
        _ if !text.is_empty() => text.to_string(),
        _ => DEFAULT_STYLE.to_string(),
    }
}
