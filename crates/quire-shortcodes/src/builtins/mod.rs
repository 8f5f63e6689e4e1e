//! Built-in shortcodes.
//!
//! | name | shape | output |
//! |---|---|---|
//! | `link` | `{{< link "shortname" ["text"] >}}` | deferred internal link |
//! | `related` | `{{< related [limit] >}}` | deferred related-content list |
//! | `rating` | `{{< rating score [max] >}}` | five-star rating |
//! | `youtube` | `{{< youtube id [title=..] [autoplay=..] >}}` | responsive embed |
//! | `img` | `{{< img src [alt] [caption=..] [width=..] [cls=..] >}}` | image or figure |
//! | `spoiler` | `{{< spoiler ["title"] >}}body{{< /spoiler >}}` | collapsible block |
//! | `email` | `{{< email address ["text"] >}}` | script-obfuscated mailto link |
//! | `soundcloud` | `{{< soundcloud id-or-url [visual=..] [title=..] >}}` | player embed |

mod email;
mod img;
mod link;
mod rating;
mod related;
mod soundcloud;
mod spoiler;
mod youtube;

use crate::definition::ShortcodeDefinition;

/// Every built-in shortcode with its name.
pub(crate) fn all() -> Vec<(&'static str, ShortcodeDefinition)> {
    vec![
        ("email", email::definition()),
        ("img", img::definition()),
        ("link", link::definition()),
        ("rating", rating::definition()),
        ("related", related::definition()),
        ("soundcloud", soundcloud::definition()),
        ("spoiler", spoiler::definition()),
        ("youtube", youtube::definition()),
    ]
}

/// Interpret a shortcode flag value (`true`, `yes`, `1`).
fn is_truthy(value: &str) -> bool {
    matches!(value.to_ascii_lowercase().as_str(), "true" | "yes" | "1")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_truthy() {
        assert!(is_truthy("true"));
        assert!(is_truthy("TRUE"));
        assert!(is_truthy("1"));
        assert!(!is_truthy("false"));
        assert!(!is_truthy(""));
    }
}
