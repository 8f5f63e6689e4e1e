//! `{{< rating score [max] >}}`: a score rendered on a five-star scale.

use crate::definition::{Keyword, ShortcodeArgs, ShortcodeContext, ShortcodeDefinition};
use crate::escape::escape_html;

pub(super) fn definition() -> ShortcodeDefinition {
    ShortcodeDefinition::new(render)
        .with_positional(0, 2)
        .with_positional_slots(&["score", "max"])
        .with_keyword(Keyword::required("score"))
        .with_keyword(Keyword::with_default("max", "10"))
}

fn render(args: &ShortcodeArgs, _ctx: &ShortcodeContext) -> Result<String, String> {
    let score_raw = args.get("score").unwrap_or_default();
    let max_raw = args.get("max").unwrap_or_default();

    let score = parse_number(score_raw)?;
    let max = parse_number(max_raw)?;
    if max <= 0.0 {
        return Err(format!("max must be positive, got `{max_raw}`"));
    }

    Ok(format!(
        r#"<span class="review-stars" title="{}/{}">{}</span>"#,
        escape_html(score_raw),
        escape_html(max_raw),
        star_string(score, max)
    ))
}

fn parse_number(raw: &str) -> Result<f64, String> {
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
        .ok_or_else(|| format!("invalid rating value `{raw}`"))
}

/// Render `value` out of `max` as five stars: full, at most one half, empty.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn star_string(value: f64, max: f64) -> String {
    let normalized = (value / max * 5.0).clamp(0.0, 5.0);
    let full = normalized.floor();
    let half = normalized - full >= 0.5;
    let full = full as usize;
    let empty = 5 - full - usize::from(half);

    let mut stars = "★".repeat(full);
    if half {
        stars.push('⯨');
    }
    stars.push_str(&"☆".repeat(empty));
    stars
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ExpandError, Expander, ShortcodeRegistry};
    use pretty_assertions::assert_eq;

    #[test]
    fn test_star_string() {
        assert_eq!(star_string(10.0, 10.0), "★★★★★");
        assert_eq!(star_string(9.0, 10.0), "★★★★⯨");
        assert_eq!(star_string(7.0, 10.0), "★★★⯨☆");
        assert_eq!(star_string(4.0, 5.0), "★★★★☆");
        assert_eq!(star_string(0.0, 10.0), "☆☆☆☆☆");
    }

    #[test]
    fn test_star_string_clamped() {
        assert_eq!(star_string(15.0, 10.0), "★★★★★");
        assert_eq!(star_string(-3.0, 10.0), "☆☆☆☆☆");
    }

    #[test]
    fn test_rating_shortcode() {
        let registry = ShortcodeRegistry::with_builtins(1);
        let output = Expander::new(&registry)
            .expand("{{< rating 4 5 >}}")
            .unwrap()
            .output;
        assert_eq!(
            output,
            r#"<span class="review-stars" title="4/5">★★★★☆</span>"#
        );
    }

    #[test]
    fn test_rating_default_max() {
        let registry = ShortcodeRegistry::with_builtins(1);
        let output = Expander::new(&registry)
            .expand("{{< rating 9.5 >}}")
            .unwrap()
            .output;
        assert!(output.contains(r#"title="9.5/10""#));
    }

    #[test]
    fn test_rating_invalid_score() {
        let registry = ShortcodeRegistry::with_builtins(1);
        let err = Expander::new(&registry)
            .expand("{{< rating great >}}")
            .unwrap_err();
        assert!(matches!(err, ExpandError::Render { .. }));
    }

    #[test]
    fn test_rating_zero_max() {
        let registry = ShortcodeRegistry::with_builtins(1);
        assert!(Expander::new(&registry).expand("{{< rating 3 0 >}}").is_err());
    }
}
