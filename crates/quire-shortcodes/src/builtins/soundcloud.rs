//! `{{< soundcloud id-or-url [visual=..] [title=..] >}}`: SoundCloud player.
//!
//! Numeric ids point at the track API; page URLs are handed to the widget,
//! which resolves them client-side.

use percent_encoding::{NON_ALPHANUMERIC, utf8_percent_encode};

use super::is_truthy;
use crate::definition::{Keyword, ShortcodeArgs, ShortcodeContext, ShortcodeDefinition};
use crate::escape::escape_html;

pub(super) fn definition() -> ShortcodeDefinition {
    ShortcodeDefinition::new(render)
        .with_positional(0, 1)
        .with_positional_slots(&["id_or_url"])
        .with_keyword(Keyword::required("id_or_url"))
        .with_keyword(Keyword::with_default("visual", "true"))
        .with_keyword(Keyword::with_default("title", "SoundCloud Player"))
}

fn render(args: &ShortcodeArgs, _ctx: &ShortcodeContext) -> Result<String, String> {
    let target = args.get("id_or_url").unwrap_or_default().trim();
    let url_param = widget_url(target)?;
    let visual = is_truthy(args.get("visual").unwrap_or_default());
    let title = escape_html(args.get("title").unwrap_or_default());

    Ok(format!(
        r#"<div class="soundcloud-embed">
<iframe width="100%" height="166" scrolling="no" frameborder="no" allow="autoplay" src="https://w.soundcloud.com/player/?url={url_param}&amp;color=%23ff5500&amp;auto_play=false&amp;hide_related=false&amp;show_comments=true&amp;show_user=true&amp;show_reposts=false&amp;show_teaser=true&amp;visual={visual}" title="{title}"></iframe>
</div>"#
    ))
}

/// Value of the widget's `url` query parameter.
fn widget_url(target: &str) -> Result<String, String> {
    if target.starts_with("https://") || target.starts_with("http://") {
        return Ok(utf8_percent_encode(target, NON_ALPHANUMERIC).to_string());
    }
    if !target.is_empty() && target.chars().all(|c| c.is_ascii_digit()) {
        return Ok(format!("https%3A//api.soundcloud.com/tracks/{target}"));
    }
    Err(format!(
        "expected a numeric track id or an http(s) URL, got `{target}`"
    ))
}
