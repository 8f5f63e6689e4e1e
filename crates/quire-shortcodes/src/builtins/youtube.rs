//! `{{< youtube id [title=..] [autoplay=..] >}}`: responsive video embed.

use super::is_truthy;
use crate::definition::{Keyword, ShortcodeArgs, ShortcodeContext, ShortcodeDefinition};
use crate::escape::escape_html;

pub(super) fn definition() -> ShortcodeDefinition {
    ShortcodeDefinition::new(render)
        .with_positional(0, 1)
        .with_positional_slots(&["id"])
        .with_keyword(Keyword::required("id"))
        .with_keyword(Keyword::with_default("title", "YouTube Video"))
        .with_keyword(Keyword::with_default("autoplay", "false"))
}

fn render(args: &ShortcodeArgs, _ctx: &ShortcodeContext) -> Result<String, String> {
    let id = args.get("id").unwrap_or_default();
    if id.is_empty()
        || !id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        return Err(format!("invalid video id `{id}`"));
    }
    let autoplay = u8::from(is_truthy(args.get("autoplay").unwrap_or_default()));
    let title = escape_html(args.get("title").unwrap_or_default());

    Ok(format!(
        r#"<div class="video-embed" style="position: relative; padding-bottom: 56.25%; height: 0; overflow: hidden; max-width: 100%;">
<iframe src="https://www.youtube.com/embed/{id}?autoplay={autoplay}" title="{title}" style="position: absolute; top: 0; left: 0; width: 100%; height: 100%; border: 0;" allow="accelerometer; autoplay; clipboard-write; encrypted-media; gyroscope; picture-in-picture" allowfullscreen loading="lazy"></iframe>
</div>"#
    ))
}

#[cfg(test)]
mod tests {
    use crate::{ExpandError, Expander, ShortcodeRegistry};

    fn expand(body: &str) -> Result<String, ExpandError> {
        let registry = ShortcodeRegistry::with_builtins(1);
        Expander::new(&registry).expand(body).map(|e| e.output)
    }

    #[test]
    fn test_positional_and_keyword_id_match() {
        assert_eq!(
            expand(r#"{{< youtube "dQw4w9WgXcQ" >}}"#).unwrap(),
            expand(r#"{{< youtube id="dQw4w9WgXcQ" >}}"#).unwrap()
        );
    }

    #[test]
    fn test_embed_url_and_title() {
        let output = expand(r#"{{< youtube X1 title="A <b>talk</b>" autoplay=true >}}"#).unwrap();
        assert!(output.contains("https://www.youtube.com/embed/X1?autoplay=1"));
        assert!(output.contains(r#"title="A &lt;b&gt;talk&lt;/b&gt;""#));
    }

    #[test]
    fn test_rejects_suspicious_id() {
        let err = expand(r#"{{< youtube "x\" onload=\"alert(1)" >}}"#).unwrap_err();
        assert!(matches!(err, ExpandError::Render { .. }));
    }

    #[test]
    fn test_missing_id() {
        let err = expand("{{< youtube >}}").unwrap_err();
        assert!(matches!(err, ExpandError::ArgumentCount { .. }));
    }
}
