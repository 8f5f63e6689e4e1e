//! `{{< spoiler ["title"] >}}body{{< /spoiler >}}`: collapsible block.
//!
//! The body is separated by blank lines so Markdown inside it still renders.

use crate::definition::{BodyMode, Keyword, ShortcodeArgs, ShortcodeContext, ShortcodeDefinition};
use crate::escape::escape_html;

pub(super) fn definition() -> ShortcodeDefinition {
    ShortcodeDefinition::new(render)
        .with_positional(0, 1)
        .with_positional_slots(&["title"])
        .with_keyword(Keyword::with_default("title", "Spoiler"))
        .with_keyword(Keyword::optional("content"))
        .with_body(BodyMode::Optional)
}

fn render(args: &ShortcodeArgs, _ctx: &ShortcodeContext) -> Result<String, String> {
    let title = escape_html(args.get("title").unwrap_or_default());
    let content = args
        .body
        .as_deref()
        .or_else(|| args.get("content"))
        .unwrap_or_default()
        .trim();

    Ok(format!(
        "<details class=\"spoiler\">\n<summary>{title}</summary>\n\n{content}\n\n</details>"
    ))
}

#[cfg(test)]
mod tests {
    use crate::{Expander, ShortcodeRegistry};
    use pretty_assertions::assert_eq;

    fn expand(body: &str) -> String {
        let registry = ShortcodeRegistry::with_builtins(1);
        Expander::new(&registry).expand(body).unwrap().output
    }

    #[test]
    fn test_block_spoiler() {
        assert_eq!(
            expand("{{< spoiler \"Ending\" >}}\nThe **butler** did it.\n{{< /spoiler >}}"),
            "<details class=\"spoiler\">\n<summary>Ending</summary>\n\n\
             The **butler** did it.\n\n</details>"
        );
    }

    #[test]
    fn test_inline_spoiler_with_content() {
        let output = expand(r#"{{< spoiler content="hidden" >}}"#);
        assert!(output.contains("<summary>Spoiler</summary>"));
        assert!(output.contains("\n\nhidden\n\n"));
    }

    #[test]
    fn test_body_shortcodes_expanded() {
        let output = expand("{{< spoiler >}}{{< rating 10 >}}{{< /spoiler >}}");
        assert!(output.contains("★★★★★"));
    }
}
