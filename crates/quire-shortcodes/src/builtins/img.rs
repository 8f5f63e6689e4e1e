//! `{{< img src [alt] [caption=..] [width=..] [cls=..] >}}`: image, wrapped in
//! a `<figure>` when captioned.

use crate::definition::{Keyword, ShortcodeArgs, ShortcodeContext, ShortcodeDefinition};
use crate::escape::escape_html;

pub(super) fn definition() -> ShortcodeDefinition {
    ShortcodeDefinition::new(render)
        .with_positional(0, 2)
        .with_positional_slots(&["src", "alt"])
        .with_keyword(Keyword::required("src"))
        .with_keyword(Keyword::optional("alt"))
        .with_keyword(Keyword::optional("caption"))
        .with_keyword(Keyword::with_default("width", "100%"))
        .with_keyword(Keyword::optional("cls"))
}

fn render(args: &ShortcodeArgs, _ctx: &ShortcodeContext) -> Result<String, String> {
    let src = args.non_empty("src").ok_or("src cannot be empty")?;
    let alt = args.non_empty("alt").unwrap_or("Image");
    let width = args.get("width").unwrap_or_default();
    let cls = args.get("cls").unwrap_or_default();

    let img = format!(
        r#"<img src="{}" alt="{}" class="{}" style="max-width: {}; height: auto;" loading="lazy">"#,
        escape_html(src),
        escape_html(alt),
        escape_html(cls),
        escape_html(width)
    );

    Ok(match args.non_empty("caption") {
        Some(caption) => format!(
            "<figure>\n{img}\n<figcaption>{}</figcaption>\n</figure>",
            escape_html(caption)
        ),
        None => format!("<div class=\"image\">\n{img}\n</div>"),
    })
}
