//! `{{< link "shortname" ["text"] >}}`: internal link by shortname.
//!
//! The target is unknown until every item is loaded, so the first pass only
//! records a placeholder.

use crate::definition::{Keyword, ShortcodeArgs, ShortcodeContext, ShortcodeDefinition};
use crate::placeholder::Placeholder;

pub(super) fn definition() -> ShortcodeDefinition {
    ShortcodeDefinition::new(render)
        .with_positional(0, 2)
        .with_positional_slots(&["shortname", "text"])
        .with_keyword(Keyword::required("shortname"))
        .with_keyword(Keyword::optional("text"))
}

fn render(args: &ShortcodeArgs, _ctx: &ShortcodeContext) -> Result<String, String> {
    let shortname = args
        .non_empty("shortname")
        .ok_or("shortname cannot be empty")?
        .trim();

    Ok(Placeholder::Link {
        shortname: shortname.to_owned(),
        text: args.non_empty("text").map(str::to_owned),
    }
    .to_html())
}
