//! `{{< related [limit] >}}`: list of items sharing tags with this one.

use crate::definition::{Keyword, ShortcodeArgs, ShortcodeContext, ShortcodeDefinition};
use crate::placeholder::Placeholder;

pub(super) fn definition() -> ShortcodeDefinition {
    ShortcodeDefinition::new(render)
        .with_positional(0, 1)
        .with_positional_slots(&["limit"])
        .with_keyword(Keyword::optional("limit"))
}

fn render(args: &ShortcodeArgs, _ctx: &ShortcodeContext) -> Result<String, String> {
    let limit = match args.get("limit") {
        Some(raw) => match raw.parse::<usize>() {
            Ok(n) if n > 0 => Some(n),
            _ => return Err(format!("limit must be a positive integer, got `{raw}`")),
        },
        None => None,
    };

    Ok(Placeholder::Related { limit }.to_html())
}
