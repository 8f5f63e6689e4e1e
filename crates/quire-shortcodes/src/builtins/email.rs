//! `{{< email address ["text"] >}}`: mailto link assembled by script.
//!
//! The address never appears in the page source as text: the whole anchor is
//! emitted as UTF-16 char codes. The element id is derived from the
//! invocation, so identical input renders identical output.

use sha2::{Digest, Sha256};

use crate::definition::{Keyword, ShortcodeArgs, ShortcodeContext, ShortcodeDefinition};
use crate::escape::escape_html;

pub(super) fn definition() -> ShortcodeDefinition {
    ShortcodeDefinition::new(render)
        .with_positional(0, 2)
        .with_positional_slots(&["address", "text"])
        .with_keyword(Keyword::required("address"))
        .with_keyword(Keyword::optional("text"))
}

fn render(args: &ShortcodeArgs, ctx: &ShortcodeContext) -> Result<String, String> {
    let address = args.non_empty("address").ok_or("address cannot be empty")?;
    if !address.contains('@') {
        return Err(format!("`{address}` is not an email address"));
    }
    let text = args.non_empty("text").unwrap_or(address);

    let uid = element_id(address, text, ctx.offset);
    let anchor = format!(
        r#"<a href="mailto:{}">{}</a>"#,
        escape_html(address),
        escape_html(text)
    );

    // Script body must stay free of Markdown-significant characters and quotes.
    Ok(format!(
        "<span id=\"mail-{uid}\"></span><script>(function(){{var e=document.getElementById({});e.innerHTML={};}})();</script><noscript>(Enable JavaScript to view email)</noscript>",
        char_codes(&format!("mail-{uid}")),
        char_codes(&anchor)
    ))
}

/// Eight hex characters identifying this invocation.
fn element_id(address: &str, text: &str, offset: usize) -> String {
    let mut hasher = Sha256::new();
    hasher.update(address.as_bytes());
    hasher.update([0u8]);
    hasher.update(text.as_bytes());
    hasher.update([0u8]);
    hasher.update(offset.to_le_bytes());
    let digest = hex::encode(hasher.finalize());
    digest[..8].to_owned()
}

/// JavaScript expression evaluating to `s`.
fn char_codes(s: &str) -> String {
    let codes: Vec<String> = s.encode_utf16().map(|unit| unit.to_string()).collect();
    format!("String.fromCharCode({})", codes.join(","))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ExpandError, Expander, ShortcodeRegistry};

    fn expand(body: &str) -> Result<String, ExpandError> {
        let registry = ShortcodeRegistry::with_builtins(1);
        Expander::new(&registry).expand(body).map(|e| e.output)
    }

    #[test]
    fn test_char_codes() {
        assert_eq!(char_codes("Hi"), "String.fromCharCode(72,105)");
    }

    #[test]
    fn test_address_not_in_source() {
        let output = expand(r#"{{< email "me@example.com" >}}"#).unwrap();
        assert!(!output.contains("me@example.com"));
        assert!(!output.contains("example"));
        assert!(output.starts_with("<span id=\"mail-"));
        assert!(output.contains("<noscript>"));
    }

    #[test]
    fn test_deterministic() {
        let body = r#"{{< email "me@example.com" "Mail me" >}}"#;
        assert_eq!(expand(body).unwrap(), expand(body).unwrap());
    }

    #[test]
    fn test_distinct_ids_per_invocation() {
        let output = expand(r#"{{< email "a@x.org" >}} {{< email "a@x.org" >}}"#).unwrap();
        let ids: Vec<&str> = output
            .match_indices("<span id=\"mail-")
            .map(|(i, _)| &output[i + 15..i + 23])
            .collect();
        assert_eq!(ids.len(), 2);
        assert_ne!(ids[0], ids[1]);
    }

    #[test]
    fn test_script_has_no_quotes() {
        let output = expand(r#"{{< email "me@example.com" >}}"#).unwrap();
        let start = output.find("<script>").unwrap();
        let end = output.find("</script>").unwrap();
        let script = &output[start + 8..end];
        assert!(!script.contains('"'));
        assert!(!script.contains('\''));
        assert!(!script.contains('<'));
    }

    #[test]
    fn test_rejects_non_address() {
        let err = expand(r#"{{< email "nobody" >}}"#).unwrap_err();
        assert!(matches!(err, ExpandError::Render { .. }));
    }
}
