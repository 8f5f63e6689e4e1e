//! Content fingerprints for the render cache.

use quire_content::ContentItem;
use quire_shortcodes::{ShortcodeRegistry, scan_invocations};
use sha2::{Digest, Sha256};

/// Compute the render cache key of `item`.
///
/// SHA-256 over the registry version, the name and version of every
/// shortcode the body invokes, the frontmatter serialized as JSON with sorted
/// keys, and the raw body. Unknown shortcode names contribute nothing; the
/// expansion fails for them anyway.
#[must_use]
pub fn fingerprint(item: &ContentItem, registry: &ShortcodeRegistry) -> String {
    let invoked = scan_invocations(&item.raw_body);
    let signature = registry.signature(invoked.iter().map(String::as_str));
    let frontmatter = serde_json::to_string(&item.frontmatter).unwrap_or_default();

    let mut hasher = Sha256::new();
    hasher.update(registry.version().to_le_bytes());
    for (name, version) in &signature {
        hasher.update(name.as_bytes());
        hasher.update(b":");
        hasher.update(version.to_le_bytes());
        hasher.update(b";");
    }
    hasher.update([0u8]);
    hasher.update(frontmatter.as_bytes());
    hasher.update([0u8]);
    hasher.update(item.raw_body.as_bytes());
    hex::encode(hasher.finalize())
}
