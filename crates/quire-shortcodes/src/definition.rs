//! Shortcode definitions: the contract every plugin satisfies.

use std::collections::BTreeMap;
use std::fmt;

/// Render function signature.
///
/// Receives the validated arguments (defaults applied) and returns an HTML
/// fragment, or a message explaining why the arguments were rejected.
pub type RenderFn = dyn Fn(&ShortcodeArgs, &ShortcodeContext) -> Result<String, String> + Send + Sync;

/// Whether a shortcode takes a body between an opener and a closer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BodyMode {
    /// Always inline; a closer for this name is a stray closer.
    #[default]
    Forbidden,
    /// Always a block; a missing closer is an error.
    Required,
    /// Block when a closer follows before the next opener of the same name.
    Optional,
}

/// A keyword argument a shortcode accepts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Keyword {
    /// Argument name.
    pub name: &'static str,
    /// Value applied when the argument is absent.
    pub default: Option<&'static str>,
    /// Absence is an error.
    pub required: bool,
}

impl Keyword {
    /// Argument that must be supplied.
    #[must_use]
    pub const fn required(name: &'static str) -> Self {
        Self {
            name,
            default: None,
            required: true,
        }
    }

    /// Argument that may be omitted and has no default.
    #[must_use]
    pub const fn optional(name: &'static str) -> Self {
        Self {
            name,
            default: None,
            required: false,
        }
    }

    /// Argument that falls back to `default` when omitted.
    #[must_use]
    pub const fn with_default(name: &'static str, default: &'static str) -> Self {
        Self {
            name,
            default: Some(default),
            required: false,
        }
    }
}

/// Arguments of one invocation, after validation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ShortcodeArgs {
    /// Positional arguments in source order.
    pub positional: Vec<String>,
    /// Keyword arguments, including defaults and positional slot values.
    pub keywords: BTreeMap<String, String>,
    /// Expanded block body, for block invocations.
    pub body: Option<String>,
}

impl ShortcodeArgs {
    /// Keyword argument by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.keywords.get(name).map(String::as_str)
    }

    /// Keyword argument by name, treating an empty value as absent.
    #[must_use]
    pub fn non_empty(&self, name: &str) -> Option<&str> {
        self.get(name).filter(|value| !value.is_empty())
    }

    /// Positional argument by index.
    #[must_use]
    pub fn positional(&self, index: usize) -> Option<&str> {
        self.positional.get(index).map(String::as_str)
    }
}

/// Where an invocation happens within the body.
///
/// Only body-relative positions are exposed: rendered output is cached by
/// body content, so it must not depend on the file path or on frontmatter
/// layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShortcodeContext {
    /// Line of the opening tag within the body (1-based).
    pub line: usize,
    /// Byte offset of the opening tag within the body.
    pub offset: usize,
}

/// A registered shortcode.
///
/// Built with a render function and refined with `with_*` methods:
///
/// ```
/// use quire_shortcodes::{BodyMode, Keyword, ShortcodeDefinition};
///
/// let kbd = ShortcodeDefinition::new(|args, _ctx| {
///     Ok(format!("<kbd>{}</kbd>", args.get("keys").unwrap_or_default()))
/// })
/// .with_positional(0, 1)
/// .with_keyword(Keyword::required("keys"))
/// .with_positional_slots(&["keys"])
/// .with_body(BodyMode::Forbidden);
///
/// assert_eq!(kbd.version(), 1);
/// ```
pub struct ShortcodeDefinition {
    min_positional: usize,
    max_positional: usize,
    keywords: Vec<Keyword>,
    positional_slots: Vec<&'static str>,
    body: BodyMode,
    open_keywords: bool,
    version: u32,
    render: Box<RenderFn>,
}

impl fmt::Debug for ShortcodeDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ShortcodeDefinition")
            .field("min_positional", &self.min_positional)
            .field("max_positional", &self.max_positional)
            .field("keywords", &self.keywords)
            .field("positional_slots", &self.positional_slots)
            .field("body", &self.body)
            .field("open_keywords", &self.open_keywords)
            .field("version", &self.version)
            .finish_non_exhaustive()
    }
}

impl ShortcodeDefinition {
    /// Create an inline definition with no arguments.
    pub fn new<F>(render: F) -> Self
    where
        F: Fn(&ShortcodeArgs, &ShortcodeContext) -> Result<String, String>
            + Send
            + Sync
            + 'static,
    {
        Self {
            min_positional: 0,
            max_positional: 0,
            keywords: Vec::new(),
            positional_slots: Vec::new(),
            body: BodyMode::Forbidden,
            open_keywords: false,
            version: 1,
            render: Box::new(render),
        }
    }

    /// Set the accepted number of positional arguments.
    #[must_use]
    pub fn with_positional(mut self, min: usize, max: usize) -> Self {
        self.min_positional = min;
        self.max_positional = max.max(min);
        self
    }

    /// Declare a keyword argument.
    #[must_use]
    pub fn with_keyword(mut self, keyword: Keyword) -> Self {
        self.keywords.push(keyword);
        self
    }

    /// Map positional arguments, in order, onto keyword names.
    ///
    /// `{{< youtube "X" >}}` then behaves like `{{< youtube id="X" >}}`.
    #[must_use]
    pub fn with_positional_slots(mut self, slots: &[&'static str]) -> Self {
        self.positional_slots = slots.to_vec();
        self
    }

    /// Set the body mode.
    #[must_use]
    pub fn with_body(mut self, body: BodyMode) -> Self {
        self.body = body;
        self
    }

    /// Accept keyword arguments beyond the declared set.
    #[must_use]
    pub fn with_open_keywords(mut self) -> Self {
        self.open_keywords = true;
        self
    }

    /// Set the renderer version; bump it whenever the output changes.
    #[must_use]
    pub fn with_version(mut self, version: u32) -> Self {
        self.version = version;
        self
    }

    /// Renderer version folded into content fingerprints.
    #[must_use]
    pub fn version(&self) -> u32 {
        self.version
    }

    /// Body mode.
    #[must_use]
    pub fn body_mode(&self) -> BodyMode {
        self.body
    }

    /// Validate raw tag arguments and build the render input.
    ///
    /// Errors are returned as `(kind, message)` pairs so the caller can attach
    /// the tag's location.
    pub(crate) fn bind(
        &self,
        positional: Vec<String>,
        named: Vec<(String, String)>,
        body: Option<String>,
    ) -> Result<ShortcodeArgs, BindError> {
        let count = positional.len();
        if count < self.min_positional || count > self.max_positional {
            let expected = if self.min_positional == self.max_positional {
                self.min_positional.to_string()
            } else {
                format!("{} to {}", self.min_positional, self.max_positional)
            };
            return Err(BindError::Count(format!(
                "expected {expected} positional argument(s), found {count}"
            )));
        }

        let mut keywords = BTreeMap::new();
        for (key, value) in named {
            if !self.open_keywords && !self.keywords.iter().any(|k| k.name == key) {
                return Err(BindError::Unexpected(key));
            }
            if keywords.insert(key.clone(), value).is_some() {
                return Err(BindError::Count(format!("argument `{key}` given twice")));
            }
        }

        for (slot, value) in self.positional_slots.iter().zip(&positional) {
            if keywords.contains_key(*slot) {
                return Err(BindError::Count(format!(
                    "argument `{slot}` given both by position and by name"
                )));
            }
            keywords.insert((*slot).to_owned(), value.clone());
        }

        for keyword in &self.keywords {
            if keywords.contains_key(keyword.name) {
                continue;
            }
            if let Some(default) = keyword.default {
                keywords.insert(keyword.name.to_owned(), default.to_owned());
            } else if keyword.required {
                return Err(BindError::Count(format!(
                    "missing required argument `{}`",
                    keyword.name
                )));
            }
        }

        Ok(ShortcodeArgs {
            positional,
            keywords,
            body,
        })
    }

    pub(crate) fn render(
        &self,
        args: &ShortcodeArgs,
        ctx: &ShortcodeContext,
    ) -> Result<String, String> {
        (self.render)(args, ctx)
    }
}

/// Reason [`ShortcodeDefinition::bind`] rejected an invocation.
#[derive(Debug, PartialEq, Eq)]
pub(crate) enum BindError {
    Count(String),
    Unexpected(String),
}
