use serde::{Deserialize, Serialize};
use std::borrow::Cow;

/// Raw input of the create/edit post form.
///
/// `group` carries the selected group's slug; browsers submit an
/// empty string when the "no group" option is picked, so both
/// `None` and `""` mean "file this post under no group".
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PostForm {
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub group: Option<String>,
}

impl PostForm {
    /// Runs every field rule that does not need the database. The
    /// group choice is checked against existing groups by the
    /// handler, which owns a connection.
    pub fn validate(&self) -> PostFormErrors {
        let mut errors = PostFormErrors::default();
        if self.text.trim().is_empty() {
            errors.text.push("Enter the post text.".into());
        }
        errors
    }

    /// The submitted group slug, with "no group" normalized
    /// to `None`.
    pub fn group_slug(&self) -> Option<&str> {
        self.group
            .as_deref()
            .map(str::trim)
            .filter(|slug| !slug.is_empty())
    }
}

/// Field-level messages for [`PostForm`], one bucket per form field.
/// Empty buckets serialize too, so templates can always look a
/// field up.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct PostFormErrors {
    pub text: Vec<Cow<'static, str>>,
    pub group: Vec<Cow<'static, str>>,
}

impl PostFormErrors {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.text.is_empty() && self.group.is_empty()
    }
}
