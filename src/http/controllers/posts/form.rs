use serde_json::json;

use crate::{
    database::Connection,
    http::Error,
    schema::Group,
    types::form::{PostForm, PostFormErrors},
    types::id::{marker::GroupMarker, Id},
    types::validation::is_valid_slug,
};

/// Builds the rendering context for the create/edit form page. The
/// `form` key always carries both fields so templates never look
/// up an undefined value.
pub(super) fn context(
    form: &PostForm,
    errors: &PostFormErrors,
    groups: &[Group],
    is_edit: bool,
) -> tera::Context {
    let mut context = tera::Context::new();
    context.insert(
        "form",
        &json!({
            "text": form.text,
            "group": form.group,
        }),
    );
    context.insert("errors", errors);
    context.insert("groups", groups);
    context.insert("is_edit", &is_edit);
    context
}

/// Turns the submitted group slug into a group id, or files a
/// field message when the slug matches no existing group. An empty
/// selection is fine and means "no group".
pub(super) async fn resolve_group(
    conn: &mut Connection,
    form: &PostForm,
    errors: &mut PostFormErrors,
) -> Result<Option<Id<GroupMarker>>, Error> {
    let Some(slug) = form.group_slug() else {
        return Ok(None);
    };

    if is_valid_slug(slug) {
        if let Some(group) = Group::by_slug(conn, slug).await? {
            return Ok(Some(group.id));
        }
    }

    errors.group.push("Select a valid group.".into());
    Ok(None)
}
