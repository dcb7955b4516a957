use crate::model::Annotation;

/// Who may create and edit annotations.
///
/// Part of the configuration snapshot; read by every mutation path, mutated
/// only through reconfiguration.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct PermissionContext {
    /// The create affordance is offered at all. Global only; adding has no
    /// per-author gating.
    pub can_add: bool,
    /// Every annotation is editable regardless of author.
    pub can_edit_all: bool,
    /// When set, annotations by exactly this author are editable even
    /// without `can_edit_all`.
    pub editable_author: Option<String>,
}

impl Default for PermissionContext {
    fn default() -> Self {
        Self {
            can_add: true,
            can_edit_all: true,
            editable_author: None,
        }
    }
}

impl PermissionContext {
    /// Whether `annotation` may be edited, moved, or removed.
    pub fn can_edit(&self, annotation: &Annotation) -> bool {
        if self.can_edit_all {
            return true;
        }
        self.editable_author
            .as_deref()
            .is_some_and(|name| name == annotation.author)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::core::PositionMs;
    use crate::model::AnnotationId;

    fn by(author: &str) -> Annotation {
        let mut a = Annotation::point(AnnotationId::new("a"), PositionMs(0), "");
        a.author = author.to_owned();
        a
    }

    #[test]
    fn full_truth_table() {
        let anno = by("alice");

        let cases = [
            // (can_edit_all, editable_author, expected)
            (true, None, true),
            (true, Some("alice"), true),
            (true, Some("bob"), true),
            (false, None, false),
            (false, Some("alice"), true),
            (false, Some("bob"), false),
        ];

        for (can_edit_all, editable_author, expected) in cases {
            let ctx = PermissionContext {
                can_add: false,
                can_edit_all,
                editable_author: editable_author.map(str::to_owned),
            };
            assert_eq!(
                ctx.can_edit(&anno),
                expected,
                "can_edit_all={can_edit_all}, editable_author={editable_author:?}"
            );
        }
    }

    #[test]
    fn empty_author_never_matches_a_named_restriction() {
        let ctx = PermissionContext {
            can_add: false,
            can_edit_all: false,
            editable_author: Some("alice".to_owned()),
        };
        assert!(!ctx.can_edit(&by("")));
    }
}
