//! Group visibility for the report.

use crate::models::{GroupMode, GroupScope};
use crate::services::stores::CourseAccess;

/// Decides which users' records the caller may see.
///
/// Without group mode everything is visible. In visible-groups mode, or for a
/// caller who may access all groups, a selected group narrows the set. In
/// separate-groups mode the caller is confined to their own groups and a
/// selected group outside them is ignored.
pub fn resolve_group_scope(
    mode: GroupMode,
    access: &CourseAccess,
    selected_group: Option<i64>,
) -> GroupScope {
    match mode {
        GroupMode::NoGroups => GroupScope::All,
        GroupMode::Visible => selected(selected_group),
        GroupMode::Separate if access.access_all_groups => selected(selected_group),
        GroupMode::Separate => match selected_group {
            Some(group) if access.group_ids.contains(&group) => GroupScope::Groups(vec![group]),
            _ => GroupScope::Groups(access.group_ids.clone()),
        },
    }
}

fn selected(selected_group: Option<i64>) -> GroupScope {
    match selected_group {
        Some(group) if group > 0 => GroupScope::Groups(vec![group]),
        _ => GroupScope::All,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn member_of(groups: &[i64]) -> CourseAccess {
        CourseAccess {
            can_manage: true,
            access_all_groups: false,
            group_ids: groups.to_vec(),
        }
    }

    #[test]
    fn test_no_groups_ignores_selection() {
        assert_eq!(
            resolve_group_scope(GroupMode::NoGroups, &member_of(&[1]), Some(9)),
            GroupScope::All
        );
    }

    #[test]
    fn test_visible_groups_selection() {
        let access = member_of(&[1]);
        assert_eq!(
            resolve_group_scope(GroupMode::Visible, &access, None),
            GroupScope::All
        );
        assert_eq!(
            resolve_group_scope(GroupMode::Visible, &access, Some(9)),
            GroupScope::Groups(vec![9])
        );
        assert_eq!(
            resolve_group_scope(GroupMode::Visible, &access, Some(0)),
            GroupScope::All
        );
    }

    #[test]
    fn test_separate_groups_confined_to_own() {
        let access = member_of(&[1, 2]);
        assert_eq!(
            resolve_group_scope(GroupMode::Separate, &access, None),
            GroupScope::Groups(vec![1, 2])
        );
        assert_eq!(
            resolve_group_scope(GroupMode::Separate, &access, Some(2)),
            GroupScope::Groups(vec![2])
        );
        assert_eq!(
            resolve_group_scope(GroupMode::Separate, &access, Some(9)),
            GroupScope::Groups(vec![1, 2])
        );
    }

    #[test]
    fn test_separate_groups_without_membership_sees_nothing() {
        let scope = resolve_group_scope(GroupMode::Separate, &member_of(&[]), None);
        assert_eq!(scope, GroupScope::Groups(vec![]));
    }

    #[test]
    fn test_access_all_groups_overrides_separation() {
        let access = CourseAccess::administrator(vec![]);
        assert_eq!(
            resolve_group_scope(GroupMode::Separate, &access, None),
            GroupScope::All
        );
        assert_eq!(
            resolve_group_scope(GroupMode::Separate, &access, Some(4)),
            GroupScope::Groups(vec![4])
        );
    }
}
