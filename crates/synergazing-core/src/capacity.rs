//! Team capacity allocator
//!
//! A project's `total_team` budget is shared between members that already hold
//! a place (invited or accepted) and the open slots advertised on its roles:
//!
//! ```text
//! filled_team      = members holding a slot
//! total_role_slots = sum of role.slots_available
//! remaining_team   = total_team - filled_team - total_role_slots
//! ```
//!
//! `remaining_team` is never allowed to be persisted below zero.

use serde::{Deserialize, Serialize};
use synergazing_db::entities::{project_member, project_role};

#[cfg(feature = "openapi")]
use utoipa::ToSchema;

use crate::error::{ServiceError, ServiceResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct TeamCapacity {
    pub total_team: i32,
    pub filled_team: i32,
    pub total_role_slots: i32,
    pub remaining_team: i32,
}

impl TeamCapacity {
    pub fn new(total_team: i32, filled_team: i32, total_role_slots: i32) -> Self {
        let remaining =
            i64::from(total_team) - i64::from(filled_team) - i64::from(total_role_slots);
        Self {
            total_team,
            filled_team,
            total_role_slots,
            remaining_team: clamp_i32(remaining),
        }
    }

    /// Project the capacity of loaded member and role rows
    pub fn from_rows(
        total_team: i32,
        members: &[project_member::Model],
        roles: &[project_role::Model],
    ) -> Self {
        let filled = members.iter().filter(|m| m.status.holds_slot()).count();
        let slots: i64 = roles.iter().map(|r| i64::from(r.slots_available)).sum();
        Self::new(
            total_team,
            i32::try_from(filled).unwrap_or(i32::MAX),
            clamp_i32(slots),
        )
    }

    /// Places currently committed, seeded or open
    pub fn allocated(&self) -> i32 {
        self.filled_team.saturating_add(self.total_role_slots)
    }

    pub fn is_over_budget(&self) -> bool {
        self.remaining_team < 0
    }
}

fn clamp_i32(value: i64) -> i32 {
    i32::try_from(value).unwrap_or(if value < 0 { i32::MIN } else { i32::MAX })
}

/// Guard for a stage-4 submission: `seeded_members` placed directly plus the
/// requested role slots must fit in `total_team`, and must ask for at least
/// one place. No single role may advertise more slots than the whole team.
pub fn check_allocation(
    total_team: i32,
    seeded_members: usize,
    role_slots: &[i32],
) -> ServiceResult<TeamCapacity> {
    if let Some(&slots) = role_slots.iter().find(|&&slots| slots > total_team) {
        return Err(ServiceError::Capacity(format!(
            "A role cannot have {} slots: total team capacity is {}",
            slots, total_team
        )));
    }

    // Summed in i64 so oversized input cannot wrap into a passing total
    let members = i64::try_from(seeded_members).unwrap_or(i64::MAX);
    let slots: i64 = role_slots.iter().map(|&s| i64::from(s)).sum();
    let requested = members.saturating_add(slots);

    if requested == 0 {
        return Err(ServiceError::Capacity(
            "At least one role slot or team member is required".to_string(),
        ));
    }

    if requested > i64::from(total_team) {
        return Err(ServiceError::Capacity(format!(
            "Cannot add {} members and {} role slots: requested {} places but total team capacity is {} ({} over)",
            members,
            slots,
            requested,
            total_team,
            requested - i64::from(total_team)
        )));
    }

    // Both fit in total_team here
    Ok(TeamCapacity::new(total_team, clamp_i32(members), clamp_i32(slots)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use synergazing_db::entities::project_member::MemberStatus;
    use uuid::Uuid;

    fn member(status: MemberStatus) -> project_member::Model {
        project_member::Model {
            id: Uuid::new_v4(),
            project_id: Uuid::nil(),
            user_id: Uuid::new_v4(),
            project_role_id: Uuid::nil(),
            status,
            role_description: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn role(slots: i32) -> project_role::Model {
        project_role::Model {
            id: Uuid::new_v4(),
            project_id: Uuid::nil(),
            name: "Backend".to_string(),
            slots_available: slots,
            description: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_exact_fit_is_allowed() {
        let capacity = check_allocation(2, 0, &[2]).expect("0 + 2 <= 2");
        assert_eq!(capacity.remaining_team, 0);
        assert_eq!(capacity.total_role_slots, 2);
    }

    #[test]
    fn test_over_budget_is_rejected() {
        let err = check_allocation(1, 0, &[2]).unwrap_err();
        match err {
            ServiceError::Capacity(message) => {
                assert!(message.contains("requested 2"));
                assert!(message.contains("capacity is 1"));
            }
            other => panic!("expected capacity error, got {other:?}"),
        }
    }

    #[test]
    fn test_seeded_members_count_against_budget() {
        assert!(check_allocation(3, 2, &[1]).is_ok());
        assert!(check_allocation(3, 2, &[1, 1]).is_err());
    }

    #[test]
    fn test_empty_allocation_is_rejected() {
        assert!(matches!(
            check_allocation(5, 0, &[0, 0]),
            Err(ServiceError::Capacity(_))
        ));
        assert!(check_allocation(5, 0, &[]).is_err());
    }

    #[test]
    fn test_role_larger_than_team_is_rejected() {
        let err = check_allocation(2, 0, &[3]).unwrap_err();
        match err {
            ServiceError::Capacity(message) => assert!(message.contains("3 slots")),
            other => panic!("expected capacity error, got {other:?}"),
        }
    }

    #[test]
    fn test_extreme_slot_counts_do_not_wrap() {
        assert!(matches!(
            check_allocation(2, 0, &[i32::MAX, i32::MAX]),
            Err(ServiceError::Capacity(_))
        ));
        assert!(matches!(
            check_allocation(i32::MAX, 1, &[i32::MAX]),
            Err(ServiceError::Capacity(_))
        ));
        assert!(matches!(
            check_allocation(i32::MAX, 0, &[i32::MAX, 1]),
            Err(ServiceError::Capacity(_))
        ));

        let capacity = check_allocation(i32::MAX, 0, &[i32::MAX]).expect("exact fit");
        assert_eq!(capacity.remaining_team, 0);
    }

    #[test]
    fn test_projection_saturates_instead_of_wrapping() {
        let roles = vec![role(i32::MAX), role(i32::MAX)];
        let capacity = TeamCapacity::from_rows(2, &[], &roles);

        assert_eq!(capacity.total_role_slots, i32::MAX);
        assert!(capacity.is_over_budget());
        assert_eq!(capacity.allocated(), i32::MAX);
    }

    #[test]
    fn test_declined_members_do_not_hold_slots() {
        let members = vec![
            member(MemberStatus::Invited),
            member(MemberStatus::Accepted),
            member(MemberStatus::Declined),
        ];
        let roles = vec![role(1), role(2)];

        let capacity = TeamCapacity::from_rows(6, &members, &roles);
        assert_eq!(capacity.filled_team, 2);
        assert_eq!(capacity.total_role_slots, 3);
        assert_eq!(capacity.remaining_team, 1);
        assert!(!capacity.is_over_budget());
    }
}
