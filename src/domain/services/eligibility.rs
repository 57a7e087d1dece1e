use std::collections::{HashMap, HashSet};
use serde::Serialize;

use crate::domain::models::{appointment::Appointment, skill::StaffSkill, user::User};
use crate::domain::services::{conflict::ConflictChecker, roster::Roster};

/// A staff member is qualified for a service when they hold at least one of the
/// skills mapped to it. Services without any mapped skill accept everyone.
pub fn is_qualified(staff_skill_ids: &HashSet<&str>, required_skill_ids: &[String]) -> bool {
    required_skill_ids.is_empty()
        || required_skill_ids.iter().any(|id| staff_skill_ids.contains(id.as_str()))
}

#[derive(Debug, Serialize, Clone, PartialEq, Eq)]
pub struct SkillTag {
    pub id: String,
    pub skill_name: String,
}

#[derive(Debug, Serialize, Clone)]
pub struct StaffOption {
    pub id: String,
    pub full_name: String,
    pub image_url: Option<String>,
    pub skills: Vec<SkillTag>,
    pub eligible: bool,
    pub on_shift: bool,
    pub busy: bool,
}

impl StaffOption {
    pub fn selectable(&self) -> bool {
        self.eligible && self.on_shift && !self.busy
    }
}

/// Builds the assignment dropdown for `appointment`: one entry per active staff
/// member, flagged with skill eligibility, duty and availability.
///
/// Selectable staff come first, then by name.
pub fn staff_options(
    appointment: &Appointment,
    staff: &[User],
    staff_skills: &[StaffSkill],
    required_skill_ids: &[String],
    snapshot: &[Appointment],
    roster: &Roster,
    checker: &ConflictChecker,
) -> Vec<StaffOption> {
    let mut skills_by_user: HashMap<&str, Vec<&StaffSkill>> = HashMap::new();
    for row in staff_skills {
        skills_by_user.entry(row.user_id.as_str()).or_default().push(row);
    }

    let mut options: Vec<StaffOption> = staff
        .iter()
        .filter(|u| u.is_assignable())
        .map(|u| {
            let held = skills_by_user.get(u.id.as_str()).cloned().unwrap_or_default();
            let held_ids: HashSet<&str> = held.iter().map(|s| s.skill_id.as_str()).collect();

            StaffOption {
                id: u.id.clone(),
                full_name: u.full_name.clone(),
                image_url: u.image_url.clone(),
                skills: held
                    .iter()
                    .map(|s| SkillTag { id: s.skill_id.clone(), skill_name: s.skill_name.clone() })
                    .collect(),
                eligible: is_qualified(&held_ids, required_skill_ids),
                on_shift: roster.is_on_shift(&u.id, appointment, checker.tz()),
                busy: checker.first_blocking(&u.id, appointment, snapshot).is_some(),
            }
        })
        .collect();

    options.sort_by(|a, b| {
        b.selectable()
            .cmp(&a.selectable())
            .then_with(|| a.full_name.to_lowercase().cmp(&b.full_name.to_lowercase()))
    });
    options
}
