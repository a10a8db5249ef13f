use std::collections::BTreeSet;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use reportdesk_core::{GroupId, UserId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Gender {
    Male,
    Female,
    Other,
}

impl Gender {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Gender::Male => "MALE",
            Gender::Female => "FEMALE",
            Gender::Other => "OTHER",
        }
    }

    /// Inverse of `as_str`; unknown values yield `None`.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "MALE" => Some(Gender::Male),
            "FEMALE" => Some(Gender::Female),
            "OTHER" => Some(Gender::Other),
            _ => None,
        }
    }
}

/// Personnel details attached to an account. Every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub employee_id: Option<String>,
    pub last_name: Option<String>,
    pub first_name: Option<String>,
    pub middle_name: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    pub gender: Option<Gender>,
    pub address: Option<String>,
    pub phone_number: Option<String>,
    pub email: Option<String>,
    pub position: Option<String>,
    pub department: Option<String>,
    pub hire_date: Option<NaiveDate>,
    pub notes: Option<String>,
}

impl UserProfile {
    /// Copy every field present in `patch` over `self`; absent fields are kept.
    pub fn merge(&mut self, patch: UserProfile) {
        let UserProfile {
            employee_id,
            last_name,
            first_name,
            middle_name,
            date_of_birth,
            gender,
            address,
            phone_number,
            email,
            position,
            department,
            hire_date,
            notes,
        } = patch;

        if employee_id.is_some() {
            self.employee_id = employee_id;
        }
        if last_name.is_some() {
            self.last_name = last_name;
        }
        if first_name.is_some() {
            self.first_name = first_name;
        }
        if middle_name.is_some() {
            self.middle_name = middle_name;
        }
        if date_of_birth.is_some() {
            self.date_of_birth = date_of_birth;
        }
        if gender.is_some() {
            self.gender = gender;
        }
        if address.is_some() {
            self.address = address;
        }
        if phone_number.is_some() {
            self.phone_number = phone_number;
        }
        if email.is_some() {
            self.email = email;
        }
        if position.is_some() {
            self.position = position;
        }
        if department.is_some() {
            self.department = department;
        }
        if hire_date.is_some() {
            self.hire_date = hire_date;
        }
        if notes.is_some() {
            self.notes = notes;
        }
    }

    /// "last first middle", blanks for missing parts, trimmed.
    pub fn full_name(&self) -> Option<String> {
        let name = format!(
            "{} {} {}",
            self.last_name.as_deref().unwrap_or(""),
            self.first_name.as_deref().unwrap_or(""),
            self.middle_name.as_deref().unwrap_or(""),
        );
        let name = name.trim();
        if name.is_empty() {
            None
        } else {
            Some(name.to_string())
        }
    }
}

/// A stored account. The password is only ever held as a hash.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: UserId,
    pub username: String,
    pub password_hash: String,
    pub groups: BTreeSet<GroupId>,
    pub profile: UserProfile,
    pub is_fired: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    pub fn display_name(&self) -> Option<String> {
        self.profile.full_name()
    }

    pub fn in_group(&self, group: GroupId) -> bool {
        self.groups.contains(&group)
    }
}

/// An account that has not been stored yet (no id).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserDraft {
    pub username: String,
    pub password_hash: String,
    pub groups: BTreeSet<GroupId>,
    pub profile: UserProfile,
    pub is_fired: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl UserDraft {
    pub fn into_user(self, id: UserId) -> User {
        User {
            id,
            username: self.username,
            password_hash: self.password_hash,
            groups: self.groups,
            profile: self.profile,
            is_fired: self.is_fired,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

/// Input for adding a fully described account.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewUser {
    pub username: String,
    pub password: String,
    #[serde(flatten)]
    pub profile: UserProfile,
    #[serde(default)]
    pub groups: Vec<GroupId>,
    #[serde(default)]
    pub is_fired: bool,
}

/// Partial update of an account: only present fields are applied.
///
/// `password` is hashed before storage; `groups` replaces the membership set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserPatch {
    pub username: Option<String>,
    pub password: Option<String>,
    #[serde(flatten)]
    pub profile: UserProfile,
    pub groups: Option<Vec<GroupId>>,
    pub is_fired: Option<bool>,
}
