//! Ad hoc membership groups.
//!
//! Groups hold session ids and usernames, never live handles. The owner gets
//! kick authority but is not a member until it joins. Groups live for the
//! whole process.

use crate::state::SessionId;
use parking_lot::Mutex;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GroupError {
    #[error("group name is empty")]
    NameMissing,

    #[error("group {0} already exists")]
    Exists(String),

    #[error("no group named {0}")]
    NotFound(String),

    #[error("not a member of group {0}")]
    NotMember(String),

    #[error("not the owner of group {0}")]
    NotOwner(String),
}

/// A group member as stored in the member list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Member {
    pub id: SessionId,
    pub username: String,
}

impl Member {
    pub fn new(id: SessionId, username: impl Into<String>) -> Self {
        Self {
            id,
            username: username.into(),
        }
    }
}

/// Detached view of a group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupInfo {
    pub name: String,
    pub owner: SessionId,
    pub members: Vec<Member>,
}

struct Group {
    name: String,
    owner: SessionId,
    members: Vec<Member>,
}

impl Group {
    fn matches(&self, name: &str) -> bool {
        self.name.to_lowercase() == name.to_lowercase()
    }

    fn has_member(&self, id: SessionId) -> bool {
        self.members.iter().any(|m| m.id == id)
    }

    fn info(&self) -> GroupInfo {
        GroupInfo {
            name: self.name.clone(),
            owner: self.owner,
            members: self.members.clone(),
        }
    }
}

/// Insertion-ordered group collection behind a single lock.
///
/// Every operation finishes its lookup and mutation under one acquisition
/// and scans the whole collection before answering.
pub struct GroupManager {
    groups: Mutex<Vec<Group>>,
    unique_names: bool,
}

impl GroupManager {
    pub fn new(unique_names: bool) -> Self {
        Self {
            groups: Mutex::new(Vec::new()),
            unique_names,
        }
    }

    pub fn create(&self, name: &str, owner: SessionId) -> Result<GroupInfo, GroupError> {
        if name.is_empty() {
            return Err(GroupError::NameMissing);
        }

        let mut groups = self.groups.lock();
        if self.unique_names && groups.iter().any(|g| g.matches(name)) {
            return Err(GroupError::Exists(name.to_string()));
        }

        let group = Group {
            name: name.to_string(),
            owner,
            members: Vec::new(),
        };
        let info = group.info();
        groups.push(group);
        Ok(info)
    }

    /// All groups whose name matches ignoring case, in creation order.
    pub fn find_by_name_case_insensitive(&self, name: &str) -> Vec<GroupInfo> {
        self.groups
            .lock()
            .iter()
            .filter(|g| g.matches(name))
            .map(Group::info)
            .collect()
    }

    /// Add `member` to the first group matching `name` ignoring case.
    ///
    /// Returns the stored group name. Joining twice leaves one entry.
    pub fn join(&self, name: &str, member: Member) -> Result<String, GroupError> {
        let mut groups = self.groups.lock();
        let group = groups
            .iter_mut()
            .find(|g| g.matches(name))
            .ok_or_else(|| GroupError::NotFound(name.to_string()))?;

        if !group.has_member(member.id) {
            group.members.push(member);
        }
        Ok(group.name.clone())
    }

    /// Remove `id` from every group named exactly `name`.
    ///
    /// Returns how many groups it left.
    pub fn leave(&self, name: &str, id: SessionId) -> Result<usize, GroupError> {
        let mut groups = self.groups.lock();
        let mut found = false;
        let mut left = 0;

        for group in groups.iter_mut().filter(|g| g.name == name) {
            found = true;
            let before = group.members.len();
            group.members.retain(|m| m.id != id);
            if group.members.len() != before {
                left += 1;
            }
        }

        match (found, left) {
            (false, _) => Err(GroupError::NotFound(name.to_string())),
            (true, 0) => Err(GroupError::NotMember(name.to_string())),
            (true, n) => Ok(n),
        }
    }

    /// Remove member `target` (username, ignoring case) from a group named
    /// `name` (ignoring case) that `kicker` owns.
    pub fn kick(&self, name: &str, kicker: SessionId, target: &str) -> Result<(), GroupError> {
        let target = target.to_lowercase();
        let mut groups = self.groups.lock();

        let mut named = groups.iter_mut().filter(|g| g.matches(name)).peekable();
        if named.peek().is_none() {
            return Err(GroupError::NotFound(name.to_string()));
        }

        let mut owned = named.filter(|g| g.owner == kicker).peekable();
        if owned.peek().is_none() {
            return Err(GroupError::NotOwner(name.to_string()));
        }

        for group in owned {
            if let Some(pos) = group
                .members
                .iter()
                .position(|m| m.username.to_lowercase() == target)
            {
                group.members.remove(pos);
                return Ok(());
            }
        }
        Err(GroupError::NotMember(name.to_string()))
    }

    /// Drop `id` from every group. Returns the number of groups touched.
    pub fn purge(&self, id: SessionId) -> usize {
        let mut groups = self.groups.lock();
        let mut touched = 0;
        for group in groups.iter_mut() {
            let before = group.members.len();
            group.members.retain(|m| m.id != id);
            if group.members.len() != before {
                touched += 1;
            }
        }
        touched
    }

    /// `(name, member_count)` for every group in creation order.
    pub fn snapshot(&self) -> Vec<(String, usize)> {
        self.groups
            .lock()
            .iter()
            .map(|g| (g.name.clone(), g.members.len()))
            .collect()
    }
}

impl Default for GroupManager {
    fn default() -> Self {
        Self::new(false)
    }
}
