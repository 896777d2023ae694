//! In-memory repository implementations backing the integration tests.
//!
//! These mirror the PostgreSQL repositories' observable behavior (conflict
//! errors, affected-row counts, oldest-row-wins natural key lookup) without
//! needing a database.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::Utc;
use mindoc_core::models::{
    Document, DocumentPermission, Group, NewDocument, NewUser, PermissionSubject, User,
    UserGroupMembership, UserRole,
};
use mindoc_core::AppError;
use mindoc_db::{
    DocumentRepositoryTrait, GroupRepositoryTrait, PermissionRepositoryTrait, UserRepositoryTrait,
};
use uuid::Uuid;

/// Membership rows shared between the group and permission repositories,
/// standing in for the `user_groups` join table.
pub type SharedMemberships = Arc<Mutex<Vec<UserGroupMembership>>>;

#[derive(Default)]
pub struct InMemoryDocumentRepository {
    rows: Mutex<Vec<Document>>,
}

#[async_trait]
impl DocumentRepositoryTrait for InMemoryDocumentRepository {
    async fn insert_pending(&self, new: NewDocument) -> Result<Document, AppError> {
        let document = Document {
            id: Uuid::new_v4(),
            name: new.name,
            description: new.description,
            category: new.category,
            storage_key: new.storage_key,
            uploaded: false,
            inserted_at: Utc::now(),
            inserted_by: new.inserted_by,
            updated_at: None,
            updated_by: None,
        };
        self.rows.lock().unwrap().push(document.clone());
        Ok(document)
    }

    async fn find_by_natural_key(
        &self,
        name: &str,
        description: &str,
        category: &str,
    ) -> Result<Option<Document>, AppError> {
        Ok(self
            .rows
            .lock()
            .unwrap()
            .iter()
            .filter(|d| d.name == name && d.description == description && d.category == category)
            .min_by_key(|d| d.inserted_at)
            .cloned())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Document>, AppError> {
        Ok(self.rows.lock().unwrap().iter().find(|d| d.id == id).cloned())
    }

    async fn list(&self) -> Result<Vec<Document>, AppError> {
        Ok(self.rows.lock().unwrap().clone())
    }

    async fn mark_uploaded(&self, id: Uuid, updated_by: &str) -> Result<u64, AppError> {
        let mut rows = self.rows.lock().unwrap();
        match rows.iter_mut().find(|d| d.id == id) {
            Some(document) => {
                document.uploaded = true;
                document.updated_at = Some(Utc::now());
                document.updated_by = Some(updated_by.to_string());
                Ok(1)
            }
            None => Ok(0),
        }
    }
}

pub struct InMemoryPermissionRepository {
    rows: Mutex<Vec<DocumentPermission>>,
    memberships: SharedMemberships,
}

impl InMemoryPermissionRepository {
    pub fn new(memberships: SharedMemberships) -> Self {
        Self {
            rows: Mutex::new(Vec::new()),
            memberships,
        }
    }
}

#[async_trait]
impl PermissionRepositoryTrait for InMemoryPermissionRepository {
    async fn grant(
        &self,
        document_id: Uuid,
        subject: &PermissionSubject,
        granted_by: &str,
    ) -> Result<DocumentPermission, AppError> {
        let mut rows = self.rows.lock().unwrap();
        let duplicate = rows.iter().any(|p| {
            p.document_id == document_id
                && p.user_id == subject.user_id()
                && p.group_id == subject.group_id()
        });
        if duplicate {
            return Err(AppError::Conflict(format!(
                "Grant for {} on document {} already exists",
                subject, document_id
            )));
        }
        let permission = DocumentPermission {
            id: Uuid::new_v4(),
            document_id,
            user_id: subject.user_id(),
            group_id: subject.group_id(),
            inserted_at: Utc::now(),
            inserted_by: granted_by.to_string(),
            updated_at: None,
            updated_by: None,
        };
        rows.push(permission.clone());
        Ok(permission)
    }

    async fn revoke(
        &self,
        document_id: Uuid,
        subject: &PermissionSubject,
    ) -> Result<bool, AppError> {
        let mut rows = self.rows.lock().unwrap();
        let before = rows.len();
        rows.retain(|p| {
            !(p.document_id == document_id
                && p.user_id == subject.user_id()
                && p.group_id == subject.group_id())
        });
        Ok(rows.len() < before)
    }

    async fn user_has_direct_grant(
        &self,
        document_id: Uuid,
        user_id: Uuid,
    ) -> Result<bool, AppError> {
        Ok(self
            .rows
            .lock()
            .unwrap()
            .iter()
            .any(|p| p.document_id == document_id && p.user_id == Some(user_id)))
    }

    async fn user_has_group_grant(
        &self,
        document_id: Uuid,
        user_id: Uuid,
    ) -> Result<bool, AppError> {
        let group_ids: Vec<Uuid> = self
            .memberships
            .lock()
            .unwrap()
            .iter()
            .filter(|m| m.user_id == user_id)
            .map(|m| m.group_id)
            .collect();
        Ok(self
            .rows
            .lock()
            .unwrap()
            .iter()
            .any(|p| p.document_id == document_id && p.group_id.is_some_and(|g| group_ids.contains(&g))))
    }
}

pub struct InMemoryUserRepository {
    rows: Mutex<Vec<User>>,
    memberships: SharedMemberships,
}

impl InMemoryUserRepository {
    pub fn new(memberships: SharedMemberships) -> Self {
        Self {
            rows: Mutex::new(Vec::new()),
            memberships,
        }
    }
}

#[async_trait]
impl UserRepositoryTrait for InMemoryUserRepository {
    async fn insert(&self, new: NewUser) -> Result<User, AppError> {
        let mut rows = self.rows.lock().unwrap();
        if rows.iter().any(|u| u.username == new.username) {
            return Err(AppError::Conflict(format!(
                "Username '{}' is already taken",
                new.username
            )));
        }
        let user = User {
            id: Uuid::new_v4(),
            username: new.username,
            password_hash: new.password_hash,
            role: new.role,
            inserted_at: Utc::now(),
            inserted_by: new.inserted_by,
            updated_at: None,
            updated_by: None,
        };
        rows.push(user.clone());
        Ok(user)
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, AppError> {
        Ok(self
            .rows
            .lock()
            .unwrap()
            .iter()
            .find(|u| u.username == username)
            .cloned())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, AppError> {
        Ok(self.rows.lock().unwrap().iter().find(|u| u.id == id).cloned())
    }

    async fn list(&self) -> Result<Vec<User>, AppError> {
        Ok(self.rows.lock().unwrap().clone())
    }

    async fn update_role(
        &self,
        id: Uuid,
        role: UserRole,
        updated_by: &str,
    ) -> Result<u64, AppError> {
        let mut rows = self.rows.lock().unwrap();
        match rows.iter_mut().find(|u| u.id == id) {
            Some(user) => {
                user.role = role;
                user.updated_at = Some(Utc::now());
                user.updated_by = Some(updated_by.to_string());
                Ok(1)
            }
            None => Ok(0),
        }
    }

    async fn update_password(
        &self,
        id: Uuid,
        password_hash: &str,
        updated_by: &str,
    ) -> Result<u64, AppError> {
        let mut rows = self.rows.lock().unwrap();
        match rows.iter_mut().find(|u| u.id == id) {
            Some(user) => {
                user.password_hash = password_hash.to_string();
                user.updated_at = Some(Utc::now());
                user.updated_by = Some(updated_by.to_string());
                Ok(1)
            }
            None => Ok(0),
        }
    }

    async fn delete(&self, id: Uuid) -> Result<bool, AppError> {
        let mut rows = self.rows.lock().unwrap();
        let before = rows.len();
        rows.retain(|u| u.id != id);
        let removed = rows.len() < before;
        if removed {
            self.memberships.lock().unwrap().retain(|m| m.user_id != id);
        }
        Ok(removed)
    }
}

pub struct InMemoryGroupRepository {
    rows: Mutex<Vec<Group>>,
    memberships: SharedMemberships,
}

impl InMemoryGroupRepository {
    pub fn new(memberships: SharedMemberships) -> Self {
        Self {
            rows: Mutex::new(Vec::new()),
            memberships,
        }
    }
}

#[async_trait]
impl GroupRepositoryTrait for InMemoryGroupRepository {
    async fn insert(&self, name: &str, inserted_by: &str) -> Result<Group, AppError> {
        let mut rows = self.rows.lock().unwrap();
        if rows.iter().any(|g| g.name == name) {
            return Err(AppError::Conflict(format!(
                "Group '{}' already exists",
                name
            )));
        }
        let group = Group {
            id: Uuid::new_v4(),
            name: name.to_string(),
            inserted_at: Utc::now(),
            inserted_by: inserted_by.to_string(),
            updated_at: None,
            updated_by: None,
        };
        rows.push(group.clone());
        Ok(group)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Group>, AppError> {
        Ok(self.rows.lock().unwrap().iter().find(|g| g.id == id).cloned())
    }

    async fn list(&self) -> Result<Vec<Group>, AppError> {
        Ok(self.rows.lock().unwrap().clone())
    }

    async fn delete(&self, id: Uuid) -> Result<bool, AppError> {
        let mut rows = self.rows.lock().unwrap();
        let before = rows.len();
        rows.retain(|g| g.id != id);
        let removed = rows.len() < before;
        if removed {
            self.memberships.lock().unwrap().retain(|m| m.group_id != id);
        }
        Ok(removed)
    }

    async fn add_member(
        &self,
        group_id: Uuid,
        user_id: Uuid,
        inserted_by: &str,
    ) -> Result<UserGroupMembership, AppError> {
        if !self.rows.lock().unwrap().iter().any(|g| g.id == group_id) {
            return Err(AppError::NotFound(format!("Group {} not found", group_id)));
        }
        let mut memberships = self.memberships.lock().unwrap();
        if memberships
            .iter()
            .any(|m| m.group_id == group_id && m.user_id == user_id)
        {
            return Err(AppError::Conflict(format!(
                "User {} is already a member of group {}",
                user_id, group_id
            )));
        }
        let membership = UserGroupMembership {
            group_id,
            user_id,
            inserted_at: Utc::now(),
            inserted_by: inserted_by.to_string(),
        };
        memberships.push(membership.clone());
        Ok(membership)
    }

    async fn remove_member(&self, group_id: Uuid, user_id: Uuid) -> Result<bool, AppError> {
        let mut memberships = self.memberships.lock().unwrap();
        let before = memberships.len();
        memberships.retain(|m| !(m.group_id == group_id && m.user_id == user_id));
        Ok(memberships.len() < before)
    }
}
