//! Login and account management.

use std::fmt;

use tracing::{debug, info};

use super::error::PortalError;
use super::{Portal, edit_record, validate_name, validate_text};
use crate::record::{Account, Faculty, Student};
use crate::storage::{RecordId, RecordStorage, StorageError, Table};

/// The three kinds of user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Admin,
    Faculty,
    Student,
}

impl Role {
    /// Parses a login menu choice (`1`, `2` or `3`).
    pub fn from_choice(choice: &str) -> Option<Role> {
        match choice.trim() {
            "1" => Some(Role::Admin),
            "2" => Some(Role::Faculty),
            "3" => Some(Role::Student),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Faculty => "faculty",
            Role::Student => "student",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Who a session is logged in as.
///
/// The admin has no record id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Identity {
    Admin,
    Faculty(RecordId),
    Student(RecordId),
}

impl Identity {
    pub fn role(&self) -> Role {
        match self {
            Identity::Admin => Role::Admin,
            Identity::Faculty(_) => Role::Faculty,
            Identity::Student(_) => Role::Student,
        }
    }

    pub fn id(&self) -> Option<RecordId> {
        match self {
            Identity::Admin => None,
            Identity::Faculty(id) | Identity::Student(id) => Some(*id),
        }
    }
}

/// New credential values. `None` leaves the stored value untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CredentialUpdate {
    pub username: Option<String>,
    pub password: Option<String>,
}

impl CredentialUpdate {
    /// Input that means "keep the current value".
    pub const KEEP: &'static str = ".";

    /// Builds an update from raw prompt answers, mapping [`KEEP`](Self::KEEP)
    /// to `None`.
    pub fn from_input(username: &str, password: &str) -> Self {
        let field = |value: &str| (value != Self::KEEP).then(|| value.to_owned());
        Self {
            username: field(username),
            password: field(password),
        }
    }

    fn validate(&self) -> Result<(), PortalError> {
        if let Some(username) = &self.username {
            validate_name("username", username)?;
        }
        if let Some(password) = &self.password {
            validate_text("password", password)?;
        }
        Ok(())
    }

    fn apply(self, account: &mut impl Account) {
        if let Some(username) = self.username {
            account.set_username(username);
        }
        if let Some(password) = self.password {
            account.set_password(password);
        }
    }
}

/// Returns the id of the first account in `table` that accepts the login.
async fn find_account<T, S>(
    table: &Table<T, S>,
    username: &str,
    password: &str,
) -> Result<Option<RecordId>, StorageError>
where
    T: Account + Send + Sync,
    S: RecordStorage,
{
    let mut scan = table.scan();
    while let Some((id, account)) = scan.next_record().await? {
        if account.matches(username, password) {
            return Ok(Some(id));
        }
    }
    Ok(None)
}

impl<S: RecordStorage> Portal<S> {
    /// Checks a login.
    ///
    /// Faculty and students are matched by scanning their store from the
    /// first record; the first match wins. Deactivated students never match.
    pub async fn authenticate(
        &self,
        role: Role,
        username: &str,
        password: &str,
    ) -> Result<Identity, PortalError> {
        let identity = match role {
            Role::Admin => {
                let admin = self.admin.read_at(RecordId(0)).await?;
                admin.matches(username, password).then_some(Identity::Admin)
            }
            Role::Faculty => {
                let _scope = self.locks.faculty().await;
                find_account(&self.faculty, username, password)
                    .await?
                    .map(Identity::Faculty)
            }
            Role::Student => {
                let _scope = self.locks.student().await;
                find_account(&self.students, username, password)
                    .await?
                    .map(Identity::Student)
            }
        };

        match identity {
            Some(identity) => {
                debug!(%role, username, "authenticated");
                Ok(identity)
            }
            None => Err(PortalError::AuthFailed),
        }
    }

    /// Creates a faculty or student account and returns its id.
    ///
    /// Students start active with no courses; faculty start with no courses.
    pub async fn create_account(
        &self,
        role: Role,
        username: &str,
        password: &str,
    ) -> Result<RecordId, PortalError> {
        validate_name("username", username)?;
        validate_text("password", password)?;
        let (username, password) = (username.to_owned(), password.to_owned());

        match role {
            Role::Admin => Err(PortalError::InvalidInput(
                "admin accounts cannot be created".to_string(),
            )),
            Role::Faculty => {
                let _scope = self.locks.faculty().await;
                let id = self
                    .faculty
                    .append(move |id| Faculty::new(id, username, password))
                    .await?;
                info!(faculty_id = %id, "faculty account created");
                Ok(id)
            }
            Role::Student => {
                let _scope = self.locks.student().await;
                let id = self
                    .students
                    .append(move |id| Student::new(id, username, password))
                    .await?;
                info!(student_id = %id, "student account created");
                Ok(id)
            }
        }
    }

    /// Overwrites the username and/or password of an account.
    pub async fn update_credentials(
        &self,
        role: Role,
        id: RecordId,
        update: CredentialUpdate,
    ) -> Result<(), PortalError> {
        update.validate()?;

        match role {
            Role::Admin => {
                return Err(PortalError::InvalidInput(
                    "admin credentials cannot be updated".to_string(),
                ));
            }
            Role::Faculty => {
                let (_course, _faculty) = self.locks.course_and_faculty().await;
                edit_record(&self.faculty, id, PortalError::for_faculty(id), |faculty| {
                    update.apply(faculty);
                    Ok(())
                })
                .await?;
            }
            Role::Student => {
                let _scope = self.locks.student().await;
                edit_record(&self.students, id, PortalError::for_student(id), |student| {
                    update.apply(student);
                    Ok(())
                })
                .await?;
            }
        }

        info!(%role, id = %id, "credentials updated");
        Ok(())
    }

    /// Changes the password of the logged-in account.
    ///
    /// `confirm` must equal `new` (checked before any lock is taken) and `old`
    /// must equal the stored password.
    pub async fn change_own_password(
        &self,
        identity: Identity,
        old: &str,
        new: &str,
        confirm: &str,
    ) -> Result<(), PortalError> {
        if new != confirm {
            return Err(PortalError::PasswordMismatch);
        }
        validate_text("password", new)?;

        match identity {
            Identity::Admin => {
                return Err(PortalError::InvalidInput(
                    "the admin password cannot be changed".to_string(),
                ));
            }
            Identity::Faculty(id) => {
                let (_course, _faculty) = self.locks.course_and_faculty().await;
                edit_record(&self.faculty, id, PortalError::for_faculty(id), |faculty| {
                    replace_password(faculty, old, new)
                })
                .await?;
            }
            Identity::Student(id) => {
                let _scope = self.locks.student().await;
                edit_record(&self.students, id, PortalError::for_student(id), |student| {
                    replace_password(student, old, new)
                })
                .await?;
            }
        }

        info!(role = %identity.role(), "password changed");
        Ok(())
    }

    /// Flips a student's active flag and returns the new state.
    pub async fn toggle_active(&self, id: RecordId) -> Result<bool, PortalError> {
        let _scope = self.locks.student().await;
        let student = edit_record(&self.students, id, PortalError::for_student(id), |student| {
            student.active = !student.active;
            Ok(())
        })
        .await?;

        info!(student_id = %id, active = student.active, "student status toggled");
        Ok(student.active)
    }
}

fn replace_password(account: &mut impl Account, old: &str, new: &str) -> Result<(), PortalError> {
    if account.password() != old {
        return Err(PortalError::WrongOldPassword);
    }
    account.set_password(new.to_owned());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::portal::ErrorKind;
    use crate::portal::tests::open_test_portal;

    #[tokio::test]
    async fn test_admin_login() {
        let portal = open_test_portal().await;
        let identity = portal
            .authenticate(Role::Admin, "admin", "admin123")
            .await
            .unwrap();
        assert_eq!(identity, Identity::Admin);
        assert_eq!(identity.id(), None);

        let err = portal
            .authenticate(Role::Admin, "admin", "wrong")
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::AuthFailed);
    }

    #[tokio::test]
    async fn test_ids_follow_append_order() {
        let portal = open_test_portal().await;
        let a = portal.create_account(Role::Student, "a", "1").await.unwrap();
        let b = portal.create_account(Role::Student, "b", "2").await.unwrap();
        let f = portal.create_account(Role::Faculty, "f", "3").await.unwrap();

        assert_eq!(a, RecordId(0));
        assert_eq!(b, RecordId(1));
        assert_eq!(f, RecordId(0));

        let stored = portal.students().read_at(b).await.unwrap();
        assert_eq!(stored.id, b);
        assert!(stored.active);
        assert!(stored.courses.is_empty());
    }

    #[tokio::test]
    async fn test_first_matching_account_wins() {
        let portal = open_test_portal().await;
        portal.create_account(Role::Student, "twin", "pw").await.unwrap();
        portal.create_account(Role::Student, "twin", "pw").await.unwrap();

        let identity = portal
            .authenticate(Role::Student, "twin", "pw")
            .await
            .unwrap();
        assert_eq!(identity, Identity::Student(RecordId(0)));
    }

    #[tokio::test]
    async fn test_roles_are_separate() {
        let portal = open_test_portal().await;
        portal.create_account(Role::Faculty, "prof", "pw").await.unwrap();

        assert!(portal.authenticate(Role::Student, "prof", "pw").await.is_err());
        assert_eq!(
            portal.authenticate(Role::Faculty, "prof", "pw").await.unwrap(),
            Identity::Faculty(RecordId(0))
        );
    }

    #[tokio::test]
    async fn test_deactivated_student_cannot_login() {
        let portal = open_test_portal().await;
        let id = portal.create_account(Role::Student, "s", "pw").await.unwrap();

        assert!(!portal.toggle_active(id).await.unwrap());
        assert!(matches!(
            portal.authenticate(Role::Student, "s", "pw").await,
            Err(PortalError::AuthFailed)
        ));

        assert!(portal.toggle_active(id).await.unwrap());
        assert!(portal.authenticate(Role::Student, "s", "pw").await.is_ok());
    }

    #[tokio::test]
    async fn test_toggle_missing_student() {
        let portal = open_test_portal().await;
        assert!(matches!(
            portal.toggle_active(RecordId(4)).await,
            Err(PortalError::StudentNotFound(RecordId(4)))
        ));
    }

    #[tokio::test]
    async fn test_admin_cannot_be_created() {
        let portal = open_test_portal().await;
        let err = portal
            .create_account(Role::Admin, "root", "pw")
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
    }

    #[tokio::test]
    async fn test_overlong_username_rejected() {
        let portal = open_test_portal().await;
        let err = portal
            .create_account(Role::Student, &"x".repeat(51), "pw")
            .await
            .unwrap_err();
        assert!(matches!(err, PortalError::InvalidInput(_)));
        assert!(portal.students().is_empty().await);
    }

    #[tokio::test]
    async fn test_update_keeps_absent_fields() {
        let portal = open_test_portal().await;
        let id = portal.create_account(Role::Faculty, "old", "pw").await.unwrap();

        let update = CredentialUpdate::from_input("new", CredentialUpdate::KEEP);
        assert_eq!(update.password, None);
        portal
            .update_credentials(Role::Faculty, id, update)
            .await
            .unwrap();

        assert!(portal.authenticate(Role::Faculty, "new", "pw").await.is_ok());
        assert!(portal.authenticate(Role::Faculty, "old", "pw").await.is_err());
    }

    #[tokio::test]
    async fn test_update_missing_account() {
        let portal = open_test_portal().await;
        let result = portal
            .update_credentials(Role::Student, RecordId(0), CredentialUpdate::default())
            .await;
        assert!(matches!(result, Err(PortalError::StudentNotFound(_))));
    }

    #[tokio::test]
    async fn test_change_password() {
        let portal = open_test_portal().await;
        let id = portal.create_account(Role::Student, "s", "old").await.unwrap();
        let me = Identity::Student(id);

        assert!(matches!(
            portal.change_own_password(me, "old", "new", "typo").await,
            Err(PortalError::PasswordMismatch)
        ));
        assert!(matches!(
            portal.change_own_password(me, "wrong", "new", "new").await,
            Err(PortalError::WrongOldPassword)
        ));
        assert!(portal.authenticate(Role::Student, "s", "old").await.is_ok());

        portal
            .change_own_password(me, "old", "new", "new")
            .await
            .unwrap();
        assert!(portal.authenticate(Role::Student, "s", "new").await.is_ok());
        assert!(portal.authenticate(Role::Student, "s", "old").await.is_err());
    }

    #[tokio::test]
    async fn test_admin_has_no_password_change() {
        let portal = open_test_portal().await;
        let result = portal
            .change_own_password(Identity::Admin, "admin123", "x", "x")
            .await;
        assert!(matches!(result, Err(PortalError::InvalidInput(_))));
    }

    #[test]
    fn test_role_from_choice() {
        assert_eq!(Role::from_choice("1"), Some(Role::Admin));
        assert_eq!(Role::from_choice(" 3 "), Some(Role::Student));
        assert_eq!(Role::from_choice("4"), None);
        assert_eq!(Role::from_choice("admin"), None);
    }
}
