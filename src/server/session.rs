use std::sync::Arc;

use tokio::io::{AsyncRead, AsyncWrite};
use tokio_util::sync::CancellationToken;
use tracing::info;

use super::channel::LineChannel;
use super::error::SessionError;
use super::login::Login;
use crate::portal::{CredentialUpdate, Identity, Portal, PortalError, Reply, Role};
use crate::storage::{RecordId, RecordStorage};

const ADMIN_MENU: &str = "\n===== ADMIN MENU =====\n1. Add Student\n2. Add Faculty\n3. Activate/Deactivate Student\n4. Update Student/Faculty details\n5. Exit\nEnter your choice: ";
const FACULTY_MENU: &str = "\n===== FACULTY MENU =====\n1. Add new Course\n2. Remove offered Course\n3. View enrollments in Courses\n4. Password Change\n5. Exit\nEnter your choice: ";
const STUDENT_MENU: &str = "\n===== STUDENT MENU =====\n1. Enroll to new Courses\n2. Unenroll from already enrolled Courses\n3. View enrolled Courses\n4. Password Change\n5. Exit\nEnter your choice: ";

/// Menu selection, parsed from the client's answer.
enum Choice {
    Option(u8),
    Exit,
    Invalid,
}

impl Choice {
    fn parse(input: &str) -> Self {
        match input.trim().parse::<u8>() {
            Ok(5) => Choice::Exit,
            Ok(n @ 1..=4) => Choice::Option(n),
            _ => Choice::Invalid,
        }
    }
}

/// A single client session.
///
/// Runs the login exchange and then the menu loop of the logged-in role.
/// Portal operations take and release their own locks, so no store lock is
/// ever held while waiting on the client.
pub struct Session<T, S: RecordStorage> {
    channel: LineChannel<T>,
    portal: Arc<Portal<S>>,
}

impl<T, S> Session<T, S>
where
    T: AsyncRead + AsyncWrite + Unpin,
    S: RecordStorage,
{
    pub fn new(io: T, portal: Arc<Portal<S>>, cancel: CancellationToken) -> Self {
        Self {
            channel: LineChannel::new(io, cancel),
            portal,
        }
    }

    /// Serves the client until it exits, disconnects or the session is cancelled.
    pub async fn run(mut self) -> Result<(), SessionError> {
        match self.serve().await {
            Err(SessionError::Disconnected) => {
                info!("client disconnected");
                Ok(())
            }
            Err(SessionError::Cancelled) => {
                info!("session cancelled");
                Ok(())
            }
            other => other,
        }
    }

    async fn serve(&mut self) -> Result<(), SessionError> {
        let Some(identity) = Login::new(&mut self.channel, &self.portal).run().await? else {
            return Ok(());
        };

        match identity {
            Identity::Admin => self.admin_menu().await,
            Identity::Faculty(id) => self.faculty_menu(id).await,
            Identity::Student(id) => self.student_menu(id).await,
        }
    }

    async fn reply(&mut self, reply: Reply) -> Result<(), SessionError> {
        self.channel.send_reply(&reply).await
    }

    async fn admin_menu(&mut self) -> Result<(), SessionError> {
        loop {
            let choice = self.channel.prompt(ADMIN_MENU).await?;
            match Choice::parse(&choice) {
                Choice::Option(1) => self.add_account(Role::Student).await?,
                Choice::Option(2) => self.add_account(Role::Faculty).await?,
                Choice::Option(3) => self.toggle_student_status().await?,
                Choice::Option(_) => self.update_details().await?,
                Choice::Exit => return self.channel.send("Goodbye!").await,
                Choice::Invalid => self.channel.send("Invalid choice").await?,
            }
        }
    }

    async fn faculty_menu(&mut self, id: RecordId) -> Result<(), SessionError> {
        loop {
            let choice = self.channel.prompt(FACULTY_MENU).await?;
            match Choice::parse(&choice) {
                Choice::Option(1) => self.add_course(id).await?,
                Choice::Option(2) => self.remove_course(id).await?,
                Choice::Option(3) => self.view_enrollments(id).await?,
                Choice::Option(_) => self.change_password(Identity::Faculty(id)).await?,
                Choice::Exit => return self.channel.send("Goodbye!").await,
                Choice::Invalid => self.channel.send("Invalid choice").await?,
            }
        }
    }

    async fn student_menu(&mut self, id: RecordId) -> Result<(), SessionError> {
        loop {
            let choice = self.channel.prompt(STUDENT_MENU).await?;
            match Choice::parse(&choice) {
                Choice::Option(1) => self.enroll(id).await?,
                Choice::Option(2) => self.unenroll(id).await?,
                Choice::Option(3) => self.view_enrolled(id).await?,
                Choice::Option(_) => self.change_password(Identity::Student(id)).await?,
                Choice::Exit => return self.channel.send("Goodbye!").await,
                Choice::Invalid => self.channel.send("Invalid choice").await?,
            }
        }
    }

    // ---- admin ----

    async fn add_account(&mut self, role: Role) -> Result<(), SessionError> {
        let username = self
            .channel
            .prompt(&format!("Enter {} username: ", role))
            .await?;
        let password = self
            .channel
            .prompt(&format!("Enter {} password: ", role))
            .await?;

        let (title, action) = match role {
            Role::Faculty => ("Faculty", "add faculty"),
            _ => ("Student", "add student"),
        };
        let result = self.portal.create_account(role, &username, &password).await;
        self.reply(Reply::from_result(result, action, |id| {
            Reply::account_created(title, id)
        }))
        .await
    }

    async fn toggle_student_status(&mut self) -> Result<(), SessionError> {
        let input = self.channel.prompt("Enter student ID: ").await?;
        let result = match parse_id(&input) {
            Ok(id) => self.portal.toggle_active(id).await,
            Err(e) => Err(e),
        };
        self.reply(Reply::from_result(
            result,
            "toggle student status",
            Reply::status_toggled,
        ))
        .await
    }

    async fn update_details(&mut self) -> Result<(), SessionError> {
        let choice = self
            .channel
            .prompt("Update: 1. Student 2. Faculty\nEnter choice: ")
            .await?;
        let (role, title, action) = match choice.trim() {
            "1" => (Role::Student, "Student", "update student"),
            "2" => (Role::Faculty, "Faculty", "update faculty"),
            _ => return self.channel.send("Invalid choice").await,
        };

        let input = self.channel.prompt("Enter ID: ").await?;
        let id = match parse_id(&input) {
            Ok(id) => id,
            Err(e) => return self.reply(Reply::failure(&e, action)).await,
        };
        let username = self
            .channel
            .prompt("Enter new username (or . to keep current): ")
            .await?;
        let password = self
            .channel
            .prompt("Enter new password (or . to keep current): ")
            .await?;

        let update = CredentialUpdate::from_input(&username, &password);
        let result = self.portal.update_credentials(role, id, update).await;
        self.reply(Reply::from_result(result, action, |()| {
            Reply::success(format!("{} details updated successfully", title))
        }))
        .await
    }

    // ---- faculty ----

    async fn add_course(&mut self, id: RecordId) -> Result<(), SessionError> {
        let name = self.channel.prompt("Enter course name: ").await?;
        match self.portal.course_exists(&name).await {
            Ok(false) => {}
            Ok(true) => {
                let err = PortalError::DuplicateCourse(name);
                return self.reply(Reply::failure(&err, "add course")).await;
            }
            Err(e) => return self.reply(Reply::failure(&e, "add course")).await,
        }

        let input = self.channel.prompt("Enter number of seats: ").await?;
        let seats = input.trim().parse::<i64>().unwrap_or(0);
        let result = self.portal.add_course(id, &name, seats).await;
        self.reply(Reply::from_result(result, "add course", |()| {
            Reply::success("Course added successfully")
        }))
        .await
    }

    async fn remove_course(&mut self, id: RecordId) -> Result<(), SessionError> {
        let offered = match self.portal.offered_courses(id).await {
            Ok(offered) => offered,
            Err(e) => return self.reply(Reply::failure(&e, "get offered courses")).await,
        };
        self.reply(Reply::offered_courses(&offered)).await?;
        if offered.is_empty() {
            return Ok(());
        }

        let name = self.channel.prompt("Enter course name to remove: ").await?;
        let result = self.portal.remove_course(id, &name).await;
        self.reply(Reply::from_result(result, "remove course", Reply::course_removed))
            .await
    }

    async fn view_enrollments(&mut self, id: RecordId) -> Result<(), SessionError> {
        let result = self.portal.course_enrollments(id).await;
        self.reply(Reply::from_result(result, "view enrollments", |enrollments| {
            Reply::course_enrollments(&enrollments)
        }))
        .await
    }

    // ---- student ----

    async fn enroll(&mut self, id: RecordId) -> Result<(), SessionError> {
        let listings = match self.portal.available_courses().await {
            Ok(listings) => listings,
            Err(e) => return self.reply(Reply::failure(&e, "get available courses")).await,
        };
        self.reply(Reply::available_courses(&listings)).await?;

        let name = self.channel.prompt("Enter course name to enroll: ").await?;
        let result = self.portal.enroll(id, &name).await;
        self.reply(Reply::from_result(result, "enroll in course", |()| {
            Reply::success("Successfully enrolled in course")
        }))
        .await
    }

    async fn unenroll(&mut self, id: RecordId) -> Result<(), SessionError> {
        let enrolled = match self.portal.enrolled_courses(id).await {
            Ok(enrolled) => enrolled,
            Err(e) => return self.reply(Reply::failure(&e, "get enrolled courses")).await,
        };
        self.reply(Reply::enrolled_list(&enrolled)).await?;
        if enrolled.is_empty() {
            return Ok(());
        }

        let name = self.channel.prompt("Enter course name to unenroll: ").await?;
        let result = self.portal.unenroll(id, &name).await;
        self.reply(Reply::from_result(result, "unenroll from course", |()| {
            Reply::success("Successfully unenrolled from course")
        }))
        .await
    }

    async fn view_enrolled(&mut self, id: RecordId) -> Result<(), SessionError> {
        let result = self.portal.enrolled_courses(id).await;
        self.reply(Reply::from_result(result, "view enrolled courses", |courses| {
            Reply::enrolled_view(&courses)
        }))
        .await
    }

    // ---- shared ----

    async fn change_password(&mut self, identity: Identity) -> Result<(), SessionError> {
        let old = self.channel.prompt("Enter old password: ").await?;
        let new = self.channel.prompt("Enter new password: ").await?;
        let confirm = self.channel.prompt("Confirm new password: ").await?;

        let result = self
            .portal
            .change_own_password(identity, &old, &new, &confirm)
            .await;
        self.reply(Reply::from_result(result, "change password", |()| {
            Reply::success("Password changed successfully")
        }))
        .await
    }
}

fn parse_id(input: &str) -> Result<RecordId, PortalError> {
    input
        .trim()
        .parse::<u64>()
        .map(RecordId)
        .map_err(|_| PortalError::InvalidInput(format!("`{}` is not a valid ID", input.trim())))
}

#[cfg(test)]
mod tests {
    use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, duplex};

    use super::*;
    use crate::portal::tests::open_test_portal;

    /// Runs a whole session over an in-memory pipe with the given client
    /// input and returns every line the server sent.
    async fn transcript<S: RecordStorage>(portal: Arc<Portal<S>>, input: &str) -> Vec<String> {
        let (server, mut client) = duplex(64 * 1024);
        client.write_all(input.as_bytes()).await.unwrap();
        client.shutdown().await.unwrap();

        Session::new(server, portal, CancellationToken::new())
            .run()
            .await
            .unwrap();

        let mut lines = Vec::new();
        let mut reader = BufReader::new(client).lines();
        while let Some(line) = reader.next_line().await.unwrap() {
            lines.push(line);
        }
        lines
    }

    #[test]
    fn test_choice_parse() {
        assert!(matches!(Choice::parse("1"), Choice::Option(1)));
        assert!(matches!(Choice::parse(" 4 "), Choice::Option(4)));
        assert!(matches!(Choice::parse("5"), Choice::Exit));
        assert!(matches!(Choice::parse("0"), Choice::Invalid));
        assert!(matches!(Choice::parse("x"), Choice::Invalid));
    }

    #[tokio::test]
    async fn test_admin_adds_student() {
        let portal = Arc::new(open_test_portal().await);
        let lines = transcript(
            Arc::clone(&portal),
            "1\nadmin\nadmin123\n1\nalice\npw1\n7\n5\n",
        )
        .await;

        assert!(lines.contains(&"Student added successfully with ID: 0".to_string()));
        assert!(lines.contains(&"Invalid choice".to_string()));
        assert_eq!(lines.last().map(String::as_str), Some("Goodbye!"));
        assert!(portal.authenticate(Role::Student, "alice", "pw1").await.is_ok());
    }

    #[tokio::test]
    async fn test_faculty_adds_course() {
        let portal = Arc::new(open_test_portal().await);
        portal.create_account(Role::Faculty, "bob", "pw2").await.unwrap();

        let lines = transcript(
            Arc::clone(&portal),
            "2\nbob\npw2\n1\nCS101\n1\n1\nCS101\n5\n",
        )
        .await;

        assert!(lines.contains(&"Course added successfully".to_string()));
        assert!(lines.contains(&"Course already exists".to_string()));
        assert_eq!(portal.offered_courses(RecordId(0)).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_student_enrolls() {
        let portal = Arc::new(open_test_portal().await);
        let bob = portal.create_account(Role::Faculty, "bob", "pw2").await.unwrap();
        portal.add_course(bob, "CS101", 1).await.unwrap();
        portal.create_account(Role::Student, "alice", "pw1").await.unwrap();

        let lines = transcript(
            Arc::clone(&portal),
            "3\nalice\npw1\n1\nCS101\n1\nCS101\n3\n5\n",
        )
        .await;

        assert!(lines.contains(&"- CS101 (Available seats: 1)".to_string()));
        assert!(lines.contains(&"Successfully enrolled in course".to_string()));
        assert!(lines.contains(&"Already enrolled in this course".to_string()));
        assert!(lines.contains(&"1. CS101".to_string()));
    }

    #[tokio::test]
    async fn test_unenroll_with_nothing_enrolled() {
        let portal = Arc::new(open_test_portal().await);
        portal.create_account(Role::Student, "alice", "pw1").await.unwrap();

        let lines = transcript(Arc::clone(&portal), "3\nalice\npw1\n2\n5\n").await;

        assert!(lines.contains(&"No courses enrolled".to_string()));
        assert!(!lines.iter().any(|l| l.starts_with("Enter course name to unenroll")));
    }

    #[tokio::test]
    async fn test_update_details_keeps_password() {
        let portal = Arc::new(open_test_portal().await);
        portal.create_account(Role::Student, "alice", "pw1").await.unwrap();

        let lines = transcript(
            Arc::clone(&portal),
            "1\nadmin\nadmin123\n4\n1\n0\nalicia\n.\n5\n",
        )
        .await;

        assert!(lines.contains(&"Student details updated successfully".to_string()));
        assert!(portal.authenticate(Role::Student, "alicia", "pw1").await.is_ok());
    }

    #[tokio::test]
    async fn test_disconnect_mid_menu_is_clean() {
        let portal = Arc::new(open_test_portal().await);
        let lines = transcript(portal, "1\nadmin\nadmin123\n").await;
        assert!(lines.contains(&"Login successful".to_string()));
    }

    #[test]
    fn test_parse_id() {
        assert_eq!(parse_id(" 12 ").unwrap(), RecordId(12));
        assert!(matches!(parse_id("-1"), Err(PortalError::InvalidInput(_))));
    }
}
