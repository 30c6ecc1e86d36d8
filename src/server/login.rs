use tokio::io::{AsyncRead, AsyncWrite};
use tracing::{error, info};

use super::channel::LineChannel;
use super::error::SessionError;
use crate::portal::{Identity, Portal, PortalError, Role};
use crate::storage::RecordStorage;

pub const WELCOME: &str =
    "Welcome to Academia Portal\n1. Admin\n2. Faculty\n3. Student\nEnter your choice: ";

/// The login exchange at the start of every session.
///
/// Asks for a role, a username and a password, then checks them. The
/// connection is expected to close when this returns `None`.
pub struct Login<'a, T, S: RecordStorage> {
    channel: &'a mut LineChannel<T>,
    portal: &'a Portal<S>,
}

impl<'a, T, S> Login<'a, T, S>
where
    T: AsyncRead + AsyncWrite + Unpin,
    S: RecordStorage,
{
    pub fn new(channel: &'a mut LineChannel<T>, portal: &'a Portal<S>) -> Self {
        Self { channel, portal }
    }

    pub async fn run(self) -> Result<Option<Identity>, SessionError> {
        let choice = self.channel.prompt(WELCOME).await?;
        let username = self.channel.prompt("Enter username: ").await?;
        let password = self.channel.prompt("Enter password: ").await?;

        let Some(role) = Role::from_choice(&choice) else {
            self.channel.send("Invalid choice").await?;
            return Ok(None);
        };

        match self.portal.authenticate(role, &username, &password).await {
            Ok(identity) => {
                info!(%role, user_id = ?identity.id(), "login succeeded");
                self.channel.send("Login successful").await?;
                Ok(Some(identity))
            }
            Err(err) => {
                match err {
                    PortalError::AuthFailed => info!(%role, username = %username, "login failed"),
                    other => error!(%role, error = %other, "login check failed"),
                }
                self.channel.send("Login failed").await?;
                Ok(None)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, duplex};
    use tokio_util::sync::CancellationToken;

    use super::*;
    use crate::portal::tests::open_test_portal;
    use crate::storage::RecordId;

    async fn login_with(input: &str) -> (Option<Identity>, Vec<String>) {
        let portal = open_test_portal().await;
        portal.create_account(Role::Student, "alice", "pw1").await.unwrap();

        let (server, mut client) = duplex(4096);
        client.write_all(input.as_bytes()).await.unwrap();

        let mut channel = LineChannel::new(server, CancellationToken::new());
        let identity = Login::new(&mut channel, &portal).run().await.unwrap();
        drop(channel);

        let mut lines = Vec::new();
        let mut reader = BufReader::new(client).lines();
        while let Some(line) = reader.next_line().await.unwrap() {
            lines.push(line);
        }
        (identity, lines)
    }

    #[tokio::test]
    async fn test_student_login() {
        let (identity, lines) = login_with("3\nalice\npw1\n").await;
        assert_eq!(identity, Some(Identity::Student(RecordId(0))));
        assert_eq!(lines.last().map(String::as_str), Some("Login successful"));
        assert_eq!(lines[0], "Welcome to Academia Portal");
    }

    #[tokio::test]
    async fn test_bad_password() {
        let (identity, lines) = login_with("3\nalice\nnope\n").await;
        assert_eq!(identity, None);
        assert_eq!(lines.last().map(String::as_str), Some("Login failed"));
    }

    #[tokio::test]
    async fn test_invalid_role() {
        let (identity, lines) = login_with("9\nalice\npw1\n").await;
        assert_eq!(identity, None);
        assert_eq!(lines.last().map(String::as_str), Some("Invalid choice"));
    }

    #[tokio::test]
    async fn test_admin_login() {
        let (identity, _) = login_with("1\nadmin\nadmin123\n").await;
        assert_eq!(identity, Some(Identity::Admin));
    }
}
