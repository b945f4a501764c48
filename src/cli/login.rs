use clap::Args;

use crate::config::Context;
use crate::navigation::{Navigator, HOME_PATH};
use crate::{InvctlError, Result};

/// Sign in with username and password
#[derive(Args, Debug)]
pub struct LoginCommand {
    /// Username
    #[arg(long, short = 'u', env = "INVCTL_USERNAME")]
    username: String,
    /// Password
    #[arg(long, short = 'p', env = "INVCTL_PASSWORD", hide_env_values = true)]
    password: String,
}

impl LoginCommand {
    pub async fn run(self, context: Context) -> Result<()> {
        let LoginCommand { username, password } = self;

        if username.trim().is_empty() || password.is_empty() {
            return Err(InvctlError::Input(
                "Please enter both username and password".to_owned(),
            ));
        }

        let user = context.session.login(&username, &password).await?;
        context.location.navigate(HOME_PATH);

        println!("Signed in as {} ({})", user.username, user.role);
        Ok(())
    }
}
